use auric_api::{
    endpoints,
    models::{AuthLevel, Session},
};
use chrono::Utc;

use crate::{
    Client, LogoutError,
    session::{GuardOutcome, StepUpTurn},
};

/// Subclient for session lifecycle operations.
#[derive(Clone)]
pub struct SessionClient {
    pub(crate) client: Client,
}

impl Client {
    /// Client for session lifecycle functionality.
    pub fn session(&self) -> SessionClient {
        SessionClient {
            client: self.clone(),
        }
    }
}

impl SessionClient {
    /// A snapshot of the current session, if one is live.
    pub fn current(&self) -> Option<Session> {
        self.client.internal.sessions().current()
    }

    /// Run the step-up protocol and report whether a fresh `aal2` session
    /// is now live.
    ///
    /// Single-flight: while a prompt is open, further callers share its
    /// pending outcome instead of opening a second prompt. Resolves `true`
    /// only after the provider confirms an active `aal2` session, which is
    /// then adopted wholesale; a cancelled or failed prompt resolves
    /// `false` and the caller must treat its action as not retried. A
    /// leading caller dropped mid-prompt releases the dialog slot and
    /// resolves pending followers `false`.
    pub async fn request_step_up(&self) -> bool {
        let sessions = self.client.internal.sessions();
        match sessions.step_up_turn() {
            StepUpTurn::Follower(mut receiver) => receiver.recv().await.unwrap_or(false),
            StepUpTurn::Lead(lead) => {
                let prompt = self.client.internal.step_up_prompt();
                let confirmed = prompt.authenticate(&self.client).await;
                let outcome = confirmed && self.adopt_step_up_session().await;
                lead.finish(outcome);
                outcome
            }
        }
    }

    async fn adopt_step_up_session(&self) -> bool {
        let configuration = self.client.internal.get_api_configuration();
        match endpoints::whoami(&configuration).await {
            Ok(session)
                if session.active
                    && session.authenticator_assurance_level == Some(AuthLevel::Aal2) =>
            {
                self.client.internal.sessions().update_session(session);
                true
            }
            Ok(session) => {
                log::warn!(
                    "step-up prompt reported success but provider reports aal {:?}",
                    session.authenticator_assurance_level
                );
                false
            }
            Err(e) => {
                log::warn!("step-up confirmation failed: {e}");
                false
            }
        }
    }

    /// Invalidate the session with the provider and clear local state.
    ///
    /// Local session state and dependent caches are cleared regardless of
    /// the network outcome: logout must never leave the client looking
    /// authenticated. The returned error only reports that the provider
    /// side may still hold the session.
    pub async fn logout(&self) -> Result<(), LogoutError> {
        let result = self.submit_logout().await;
        if let Err(e) = &result {
            log::warn!("logout request failed; clearing local session anyway: {e}");
        }
        self.client.internal.sessions().clear();
        result
    }

    async fn submit_logout(&self) -> Result<(), LogoutError> {
        let configuration = self.client.internal.get_api_configuration();
        let flow = endpoints::logout_flow(&configuration).await?;
        let token = flow.token().ok_or(LogoutError::MissingToken)?;
        endpoints::submit_logout(&configuration, &token).await?;
        Ok(())
    }

    /// Navigation guard: resolve whether `target` may be entered.
    ///
    /// With no local session, one `whoami` attempt adopts a provider-side
    /// session if it exists. A local session that is inactive or expired by
    /// the clock is cleared (dependent caches included) before the
    /// no-session path runs.
    pub async fn resolve_session(&self, requires_auth: bool, target: &str) -> GuardOutcome {
        let sessions = self.client.internal.sessions();

        if let Some(session) = sessions.current() {
            if session.is_current(Utc::now()) {
                return GuardOutcome::Authenticated;
            }
            log::debug!("local session is stale; clearing before re-resolving");
            sessions.clear();
        }

        let configuration = self.client.internal.get_api_configuration();
        match endpoints::whoami(&configuration).await {
            Ok(session) if session.active => {
                sessions.update_session(session);
                GuardOutcome::Authenticated
            }
            Ok(_) => self.anonymous_outcome(requires_auth, target),
            Err(e) => {
                log::debug!("whoami reported no session: {e}");
                self.anonymous_outcome(requires_auth, target)
            }
        }
    }

    fn anonymous_outcome(&self, requires_auth: bool, target: &str) -> GuardOutcome {
        if requires_auth {
            GuardOutcome::RedirectToSignIn {
                redirect: target.to_owned(),
            }
        } else {
            GuardOutcome::Anonymous
        }
    }
}
