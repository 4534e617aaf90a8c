use auric_api::models::{
    CreateFlowParams, FlowKind, IdentityTraits, SettingsPasswordPayload, SettingsTotpPayload,
    SettingsTraitsPayload,
};
use auric_core::{Client, collaborators::NoticeKind, require};

use super::has_error_messages;
use crate::{
    FlowError, SubmitOutcome,
    dispatcher::{BoxFuture, Dispatcher, RetryThunk},
    flow_handle::FlowHandle,
    schema::FieldViolation,
};

/// Application path of the settings screen, preserved across the step-up
/// detour so the user lands back where they started.
const SETTINGS_PATH: &str = "/settings";

/// One mutation of the settings flow, kept as a value so a step-up detour
/// can replay it.
#[derive(Debug, Clone)]
enum SettingsAction {
    Password(String),
    Traits(IdentityTraits),
    TotpEnroll(String),
    TotpUnlink,
}

impl SettingsAction {
    fn comment(&self) -> &'static str {
        match self {
            SettingsAction::Password(_) => "the password could not be changed",
            SettingsAction::Traits(_) => "the profile could not be updated",
            SettingsAction::TotpEnroll(_) => "the authenticator could not be enrolled",
            SettingsAction::TotpUnlink => "the authenticator could not be unlinked",
        }
    }

    fn success_notice(&self) -> &'static str {
        match self {
            SettingsAction::Password(_) => "Password updated",
            SettingsAction::Traits(_) => "Profile updated",
            SettingsAction::TotpEnroll(_) => "Two-factor authentication enabled",
            SettingsAction::TotpUnlink => "Two-factor authentication disabled",
        }
    }
}

/// Orchestrates the settings flow: password change, profile trait edits,
/// and TOTP enrollment/unlink.
///
/// Settings mutations are the protected actions of the protocol: the
/// provider may answer any of them with `session_refresh_required`, in
/// which case the step-up protocol runs and, on success, the action is
/// replayed exactly once against a fresh flow.
pub struct SettingsOrchestrator {
    client: Client,
    dispatcher: Dispatcher,
    /// Flow state and operation containers, readable by the embedder.
    pub handle: FlowHandle,
}

impl SettingsOrchestrator {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            dispatcher: Dispatcher::new(client.clone()),
            client,
            handle: FlowHandle::new(FlowKind::Settings, CreateFlowParams::default()),
        }
    }

    /// Resume a settings flow whose id arrived in the current URL, as after
    /// the recovery redirect.
    pub async fn resume(&self, flow_id: &str) -> Result<(), FlowError> {
        match self.handle.resume(&self.client, flow_id).await {
            Ok(_) => Ok(()),
            Err(error) => {
                self.dispatch_plain(&error, "could not resume the settings flow")
                    .await;
                Err(error)
            }
        }
    }

    /// Set a new password.
    pub async fn change_password(&self, new_password: &str) -> Result<(), FlowError> {
        if new_password.len() < 8 {
            let error = FlowError::Validation(vec![FieldViolation::new(
                "password",
                "must be at least 8 characters long",
            )]);
            self.handle.submit.fail(error.clone());
            return Err(error);
        }
        self.submit_action(SettingsAction::Password(new_password.to_owned()), true)
            .await
    }

    /// Replace the identity's traits.
    pub async fn update_traits(&self, traits: IdentityTraits) -> Result<(), FlowError> {
        self.submit_action(SettingsAction::Traits(traits), true).await
    }

    /// Confirm a scanned TOTP secret with a generated code, completing
    /// enrollment.
    pub async fn enroll_totp(&self, code: &str) -> Result<(), FlowError> {
        self.submit_action(SettingsAction::TotpEnroll(code.to_owned()), true)
            .await
    }

    /// Unlink the enrolled authenticator.
    pub async fn unlink_totp(&self) -> Result<(), FlowError> {
        self.submit_action(SettingsAction::TotpUnlink, true).await
    }

    // Boxed because the step-up retry re-enters with `allow_retry` burnt,
    // making the recursion depth exactly two.
    fn submit_action<'a>(
        &'a self,
        action: SettingsAction,
        allow_retry: bool,
    ) -> BoxFuture<'a, Result<(), FlowError>> {
        Box::pin(async move {
            let flow = match self.handle.ensure_flow(&self.client).await {
                Ok(flow) => flow,
                Err(error) => {
                    self.dispatch_plain(&error, "could not start the settings flow")
                        .await;
                    return Err(error);
                }
            };
            let csrf_token = require!(flow.csrf_token());

            let result = match &action {
                SettingsAction::Password(password) => {
                    let payload = SettingsPasswordPayload::new(csrf_token, password.clone());
                    self.handle
                        .submit_payload(&self.client, &flow.id, &payload)
                        .await
                }
                SettingsAction::Traits(traits) => {
                    let payload = SettingsTraitsPayload::new(csrf_token, traits.clone());
                    self.handle
                        .submit_payload(&self.client, &flow.id, &payload)
                        .await
                }
                SettingsAction::TotpEnroll(code) => {
                    let payload = SettingsTotpPayload::enroll(csrf_token, code.clone());
                    self.handle
                        .submit_payload(&self.client, &flow.id, &payload)
                        .await
                }
                SettingsAction::TotpUnlink => {
                    let payload = SettingsTotpPayload::unlink(csrf_token);
                    self.handle
                        .submit_payload(&self.client, &flow.id, &payload)
                        .await
                }
            };

            match result {
                Ok(SubmitOutcome::FlowUpdate(flow)) => {
                    if !has_error_messages(&flow) {
                        self.client.internal.notifier().notify(
                            action.success_notice(),
                            "",
                            NoticeKind::Info,
                        );
                    }
                    Ok(())
                }
                Ok(SubmitOutcome::Authenticated(response)) => {
                    self.client.internal.sessions().update_session(response.session);
                    Ok(())
                }
                Err(error) => {
                    let comment = action.comment();
                    let retry: Option<RetryThunk<'a>> = if allow_retry {
                        let retry_action = action.clone();
                        Some(Box::new(move || {
                            Box::pin(async move {
                                // The refreshed privileged session needs a
                                // fresh flow with a fresh CSRF token.
                                self.handle.reset();
                                if let Err(retry_error) =
                                    self.submit_action(retry_action, false).await
                                {
                                    log::warn!(
                                        "settings action failed after step-up: {retry_error}"
                                    );
                                }
                            })
                        }))
                    } else {
                        None
                    };
                    self.dispatcher
                        .dispatch(
                            &error,
                            FlowKind::Settings,
                            comment,
                            Some(SETTINGS_PATH),
                            || self.handle.reset(),
                            retry,
                        )
                        .await;
                    Err(error)
                }
            }
        })
    }

    async fn dispatch_plain(&self, error: &FlowError, comment: &str) {
        self.dispatcher
            .dispatch(
                error,
                self.handle.kind(),
                comment,
                Some(SETTINGS_PATH),
                || self.handle.reset(),
                None,
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use auric_api::models::{AuthLevel, ErrorId};
    use auric_core::collaborators::DecliningStepUpPrompt;
    use auric_test::start_api_mock;
    use wiremock::{Mock, ResponseTemplate, matchers};

    use super::*;
    use crate::test_support::{recording_client, recording_client_with_prompt};

    fn flow_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "expires_at": "2026-01-01T10:30:00Z",
            "issued_at": "2026-01-01T10:00:00Z",
            "ui": {"nodes": [
                {"name": "csrf_token", "type": "hidden", "value": format!("csrf-{id}")}
            ], "messages": []}
        })
    }

    fn aal2_whoami() -> serde_json::Value {
        serde_json::json!({
            "id": uuid::Uuid::new_v4(),
            "active": true,
            "authenticator_assurance_level": "aal2",
            "identity": {"id": uuid::Uuid::new_v4(), "traits": {"email": "a@b.com"}}
        })
    }

    #[tokio::test]
    async fn a_password_change_notifies_success() {
        let (_server, configuration) = start_api_mock(vec![
            Mock::given(matchers::method("GET"))
                .and(matchers::path("/self-service/settings/browser"))
                .respond_with(ResponseTemplate::new(200).set_body_json(flow_json("set-1"))),
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/self-service/settings"))
                .and(matchers::body_partial_json(
                    serde_json::json!({"method": "password", "csrf_token": "csrf-set-1"}),
                ))
                .respond_with(ResponseTemplate::new(200).set_body_json(flow_json("set-1"))),
        ])
        .await;
        let (client, notifier, _navigator) = recording_client(configuration);

        SettingsOrchestrator::new(client)
            .change_password("N3w-Str0ngPass!")
            .await
            .expect("password change should succeed");

        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].0, "Password updated");
        assert_eq!(notices[0].2, NoticeKind::Info);
    }

    #[tokio::test]
    async fn a_short_password_fails_locally() {
        let (server, configuration) = start_api_mock(vec![]).await;
        let (client, _notifier, _navigator) = recording_client(configuration);

        let error = SettingsOrchestrator::new(client)
            .change_password("short")
            .await
            .expect_err("validation should fail");
        assert!(matches!(error, FlowError::Validation(_)));
        assert_eq!(server.received_requests().await.map(|r| r.len()), Some(0));
    }

    #[tokio::test]
    async fn refresh_required_runs_step_up_and_replays_the_action_once() {
        let (server, configuration) = start_api_mock(vec![
            Mock::given(matchers::method("GET"))
                .and(matchers::path("/self-service/settings/browser"))
                .respond_with(ResponseTemplate::new(200).set_body_json(flow_json("set-1")))
                .up_to_n_times(1),
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/self-service/settings"))
                .and(matchers::body_partial_json(
                    serde_json::json!({"csrf_token": "csrf-set-1"}),
                ))
                .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                    "error": {"id": "session_refresh_required", "message": "please re-authenticate"}
                }))),
            Mock::given(matchers::method("GET"))
                .and(matchers::path("/sessions/whoami"))
                .respond_with(ResponseTemplate::new(200).set_body_json(aal2_whoami())),
            Mock::given(matchers::method("GET"))
                .and(matchers::path("/self-service/settings/browser"))
                .respond_with(ResponseTemplate::new(200).set_body_json(flow_json("set-2"))),
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/self-service/settings"))
                .and(matchers::body_partial_json(
                    serde_json::json!({"csrf_token": "csrf-set-2"}),
                ))
                .respond_with(ResponseTemplate::new(200).set_body_json(flow_json("set-2"))),
        ])
        .await;
        // The accepting prompt stands in for a completed aal2 dialog.
        let (client, notifier, _navigator) = recording_client(configuration);

        let orchestrator = SettingsOrchestrator::new(client.clone());
        let error = orchestrator
            .change_password("N3w-Str0ngPass!")
            .await
            .expect_err("the interrupted call itself reports the refresh error");
        assert_eq!(error.error_id(), Some(ErrorId::SessionRefreshRequired));

        // The replay succeeded: refreshed aal2 session, success notice, and
        // exactly five requests (create, rejected submit, whoami, re-create,
        // replayed submit).
        assert_eq!(
            client.internal.sessions().assurance_level(),
            Some(AuthLevel::Aal2)
        );
        assert!(
            notifier
                .notices()
                .iter()
                .any(|(title, _, _)| title == "Password updated")
        );
        assert_eq!(server.received_requests().await.map(|r| r.len()), Some(5));
    }

    #[tokio::test]
    async fn a_declined_step_up_leaves_the_action_unretried() {
        let (server, configuration) = start_api_mock(vec![
            Mock::given(matchers::method("GET"))
                .and(matchers::path("/self-service/settings/browser"))
                .respond_with(ResponseTemplate::new(200).set_body_json(flow_json("set-1"))),
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/self-service/settings"))
                .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                    "error": {"id": "session_refresh_required", "message": "please re-authenticate"}
                }))),
        ])
        .await;
        let (client, notifier, _navigator) =
            recording_client_with_prompt(configuration, Arc::new(DecliningStepUpPrompt));

        let error = SettingsOrchestrator::new(client)
            .change_password("N3w-Str0ngPass!")
            .await
            .expect_err("the refresh error is reported");
        assert_eq!(error.error_id(), Some(ErrorId::SessionRefreshRequired));
        assert!(notifier.notices().is_empty(), "declines are silent");
        // Create plus submit only; neither whoami nor a replay happened.
        assert_eq!(server.received_requests().await.map(|r| r.len()), Some(2));
    }

    #[tokio::test]
    async fn aal2_required_preserves_the_settings_return_path() {
        let (_server, configuration) = start_api_mock(vec![
            Mock::given(matchers::method("GET"))
                .and(matchers::path("/self-service/settings/browser"))
                .respond_with(ResponseTemplate::new(200).set_body_json(flow_json("set-1"))),
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/self-service/settings"))
                .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                    "error": {"id": "session_aal2_required", "message": "second factor required"}
                }))),
        ])
        .await;
        let (client, _notifier, navigator) = recording_client(configuration);

        let error = SettingsOrchestrator::new(client)
            .unlink_totp()
            .await
            .expect_err("the aal2 requirement is reported");
        assert_eq!(error.error_id(), Some(ErrorId::SessionAal2Required));
        assert_eq!(
            navigator.navigations(),
            vec![(
                crate::STEP_UP_PATH.to_owned(),
                vec![("redirect_to".to_owned(), SETTINGS_PATH.to_owned())]
            )]
        );
    }
}
