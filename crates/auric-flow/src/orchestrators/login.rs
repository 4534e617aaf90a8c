use std::sync::{Arc, RwLock};

use auric_api::models::{
    CreateFlowParams, FlowKind, OidcLoginPayload, PasswordLoginPayload, Session, TotpLoginPayload,
};
use auric_core::{Client, require};
use serde::Serialize;
use validator::Validate;

use super::violations_from;
use crate::{
    FlowError, SubmitOutcome,
    dispatcher::{DEFAULT_LANDING_PATH, Dispatcher},
    flow_handle::FlowHandle,
    schema::{FieldSchema, Schema},
};

/// Credentials for a `method: password` login.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginCredentials {
    #[allow(missing_docs)]
    #[validate(email)]
    pub email: String,
    #[allow(missing_docs)]
    #[validate(length(min = 1))]
    pub password: String,
}

type AuthenticatedHook = Arc<dyn Fn(&Session) + Send + Sync>;

/// Orchestrates the login flow.
///
/// `Idle → FlowFetching → FlowReady → Submitting → {Success | FieldErrors |
/// FlowError}`; the two operation containers on [`Self::handle`] expose the
/// fetch and submit legs of that sequence.
pub struct LoginOrchestrator {
    client: Client,
    dispatcher: Dispatcher,
    /// Flow state and operation containers, readable by the embedder.
    pub handle: FlowHandle,
    local_schema: Schema,
    on_authenticated: RwLock<Option<AuthenticatedHook>>,
}

impl LoginOrchestrator {
    pub(crate) fn new(client: Client) -> Self {
        Self::with_params(client, CreateFlowParams::default())
    }

    /// The step-up variant: the flow is created with `aal=aal2` and its
    /// success satisfies a pending [`request_step_up`] once the session
    /// manager confirms the refreshed session.
    ///
    /// [`request_step_up`]: auric_core::SessionClient::request_step_up
    pub(crate) fn step_up(client: Client) -> Self {
        Self::with_params(
            client,
            CreateFlowParams {
                aal2: true,
                refresh: true,
                ..CreateFlowParams::default()
            },
        )
    }

    fn with_params(client: Client, params: CreateFlowParams) -> Self {
        Self {
            dispatcher: Dispatcher::new(client.clone()),
            client,
            handle: FlowHandle::new(FlowKind::Login, params),
            local_schema: Schema::new()
                .field("email", FieldSchema::string().min_length(1))
                .field("password", FieldSchema::string().min_length(1))
                .require("email")
                .require("password"),
            on_authenticated: RwLock::new(None),
        }
    }

    /// Register the side-channel invoked after a successful login (e.g. a
    /// pending marketing-form echo). It runs after the session is adopted
    /// and can never fail the login.
    pub fn set_authenticated_hook(&self, hook: AuthenticatedHook) {
        *self
            .on_authenticated
            .write()
            .expect("RwLock should not be poisoned") = Some(hook);
    }

    /// Submit password credentials.
    ///
    /// Local validation runs against the merged schema first; violations
    /// abort without a network call. On success the session is adopted and
    /// navigation goes to `redirect` when given, else the authenticated
    /// landing page. Failures route through the dispatcher; rejected
    /// credentials keep the flow alive so the user can retry it.
    pub async fn submit(
        &self,
        credentials: &LoginCredentials,
        redirect: Option<&str>,
    ) -> Result<(), FlowError> {
        let mut violations = credentials
            .validate()
            .err()
            .map(|errors| violations_from(&errors))
            .unwrap_or_default();

        let schema = self
            .handle
            .effective_schema(&self.client, &self.local_schema)
            .await;
        let values = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        if let Some(values) = values.as_object() {
            violations.extend(schema.validate(values));
        }
        if !violations.is_empty() {
            let error = FlowError::Validation(violations);
            self.handle.submit.fail(error.clone());
            return Err(error);
        }

        let flow = match self.handle.ensure_flow(&self.client).await {
            Ok(flow) => flow,
            Err(error) => {
                self.dispatch(&error, "could not start the sign-in flow").await;
                return Err(error);
            }
        };
        let csrf_token = require!(flow.csrf_token());
        let payload = PasswordLoginPayload::new(
            csrf_token,
            credentials.email.clone(),
            credentials.password.clone(),
        );

        match self
            .handle
            .submit_payload(&self.client, &flow.id, &payload)
            .await
        {
            Ok(SubmitOutcome::Authenticated(response)) => {
                self.finish_login(response.session, redirect);
                Ok(())
            }
            Ok(SubmitOutcome::FlowUpdate(_)) => {
                // Field-level messages; rendered inline from the handle.
                Ok(())
            }
            Err(error) => {
                self.dispatch(&error, "sign-in could not be completed").await;
                Err(error)
            }
        }
    }

    /// Submit a TOTP code against the `aal2` flow.
    pub async fn submit_totp(&self, code: &str, redirect: Option<&str>) -> Result<(), FlowError> {
        let flow = match self.handle.ensure_flow(&self.client).await {
            Ok(flow) => flow,
            Err(error) => {
                self.dispatch(&error, "could not start the second-factor flow")
                    .await;
                return Err(error);
            }
        };
        let csrf_token = require!(flow.csrf_token());
        let payload = TotpLoginPayload::new(csrf_token, code.to_owned());

        match self
            .handle
            .submit_payload(&self.client, &flow.id, &payload)
            .await
        {
            Ok(SubmitOutcome::Authenticated(response)) => {
                self.finish_login(response.session, redirect);
                Ok(())
            }
            Ok(SubmitOutcome::FlowUpdate(_)) => Ok(()),
            Err(error) => {
                self.dispatch(&error, "second factor could not be verified")
                    .await;
                Err(error)
            }
        }
    }

    /// Submit a social (OIDC) provider choice. A flow id already present in
    /// the current URL (redirect-back) is reused instead of creating a new
    /// flow; the usual outcome is a provider-directed browser redirect,
    /// which the dispatcher performs.
    pub async fn submit_oidc(
        &self,
        provider: &str,
        flow_id_in_url: Option<&str>,
    ) -> Result<(), FlowError> {
        let flow = match flow_id_in_url {
            Some(id) => self.handle.resume(&self.client, id).await,
            None => self.handle.ensure_flow(&self.client).await,
        };
        let flow = match flow {
            Ok(flow) => flow,
            Err(error) => {
                self.dispatch(&error, "could not start the social sign-in flow")
                    .await;
                return Err(error);
            }
        };
        let csrf_token = require!(flow.csrf_token());
        let payload = OidcLoginPayload::new(csrf_token, provider.to_owned());

        match self
            .handle
            .submit_payload(&self.client, &flow.id, &payload)
            .await
        {
            Ok(SubmitOutcome::Authenticated(response)) => {
                self.finish_login(response.session, None);
                Ok(())
            }
            Ok(SubmitOutcome::FlowUpdate(_)) => Ok(()),
            Err(error) => {
                self.dispatch(&error, "social sign-in could not be completed")
                    .await;
                Err(error)
            }
        }
    }

    fn finish_login(&self, session: Session, redirect: Option<&str>) {
        self.client.internal.sessions().update_session(session.clone());
        if let Some(hook) = self
            .on_authenticated
            .read()
            .expect("RwLock should not be poisoned")
            .clone()
        {
            hook(&session);
        }
        let target = redirect.unwrap_or(DEFAULT_LANDING_PATH);
        self.client.internal.navigator().navigate(target, &[]);
    }

    async fn dispatch(&self, error: &FlowError, comment: &str) {
        self.dispatcher
            .dispatch(
                error,
                self.handle.kind(),
                comment,
                None,
                || self.handle.reset(),
                None,
            )
            .await;
    }
}
