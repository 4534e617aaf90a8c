use auric_api::models::{
    CreateFlowParams, FlowKind, IdentityTraits, PersonName, RegistrationPayload,
};
use auric_core::{Client, require};
use serde::Serialize;
use validator::Validate;

use super::{has_error_messages, violations_from};
use crate::{
    FlowError, SubmitOutcome,
    dispatcher::{DEFAULT_LANDING_PATH, Dispatcher},
    flow_handle::FlowHandle,
    schema::{FieldSchema, Schema},
};

/// Where to send a freshly signed-up user when the provider does not
/// issue a session on signup and an email verification is pending.
const VERIFICATION_NOTICE_PATH: &str = "/verify";

/// Input for a `method: password` signup.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SignupDetails {
    #[allow(missing_docs)]
    #[validate(email)]
    pub email: String,
    #[allow(missing_docs)]
    #[validate(length(min = 8))]
    pub password: String,
    #[allow(missing_docs)]
    pub first_name: Option<String>,
    #[allow(missing_docs)]
    pub last_name: Option<String>,
}

impl SignupDetails {
    fn traits(&self) -> IdentityTraits {
        let name = match (&self.first_name, &self.last_name) {
            (None, None) => None,
            (first, last) => Some(PersonName {
                first: first.clone(),
                last: last.clone(),
            }),
        };
        IdentityTraits {
            email: self.email.clone(),
            name,
        }
    }
}

/// Orchestrates the signup flow. Providers configured for session-on-signup
/// answer with a session, which is adopted exactly like a login.
pub struct RegistrationOrchestrator {
    client: Client,
    dispatcher: Dispatcher,
    /// Flow state and operation containers, readable by the embedder.
    pub handle: FlowHandle,
    local_schema: Schema,
}

impl RegistrationOrchestrator {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            dispatcher: Dispatcher::new(client.clone()),
            client,
            handle: FlowHandle::new(FlowKind::Registration, CreateFlowParams::default()),
            local_schema: Schema::new()
                .field("email", FieldSchema::string().min_length(1))
                .field("password", FieldSchema::string().min_length(8))
                .require("email")
                .require("password"),
        }
    }

    /// Submit the signup form.
    pub async fn submit(
        &self,
        details: &SignupDetails,
        redirect: Option<&str>,
    ) -> Result<(), FlowError> {
        let mut violations = details
            .validate()
            .err()
            .map(|errors| violations_from(&errors))
            .unwrap_or_default();

        let schema = self
            .handle
            .effective_schema(&self.client, &self.local_schema)
            .await;
        let values = serde_json::json!({
            "email": details.email,
            "password": details.password,
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
                self.dispatch(&error, "could not start the signup flow").await;
                return Err(error);
            }
        };
        let csrf_token = require!(flow.csrf_token());
        let payload =
            RegistrationPayload::new(csrf_token, details.password.clone(), details.traits());

        match self
            .handle
            .submit_payload(&self.client, &flow.id, &payload)
            .await
        {
            Ok(SubmitOutcome::Authenticated(response)) => {
                self.client.internal.sessions().update_session(response.session);
                let target = redirect.unwrap_or(DEFAULT_LANDING_PATH);
                self.client.internal.navigator().navigate(target, &[]);
                Ok(())
            }
            Ok(SubmitOutcome::FlowUpdate(flow)) => {
                // Without session-on-signup the provider re-renders the
                // flow; a clean re-render means the account exists and a
                // verification email is on its way.
                if !has_error_messages(&flow) {
                    self.client
                        .internal
                        .navigator()
                        .navigate(VERIFICATION_NOTICE_PATH, &[]);
                }
                Ok(())
            }
            Err(error) => {
                self.dispatch(&error, "signup could not be completed").await;
                Err(error)
            }
        }
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
