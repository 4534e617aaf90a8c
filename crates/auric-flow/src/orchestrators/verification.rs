use auric_api::models::{CreateFlowParams, FlowKind, VerificationPayload};
use auric_core::{Client, require};

use super::has_error_messages;
use crate::{
    FlowError, SubmitOutcome,
    dispatcher::Dispatcher,
    flow_handle::FlowHandle,
    schema::FieldViolation,
};

/// Orchestrates email verification, the same two-step code exchange as
/// recovery. Verification has no session side effect; success is reported
/// by the provider as a re-rendered flow in the passed state.
pub struct VerificationOrchestrator {
    client: Client,
    dispatcher: Dispatcher,
    /// Flow state and operation containers, readable by the embedder.
    pub handle: FlowHandle,
}

impl VerificationOrchestrator {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            dispatcher: Dispatcher::new(client.clone()),
            client,
            handle: FlowHandle::new(FlowKind::Verification, CreateFlowParams::default()),
        }
    }

    /// Resume a verification flow whose id arrived in the current URL,
    /// typically from the link in the verification email.
    pub async fn resume(&self, flow_id: &str) -> Result<(), FlowError> {
        match self.handle.resume(&self.client, flow_id).await {
            Ok(_) => Ok(()),
            Err(error) => {
                self.dispatch(&error, "could not resume the verification flow")
                    .await;
                Err(error)
            }
        }
    }

    /// Ask the provider to send a verification code to `email`.
    pub async fn request_code(&self, email: &str) -> Result<(), FlowError> {
        if email.is_empty() {
            let error = FlowError::Validation(vec![FieldViolation::new(
                "email",
                "an email address is required",
            )]);
            self.handle.submit.fail(error.clone());
            return Err(error);
        }

        let flow = match self.handle.ensure_flow(&self.client).await {
            Ok(flow) => flow,
            Err(error) => {
                self.dispatch(&error, "could not start the verification flow")
                    .await;
                return Err(error);
            }
        };
        let csrf_token = require!(flow.csrf_token());
        let payload = VerificationPayload::request(csrf_token, email.to_owned());

        match self
            .handle
            .submit_payload(&self.client, &flow.id, &payload)
            .await
        {
            Ok(_) => Ok(()),
            Err(error) => {
                self.dispatch(&error, "the verification code could not be sent")
                    .await;
                Err(error)
            }
        }
    }

    /// Answer the challenge with the received code. Returns `true` when the
    /// provider accepted it, `false` when the re-rendered flow still
    /// carries error messages (wrong or expired code).
    pub async fn confirm_code(&self, code: &str) -> Result<bool, FlowError> {
        let flow = match self.handle.ensure_flow(&self.client).await {
            Ok(flow) => flow,
            Err(error) => {
                self.dispatch(&error, "could not resume the verification flow")
                    .await;
                return Err(error);
            }
        };
        let csrf_token = require!(flow.csrf_token());
        let payload = VerificationPayload::confirm(csrf_token, code.to_owned());

        match self
            .handle
            .submit_payload(&self.client, &flow.id, &payload)
            .await
        {
            Ok(SubmitOutcome::FlowUpdate(flow)) => Ok(!has_error_messages(&flow)),
            Ok(SubmitOutcome::Authenticated(_)) => Ok(true),
            Err(error) => {
                self.dispatch(&error, "the verification code was not accepted")
                    .await;
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
