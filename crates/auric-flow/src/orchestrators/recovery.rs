use auric_api::models::{CreateFlowParams, FlowKind, RecoveryPayload};
use auric_core::{Client, require};

use crate::{
    FlowError, SubmitOutcome,
    dispatcher::Dispatcher,
    flow_handle::FlowHandle,
    schema::FieldViolation,
};

/// Orchestrates account recovery: request a one-time code by email, then
/// answer the challenge with it. Both steps run against the same flow; a
/// successful confirmation ends in a provider-directed redirect into the
/// settings flow, where the user sets a new password.
pub struct RecoveryOrchestrator {
    client: Client,
    dispatcher: Dispatcher,
    /// Flow state and operation containers, readable by the embedder.
    pub handle: FlowHandle,
}

impl RecoveryOrchestrator {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            dispatcher: Dispatcher::new(client.clone()),
            client,
            handle: FlowHandle::new(FlowKind::Recovery, CreateFlowParams::default()),
        }
    }

    /// Ask the provider to send a recovery code to `email`.
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
                self.dispatch(&error, "could not start the recovery flow").await;
                return Err(error);
            }
        };
        let csrf_token = require!(flow.csrf_token());
        let payload = RecoveryPayload::request(csrf_token, email.to_owned());

        // The provider answers the email step with a re-rendered flow in
        // the code-entry state.
        match self
            .handle
            .submit_payload(&self.client, &flow.id, &payload)
            .await
        {
            Ok(_) => Ok(()),
            Err(error) => {
                self.dispatch(&error, "the recovery code could not be sent")
                    .await;
                Err(error)
            }
        }
    }

    /// Answer the challenge with the received code.
    ///
    /// Success arrives as a `browser_location_change_required` redirect
    /// into the settings flow; the dispatcher performs that navigation.
    pub async fn confirm_code(&self, code: &str) -> Result<(), FlowError> {
        let flow = match self.handle.ensure_flow(&self.client).await {
            Ok(flow) => flow,
            Err(error) => {
                self.dispatch(&error, "could not resume the recovery flow").await;
                return Err(error);
            }
        };
        let csrf_token = require!(flow.csrf_token());
        let payload = RecoveryPayload::confirm(csrf_token, code.to_owned());

        match self
            .handle
            .submit_payload(&self.client, &flow.id, &payload)
            .await
        {
            Ok(SubmitOutcome::Authenticated(response)) => {
                self.client.internal.sessions().update_session(response.session);
                Ok(())
            }
            Ok(SubmitOutcome::FlowUpdate(_)) => Ok(()),
            Err(error) => {
                self.dispatch(&error, "the recovery code was not accepted")
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

#[cfg(test)]
mod tests {
    use auric_test::start_api_mock;
    use wiremock::{Mock, ResponseTemplate, matchers};

    use super::*;
    use crate::test_support::recording_client;

    fn flow_json(state: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "rec-1",
            "expires_at": "2026-01-01T10:30:00Z",
            "issued_at": "2026-01-01T10:00:00Z",
            "state": state,
            "ui": {"nodes": [
                {"name": "csrf_token", "type": "hidden", "value": "csrf-rec-1"}
            ]}
        })
    }

    #[tokio::test]
    async fn both_steps_reuse_one_flow() {
        let (server, configuration) = start_api_mock(vec![
            Mock::given(matchers::method("GET"))
                .and(matchers::path("/self-service/recovery/browser"))
                .respond_with(ResponseTemplate::new(200).set_body_json(flow_json("choose_method"))),
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/self-service/recovery"))
                .and(matchers::query_param("flow", "rec-1"))
                .and(matchers::body_partial_json(
                    serde_json::json!({"method": "code", "email": "a@b.com"}),
                ))
                .respond_with(ResponseTemplate::new(200).set_body_json(flow_json("sent_email"))),
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/self-service/recovery"))
                .and(matchers::body_partial_json(
                    serde_json::json!({"method": "code", "code": "012345"}),
                ))
                .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                    "error": {
                        "id": "browser_location_change_required",
                        "message": "follow the redirect",
                        "redirect_browser_to": "https://id.example.com/self-service/settings/browser?flow=set-1"
                    }
                }))),
        ])
        .await;
        let (client, _notifier, navigator) = recording_client(configuration);

        let orchestrator = RecoveryOrchestrator::new(client);
        orchestrator
            .request_code("a@b.com")
            .await
            .expect("the email step should succeed");
        assert_eq!(
            orchestrator.handle.current().map(|flow| flow.id),
            Some("rec-1".to_owned())
        );

        let error = orchestrator
            .confirm_code("012345")
            .await
            .expect_err("the settings redirect surfaces as an error");
        assert_eq!(
            error.error_id(),
            Some(auric_api::models::ErrorId::BrowserLocationChangeRequired)
        );
        assert_eq!(
            navigator.redirects(),
            vec!["https://id.example.com/self-service/settings/browser?flow=set-1".to_owned()]
        );
        // One create plus two submits; the flow was never re-created.
        assert_eq!(server.received_requests().await.map(|r| r.len()), Some(3));
    }

    #[tokio::test]
    async fn an_empty_email_never_reaches_the_network() {
        let (server, configuration) = start_api_mock(vec![]).await;
        let (client, _notifier, _navigator) = recording_client(configuration);

        let error = RecoveryOrchestrator::new(client)
            .request_code("")
            .await
            .expect_err("validation should fail");
        assert!(matches!(error, FlowError::Validation(_)));
        assert_eq!(server.received_requests().await.map(|r| r.len()), Some(0));
    }
}
