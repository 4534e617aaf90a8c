use std::sync::RwLock;

use auric_api::{
    endpoints,
    models::{CreateFlowParams, Flow, FlowKind, SessionResponse, SubmitResult, UiMessageKind},
};
use auric_core::Client;
use serde::Serialize;

use crate::{
    FlowError,
    operation::Operation,
    schema::Schema,
};

/// UI message id the provider uses for rejected credentials.
pub(crate) const INVALID_CREDENTIALS_MESSAGE_ID: u32 = 4000006;

/// Schema id used while no live session names one.
const DEFAULT_SCHEMA_ID: &str = "default";

/// Outcome of a flow submission, as seen by orchestrators.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The submission authenticated and carries the new session.
    Authenticated(SessionResponse),
    /// The provider re-rendered the flow, either with field-level messages
    /// or (settings/verification) with a success state.
    FlowUpdate(Flow),
}

/// Per-orchestrator flow state: the current flow, the fetch and submit
/// operation containers, and the cached remote schema.
///
/// A flow is owned exclusively by the orchestrator holding the handle and
/// is never shared. After a flow-state error the dispatcher calls
/// [`FlowHandle::reset`], so the next attempt fetches a brand-new flow.
pub struct FlowHandle {
    kind: FlowKind,
    params: CreateFlowParams,
    flow: RwLock<Option<Flow>>,
    /// Container for create/re-fetch calls.
    pub fetch: Operation<Flow>,
    /// Container for submit calls.
    pub submit: Operation<SubmitOutcome>,
    remote_schema: RwLock<Option<Schema>>,
}

impl FlowHandle {
    pub(crate) fn new(kind: FlowKind, params: CreateFlowParams) -> Self {
        Self {
            kind,
            params,
            flow: RwLock::new(None),
            fetch: Operation::new(),
            submit: Operation::new(),
            remote_schema: RwLock::new(None),
        }
    }

    pub(crate) fn kind(&self) -> FlowKind {
        self.kind
    }

    /// The currently held flow, if any.
    pub fn current(&self) -> Option<Flow> {
        self.flow
            .read()
            .expect("RwLock should not be poisoned")
            .clone()
    }

    /// Discard the current flow. The next [`Self::ensure_flow`] fetches a
    /// fresh one with a distinct id.
    pub fn reset(&self) {
        log::debug!("discarding {} flow", self.kind);
        *self.flow.write().expect("RwLock should not be poisoned") = None;
    }

    pub(crate) fn adopt(&self, flow: Flow) {
        *self.flow.write().expect("RwLock should not be poisoned") = Some(flow);
    }

    /// Reuse the current flow or create a fresh one.
    pub(crate) async fn ensure_flow(&self, client: &Client) -> Result<Flow, FlowError> {
        if let Some(flow) = self.current() {
            return Ok(flow);
        }
        let configuration = client.internal.get_api_configuration();
        let flow = self
            .fetch
            .run(async {
                endpoints::create_flow(&configuration, self.kind, &self.params)
                    .await
                    .map_err(FlowError::from)
            })
            .await?;
        self.adopt(flow.clone());
        Ok(flow)
    }

    /// Re-fetch an existing flow by id (after a redirect back into the
    /// application) and adopt it.
    pub(crate) async fn resume(&self, client: &Client, id: &str) -> Result<Flow, FlowError> {
        let configuration = client.internal.get_api_configuration();
        let flow = self
            .fetch
            .run(async {
                endpoints::get_flow(&configuration, self.kind, id)
                    .await
                    .map_err(FlowError::from)
            })
            .await?;
        self.adopt(flow.clone());
        Ok(flow)
    }

    /// Submit a payload against the current flow.
    ///
    /// A re-rendered flow replaces the held one (it carries a fresh CSRF
    /// token); when it reports rejected credentials the submission fails
    /// with [`FlowError::InvalidCredentials`] while the flow itself
    /// survives for a retry.
    pub(crate) async fn submit_payload<P: Serialize>(
        &self,
        client: &Client,
        flow_id: &str,
        payload: &P,
    ) -> Result<SubmitOutcome, FlowError> {
        let configuration = client.internal.get_api_configuration();
        self.submit
            .run(async {
                let result =
                    endpoints::submit_flow(&configuration, self.kind, flow_id, payload).await?;
                match result {
                    SubmitResult::Session(response) => Ok(SubmitOutcome::Authenticated(response)),
                    SubmitResult::Flow(flow) => {
                        let rejected = credentials_rejected(&flow);
                        self.adopt(flow.clone());
                        if rejected {
                            Err(FlowError::InvalidCredentials)
                        } else {
                            Ok(SubmitOutcome::FlowUpdate(flow))
                        }
                    }
                }
            })
            .await
    }

    /// The schema enforced before submitting: the local schema merged with
    /// the provider fragment, which is fetched once per handle and cached.
    /// The fragment id comes from the live session's identity schema, so
    /// non-default deployments validate against the right one; anonymous
    /// flows fall back to the default id. A failed fragment fetch degrades
    /// to the local schema alone.
    pub(crate) async fn effective_schema(&self, client: &Client, local: &Schema) -> Schema {
        if let Some(remote) = self
            .remote_schema
            .read()
            .expect("RwLock should not be poisoned")
            .as_ref()
        {
            return Schema::merge(local, Some(remote));
        }

        let schema_id = client
            .internal
            .sessions()
            .current()
            .and_then(|session| session.identity.schema_id)
            .unwrap_or_else(|| DEFAULT_SCHEMA_ID.to_owned());
        let configuration = client.internal.get_api_configuration();
        match endpoints::traits_schema(&configuration, &schema_id).await {
            Ok(remote) => {
                let lowered = Schema::from_remote(&remote);
                *self
                    .remote_schema
                    .write()
                    .expect("RwLock should not be poisoned") = Some(lowered.clone());
                Schema::merge(local, Some(&lowered))
            }
            Err(e) => {
                log::warn!("schema fetch failed; validating with the local schema only: {e}");
                local.clone()
            }
        }
    }
}

/// Whether a re-rendered flow reports the rejected-credentials message.
pub(crate) fn credentials_rejected(flow: &Flow) -> bool {
    flow.all_messages()
        .any(|m| m.id == INVALID_CREDENTIALS_MESSAGE_ID && m.kind == UiMessageKind::Error)
}

#[cfg(test)]
mod tests {
    use auric_api::models::Session;
    use auric_test::start_api_mock;
    use wiremock::{Mock, ResponseTemplate, matchers};

    use super::*;
    use crate::test_support::recording_client;

    #[tokio::test]
    async fn schema_fragment_is_fetched_for_the_sessions_identity_schema() {
        let (_server, configuration) = start_api_mock(vec![
            Mock::given(matchers::method("GET"))
                .and(matchers::path("/schemas/employee"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "properties": {"email": {"type": "string", "format": "email"}}
                }))),
        ])
        .await;
        let (client, _notifier, _navigator) = recording_client(configuration);

        let session: Session = serde_json::from_value(serde_json::json!({
            "id": uuid::Uuid::new_v4(),
            "active": true,
            "identity": {
                "id": uuid::Uuid::new_v4(),
                "schema_id": "employee",
                "traits": {"email": "a@b.com"}
            }
        }))
        .expect("session should deserialize");
        client.internal.sessions().update_session(session);

        let handle = FlowHandle::new(FlowKind::Settings, CreateFlowParams::default());
        let merged = handle.effective_schema(&client, &Schema::new()).await;
        assert_eq!(
            merged
                .properties
                .get("email")
                .and_then(|field| field.format.as_deref()),
            Some("email")
        );
    }
}
