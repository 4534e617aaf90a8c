use serde::Serialize;

use crate::{
    ApiError, Configuration,
    error::error_for_response,
    models::{CreateFlowParams, Flow, FlowKind, SubmitResult},
};

/// `GET /self-service/{kind}/browser` — create a fresh flow.
pub async fn create_flow(
    configuration: &Configuration,
    kind: FlowKind,
    params: &CreateFlowParams,
) -> Result<Flow, ApiError> {
    let url = format!(
        "{}/self-service/{}/browser",
        configuration.base_path,
        kind.path_segment()
    );
    let response = configuration
        .get(url)
        .query(&params.query_pairs())
        .send()
        .await?;

    if response.status().is_success() {
        return Ok(response.json().await?);
    }
    Err(error_for_response(response).await)
}

/// `GET /self-service/{kind}/flows?id=` — re-fetch an existing flow by id,
/// used after a redirect back into the application.
pub async fn get_flow(
    configuration: &Configuration,
    kind: FlowKind,
    id: &str,
) -> Result<Flow, ApiError> {
    let url = format!(
        "{}/self-service/{}/flows",
        configuration.base_path,
        kind.path_segment()
    );
    let response = configuration.get(url).query(&[("id", id)]).send().await?;

    if response.status().is_success() {
        return Ok(response.json().await?);
    }
    Err(error_for_response(response).await)
}

/// `POST /self-service/{kind}?flow=` — consume a flow with a
/// method-specific payload.
///
/// A body that decodes as a flow is returned as
/// [`SubmitResult::Flow`] regardless of status: the provider re-renders the
/// flow both for field-level validation failures and for settings or
/// verification successes. Flow-level failures come back as `Err`.
pub async fn submit_flow<P: Serialize>(
    configuration: &Configuration,
    kind: FlowKind,
    flow_id: &str,
    payload: &P,
) -> Result<SubmitResult, ApiError> {
    let url = format!(
        "{}/self-service/{}",
        configuration.base_path,
        kind.path_segment()
    );
    let response = configuration
        .post(url)
        .query(&[("flow", flow_id)])
        .json(payload)
        .send()
        .await?;

    if response.status().is_success() {
        return Ok(response.json().await?);
    }

    let status = response.status();
    let body = response.text().await?;
    if let Ok(flow) = serde_json::from_str::<Flow>(&body) {
        log::debug!("{kind} flow {flow_id} re-rendered with status {status}");
        return Ok(SubmitResult::Flow(flow));
    }
    if let Ok(envelope) = serde_json::from_str::<crate::models::ProviderErrorEnvelope>(&body) {
        return Err(ApiError::Provider(envelope.into_error()));
    }
    if let Ok(error) = serde_json::from_str::<crate::models::ProviderError>(&body) {
        return Err(ApiError::Provider(error));
    }
    Err(ApiError::ResponseContent {
        status,
        message: body,
    })
}
