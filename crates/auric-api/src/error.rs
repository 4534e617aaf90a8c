use reqwest::StatusCode;
use thiserror::Error;

use crate::models::{ProviderError, ProviderErrorEnvelope};

/// Errors from performing requests against the identity provider.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    /// A structured error returned by the provider's error channel.
    #[error("provider error: {0}")]
    Provider(ProviderError),

    #[error("Received error message from server: [{}] {}", .status, .message)]
    ResponseContent { status: StatusCode, message: String },
}

/// Decode a non-success response body into the most specific error we can.
///
/// The provider conflates transport, validation and security errors into one
/// channel. Most endpoints wrap the structured error in an `{"error": ...}`
/// envelope, some return it bare, and anything else is preserved verbatim as
/// [`ApiError::ResponseContent`] so it is never silently dropped.
pub(crate) async fn error_for_response(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return ApiError::Reqwest(e),
    };

    if let Ok(envelope) = serde_json::from_str::<ProviderErrorEnvelope>(&body) {
        return ApiError::Provider(envelope.into_error());
    }
    if let Ok(error) = serde_json::from_str::<ProviderError>(&body) {
        return ApiError::Provider(error);
    }

    ApiError::ResponseContent {
        status,
        message: body,
    }
}
