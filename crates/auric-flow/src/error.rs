use std::sync::Arc;

use auric_api::{
    ApiError,
    models::{ErrorId, ProviderError},
};
use thiserror::Error;

use crate::schema::FieldViolation;

/// Normalized failure of a flow operation.
///
/// Cheap to clone so the same value can live in an operation container and
/// travel back to the caller: every flow client failure is represented in
/// its operation result *and* returned as `Err`.
#[derive(Debug, Clone, Error)]
pub enum FlowError {
    /// The provider rejected the credentials (UI message id `4000006`).
    /// The flow survives; the user may retry against it.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Submitted values failed local validation; nothing was sent.
    /// Rendered inline against the fields, never dispatched.
    #[error("submitted values failed validation")]
    Validation(Vec<FieldViolation>),

    /// A wire-level failure, including structured provider errors.
    #[error("{0}")]
    Api(Arc<ApiError>),
}

impl From<ApiError> for FlowError {
    fn from(error: ApiError) -> Self {
        Self::Api(Arc::new(error))
    }
}

// A missing field in an otherwise well-formed body is a malformed-response
// condition; classifying it as response content keeps it in the default
// dispatch branch.
impl From<auric_core::MissingFieldError> for FlowError {
    fn from(error: auric_core::MissingFieldError) -> Self {
        Self::Api(Arc::new(ApiError::ResponseContent {
            status: auric_api::StatusCode::BAD_GATEWAY,
            message: error.to_string(),
        }))
    }
}

impl FlowError {
    /// The structured provider error, when this failure carries one.
    pub fn provider(&self) -> Option<&ProviderError> {
        match self {
            FlowError::Api(api) => match api.as_ref() {
                ApiError::Provider(provider) => Some(provider),
                _ => None,
            },
            _ => None,
        }
    }

    /// The stable error identifier, when present.
    pub fn error_id(&self) -> Option<ErrorId> {
        self.provider().and_then(|provider| provider.id)
    }
}
