use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable error identifiers the provider uses to classify flow failures.
///
/// The provider adds identifiers over time; anything unrecognized decodes to
/// [`ErrorId::Unknown`] and takes the default handling path rather than
/// failing deserialization.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorId {
    SessionAlreadyAvailable,
    SessionAal2Required,
    SessionRefreshRequired,
    BrowserLocationChangeRequired,
    SelfServiceFlowExpired,
    SelfServiceFlowReturnToForbidden,
    SecurityCsrfViolation,
    SecurityIdentityMismatch,
    SessionInactive,
    #[serde(other)]
    Unknown,
}

/// Structured error surfaced on a failed submission or flow fetch.
///
/// An absent `id` means generic/unclassified and must fall through to the
/// default handler, never be silently swallowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderError {
    /// Stable identifier used for dispatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ErrorId>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[allow(missing_docs)]
    pub message: String,
    /// Where the provider wants the browser to go, for redirect-style errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_browser_to: Option<String>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{id:?}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Envelope some endpoints wrap [`ProviderError`] in.
///
/// The redirect address occasionally rides on the envelope instead of the
/// error itself; [`Self::into_error`] folds it in so callers see one shape.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderErrorEnvelope {
    #[allow(missing_docs)]
    pub error: ProviderError,
    #[allow(missing_docs)]
    #[serde(default)]
    pub redirect_browser_to: Option<String>,
}

impl ProviderErrorEnvelope {
    /// Flatten into a [`ProviderError`], preferring the inner redirect.
    pub fn into_error(self) -> ProviderError {
        let mut error = self.error;
        if error.redirect_browser_to.is_none() {
            error.redirect_browser_to = self.redirect_browser_to;
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_deserialize_to_variants() {
        let error: ProviderError = serde_json::from_value(serde_json::json!({
            "id": "session_aal2_required",
            "message": "please complete the second factor",
            "redirect_browser_to": "https://id.example.com/self-service/login/browser?aal=aal2"
        }))
        .expect("error should deserialize");
        assert_eq!(error.id, Some(ErrorId::SessionAal2Required));
    }

    #[test]
    fn unrecognized_id_degrades_to_unknown() {
        let error: ProviderError = serde_json::from_value(serde_json::json!({
            "id": "session_token_rotated",
            "message": "try again"
        }))
        .expect("error should deserialize");
        assert_eq!(error.id, Some(ErrorId::Unknown));
    }

    #[test]
    fn envelope_redirect_is_folded_into_the_error() {
        let envelope: ProviderErrorEnvelope = serde_json::from_value(serde_json::json!({
            "error": {"id": "browser_location_change_required", "message": "redirect"},
            "redirect_browser_to": "https://app.example.com/callback"
        }))
        .expect("envelope should deserialize");
        let error = envelope.into_error();
        assert_eq!(
            error.redirect_browser_to.as_deref(),
            Some("https://app.example.com/callback")
        );
    }
}
