use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Flow;

/// The authenticated identity as reported by the provider.
///
/// At most one session is live in the application at a time; its absence is
/// the canonical logged-out state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[allow(missing_docs)]
    pub id: Uuid,
    #[allow(missing_docs)]
    #[serde(default)]
    pub active: bool,
    #[allow(missing_docs)]
    #[serde(default)]
    pub authenticated_at: Option<DateTime<Utc>>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Strength of the authentication backing this session.
    #[serde(default)]
    pub authenticator_assurance_level: Option<super::AuthLevel>,
    #[allow(missing_docs)]
    pub identity: Identity,
    /// Devices this session has been seen from.
    #[serde(default)]
    pub devices: Vec<SessionDevice>,
}

impl Session {
    /// Whether the session is active and, if an expiry is reported, unexpired.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// The identity a session belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    #[allow(missing_docs)]
    pub id: Uuid,
    /// Schema the identity's traits conform to.
    #[serde(default)]
    pub schema_id: Option<String>,
    #[allow(missing_docs)]
    pub traits: IdentityTraits,
}

/// User-editable attributes of an identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityTraits {
    #[allow(missing_docs)]
    pub email: String,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<PersonName>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonName {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}

/// A device a session was observed on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionDevice {
    #[allow(missing_docs)]
    #[serde(default)]
    pub ip_address: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub user_agent: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub location: Option<String>,
}

/// Successful submission body carrying the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    #[allow(missing_docs)]
    pub session: Session,
    /// Present for API flows only; browser flows rely on the session cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

/// Body of a flow submission response.
///
/// A submission either authenticates (a session comes back), or the provider
/// re-renders the flow with field-level messages. Settings and verification
/// flows also answer success with a re-rendered flow, so a flow body is not
/// by itself a failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubmitResult {
    /// The submission authenticated.
    Session(SessionResponse),
    /// The provider re-rendered the flow.
    Flow(Flow),
}
