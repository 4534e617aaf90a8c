use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response of `GET /self-service/logout/browser`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutFlow {
    /// Token to submit to `/self-service/logout`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout_token: Option<String>,
    /// Fully-formed logout URL, used when the token is not surfaced directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout_url: Option<String>,
}

impl LogoutFlow {
    /// The logout token: the explicit `logout_token` field if present,
    /// otherwise parsed out of `logout_url`'s query string.
    pub fn token(&self) -> Option<String> {
        if let Some(token) = &self.logout_token {
            return Some(token.clone());
        }
        let url = self.logout_url.as_deref()?;
        let (_, query) = url.split_once('?')?;
        let params: BTreeMap<String, String> = serde_qs::from_str(query).ok()?;
        params.get("token").cloned()
    }
}
