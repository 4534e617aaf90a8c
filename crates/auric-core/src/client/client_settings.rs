use serde::{Deserialize, Serialize};

/// Basic client behavior settings. These specify the targeted identity
/// provider and request metadata. They are optional and uneditable once the
/// client is initialized.
///
/// Defaults to
///
/// ```
/// # use auric_core::ClientSettings;
/// let settings = ClientSettings {
///     public_url: "https://id.auric.dev".to_string(),
///     user_agent: "Auric Rust-SDK".to_string(),
///     client_version: None,
/// };
/// let default = ClientSettings::default();
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ClientSettings {
    /// Base URL of the identity provider's public endpoint.
    pub public_url: String,
    /// The user agent sent with every request.
    pub user_agent: String,
    /// Embedding application version, appended to the user agent when set.
    pub client_version: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            public_url: "https://id.auric.dev".into(),
            user_agent: "Auric Rust-SDK".into(),
            client_version: None,
        }
    }
}

impl ClientSettings {
    pub(crate) fn full_user_agent(&self) -> String {
        match &self.client_version {
            Some(version) => format!("{} {}", self.user_agent, version),
            None => self.user_agent.clone(),
        }
    }
}
