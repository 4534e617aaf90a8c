use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The self-service operations the provider exposes as flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Login,
    Registration,
    Recovery,
    Verification,
    Settings,
}

impl FlowKind {
    /// The URL path segment for this kind under `/self-service/`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            FlowKind::Login => "login",
            FlowKind::Registration => "registration",
            FlowKind::Recovery => "recovery",
            FlowKind::Verification => "verification",
            FlowKind::Settings => "settings",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Authenticator assurance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AuthLevel {
    #[serde(rename = "aal1")]
    Aal1,
    #[serde(rename = "aal2")]
    Aal2,
}

/// Optional parameters for creating a flow.
#[derive(Debug, Clone, Default)]
pub struct CreateFlowParams {
    /// Request an `aal2` (step-up) flow.
    pub aal2: bool,
    /// Force re-authentication even though a session exists.
    pub refresh: bool,
    /// Address to return the browser to once the flow completes.
    pub return_to: Option<String>,
    /// OAuth2 login challenge passed through when the provider also acts
    /// as an OAuth2 server.
    pub login_challenge: Option<String>,
}

impl CreateFlowParams {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.aal2 {
            pairs.push(("aal", "aal2".to_owned()));
        }
        if self.refresh {
            pairs.push(("refresh", "true".to_owned()));
        }
        if let Some(return_to) = &self.return_to {
            pairs.push(("return_to", return_to.clone()));
        }
        if let Some(login_challenge) = &self.login_challenge {
            pairs.push(("login_challenge", login_challenge.clone()));
        }
        pairs
    }
}

/// A server-issued, time-limited self-service flow.
///
/// Created by one create/fetch call and consumed by exactly one matching
/// submit call. After expiry, or after a `self_service_flow_expired` error,
/// the flow must be discarded and a fresh one fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
    /// Opaque flow identifier.
    pub id: String,
    /// "browser" or "api".
    #[serde(rename = "type", default)]
    pub flow_type: Option<String>,
    /// When the provider stops accepting submissions for this flow.
    pub expires_at: DateTime<Utc>,
    #[allow(missing_docs)]
    pub issued_at: DateTime<Utc>,
    /// The URL that initiated this flow, if the provider reports it.
    #[serde(default)]
    pub request_url: Option<String>,
    /// Assurance level the provider demands for this flow, when requested.
    #[serde(default)]
    pub requested_aal: Option<AuthLevel>,
    /// Form descriptors and flow-level messages.
    pub ui: FlowUi,
    /// Address the browser returns to after the flow completes.
    #[serde(default)]
    pub return_to: Option<String>,
}

/// UI fragment of a flow: field descriptors plus flow-level messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowUi {
    #[allow(missing_docs)]
    #[serde(default)]
    pub action: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub method: Option<String>,
    /// Ordered field descriptors.
    #[serde(default)]
    pub nodes: Vec<UiNode>,
    /// Messages that apply to the flow as a whole.
    #[serde(default)]
    pub messages: Vec<UiMessage>,
}

/// A single form field descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiNode {
    /// Field name, e.g. `csrf_token` or `identifier`.
    pub name: String,
    /// Input type, e.g. `text`, `password`, `hidden`.
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub required: bool,
    /// Current value, pre-filled by the provider where applicable.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub disabled: bool,
    /// Messages scoped to this field.
    #[serde(default)]
    pub messages: Vec<UiMessage>,
}

/// A provider message with a stable numeric identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiMessage {
    /// Stable numeric message id, e.g. `4000006` for rejected credentials.
    pub id: u32,
    #[allow(missing_docs)]
    pub text: String,
    #[allow(missing_docs)]
    #[serde(rename = "type", default)]
    pub kind: UiMessageKind,
}

/// Severity of a [`UiMessage`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiMessageKind {
    #[default]
    Info,
    Error,
    Success,
}

impl Flow {
    /// The anti-forgery token that must accompany every submission,
    /// extracted from the `csrf_token` UI node.
    pub fn csrf_token(&self) -> Option<String> {
        self.ui
            .nodes
            .iter()
            .find(|node| node.name == "csrf_token")
            .and_then(|node| node.value.as_ref())
            .and_then(|value| value.as_str())
            .map(str::to_owned)
    }

    /// Whether this flow demands step-up authentication.
    pub fn requires_step_up(&self) -> bool {
        self.requested_aal == Some(AuthLevel::Aal2)
    }

    /// Iterate over every message on the flow, flow-level first, then
    /// field-level in node order.
    pub fn all_messages(&self) -> impl Iterator<Item = &UiMessage> {
        self.ui
            .messages
            .iter()
            .chain(self.ui.nodes.iter().flat_map(|node| node.messages.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow_json() -> serde_json::Value {
        serde_json::json!({
            "id": "f81b2c7e-0001",
            "type": "browser",
            "expires_at": "2026-01-01T10:30:00Z",
            "issued_at": "2026-01-01T10:00:00Z",
            "requested_aal": "aal1",
            "ui": {
                "action": "https://id.example.com/self-service/login?flow=f81b2c7e-0001",
                "method": "POST",
                "nodes": [
                    {"name": "csrf_token", "type": "hidden", "required": true, "value": "csrf-123"},
                    {"name": "identifier", "type": "text", "required": true},
                    {"name": "password", "type": "password", "required": true,
                     "messages": [{"id": 4000002, "text": "Property password is missing.", "type": "error"}]}
                ],
                "messages": [{"id": 1010001, "text": "Sign in", "type": "info"}]
            }
        })
    }

    #[test]
    fn csrf_token_is_read_from_the_named_node() {
        let flow: Flow = serde_json::from_value(flow_json()).expect("flow should deserialize");
        assert_eq!(flow.csrf_token().as_deref(), Some("csrf-123"));
        assert!(!flow.requires_step_up());
    }

    #[test]
    fn all_messages_yields_flow_level_before_field_level() {
        let flow: Flow = serde_json::from_value(flow_json()).expect("flow should deserialize");
        let ids: Vec<u32> = flow.all_messages().map(|m| m.id).collect();
        assert_eq!(ids, vec![1010001, 4000002]);
    }

    #[test]
    fn missing_csrf_node_yields_none() {
        let mut value = flow_json();
        value["ui"]["nodes"] = serde_json::json!([]);
        let flow: Flow = serde_json::from_value(value).expect("flow should deserialize");
        assert_eq!(flow.csrf_token(), None);
    }
}
