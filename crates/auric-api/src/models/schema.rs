use serde::{Deserialize, Serialize};

/// A JSON-schema fragment describing identity traits, as served by
/// `GET /schemas/{id}`.
///
/// Kept as raw JSON here; lowering into validation constraints happens in
/// the flow layer, which merges it with the locally-authored schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteSchema(pub serde_json::Value);

impl RemoteSchema {
    /// The per-field property map, preferring the nested `traits` object the
    /// provider uses for identity schemas, falling back to the top level.
    pub fn properties(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        let root = &self.0;
        let traits = root
            .pointer("/properties/traits")
            .filter(|traits| traits.get("properties").is_some());
        let scope = traits.unwrap_or(root);
        scope.get("properties")?.as_object()
    }

    /// Names of required fields in the same scope as [`Self::properties`].
    pub fn required(&self) -> Vec<String> {
        let root = &self.0;
        let scope = root
            .pointer("/properties/traits")
            .filter(|traits| traits.get("properties").is_some())
            .unwrap_or(root);
        scope
            .get("required")
            .and_then(|required| required.as_array())
            .map(|names| {
                names
                    .iter()
                    .filter_map(|name| name.as_str())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}
