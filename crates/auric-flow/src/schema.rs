//! Validation schema merging.
//!
//! Each orchestrator authors a local schema for instant feedback; the
//! provider serves a per-kind fragment fetched once and cached. The schema
//! actually enforced before a submission is the merge of the two. Merging
//! is pure data work: it never touches values the user has already entered.

use std::collections::{BTreeMap, BTreeSet};

use auric_api::models::RemoteSchema;

/// Per-field validation constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSchema {
    #[allow(missing_docs)]
    pub field_type: Option<String>,
    /// Named format, e.g. `email`.
    pub format: Option<String>,
    /// Regular expression the value must match.
    pub pattern: Option<String>,
    #[allow(missing_docs)]
    pub min_length: Option<u64>,
    #[allow(missing_docs)]
    pub max_length: Option<u64>,
    #[allow(missing_docs)]
    pub minimum: Option<f64>,
    #[allow(missing_docs)]
    pub maximum: Option<f64>,
}

impl FieldSchema {
    /// A string-typed field with no further constraints.
    pub fn string() -> Self {
        Self {
            field_type: Some("string".to_owned()),
            ..Self::default()
        }
    }

    #[allow(missing_docs)]
    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_owned());
        self
    }

    #[allow(missing_docs)]
    pub fn min_length(mut self, min_length: u64) -> Self {
        self.min_length = Some(min_length);
        self
    }

    #[allow(missing_docs)]
    pub fn max_length(mut self, max_length: u64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    #[allow(missing_docs)]
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_owned());
        self
    }

    /// Layer `remote` onto `self`: a remote constraint wins where set,
    /// the local one is kept where the remote is silent.
    fn overlay(&self, remote: &FieldSchema) -> FieldSchema {
        FieldSchema {
            field_type: remote.field_type.clone().or_else(|| self.field_type.clone()),
            format: remote.format.clone().or_else(|| self.format.clone()),
            pattern: remote.pattern.clone().or_else(|| self.pattern.clone()),
            min_length: remote.min_length.or(self.min_length),
            max_length: remote.max_length.or(self.max_length),
            minimum: remote.minimum.or(self.minimum),
            maximum: remote.maximum.or(self.maximum),
        }
    }

    fn from_json(value: &serde_json::Value) -> FieldSchema {
        FieldSchema {
            field_type: value.get("type").and_then(|v| v.as_str()).map(str::to_owned),
            format: value
                .get("format")
                .and_then(|v| v.as_str())
                .map(str::to_owned),
            pattern: value
                .get("pattern")
                .and_then(|v| v.as_str())
                .map(str::to_owned),
            min_length: value.get("minLength").and_then(|v| v.as_u64()),
            max_length: value.get("maxLength").and_then(|v| v.as_u64()),
            minimum: value.get("minimum").and_then(|v| v.as_f64()),
            maximum: value.get("maximum").and_then(|v| v.as_f64()),
        }
    }
}

/// A violation reported by [`Schema::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    #[allow(missing_docs)]
    pub field: String,
    #[allow(missing_docs)]
    pub message: String,
}

impl FieldViolation {
    pub(crate) fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

/// An ordered set of field constraints plus the required-field set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    #[allow(missing_docs)]
    pub properties: BTreeMap<String, FieldSchema>,
    #[allow(missing_docs)]
    pub required: BTreeSet<String>,
}

impl Schema {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field constraint.
    pub fn field(mut self, name: &str, field: FieldSchema) -> Self {
        self.properties.insert(name.to_owned(), field);
        self
    }

    /// Mark a field required.
    pub fn require(mut self, name: &str) -> Self {
        self.required.insert(name.to_owned());
        self
    }

    /// Merge a provider-supplied schema onto a locally-authored one.
    ///
    /// Absent remote, the local schema is returned unchanged. Otherwise the
    /// remote's per-field constraints are layered onto the local field set
    /// by name; fields present only remotely are added, fields present only
    /// locally are kept, and the required sets are unioned.
    pub fn merge(local: &Schema, remote: Option<&Schema>) -> Schema {
        let Some(remote) = remote else {
            return local.clone();
        };

        let mut merged = local.clone();
        for (name, remote_field) in &remote.properties {
            let field = match merged.properties.get(name) {
                Some(local_field) => local_field.overlay(remote_field),
                None => remote_field.clone(),
            };
            merged.properties.insert(name.clone(), field);
        }
        merged.required.extend(remote.required.iter().cloned());
        merged
    }

    /// Lower the provider's JSON-schema fragment into constraints.
    pub fn from_remote(remote: &RemoteSchema) -> Schema {
        let mut schema = Schema::new();
        if let Some(properties) = remote.properties() {
            for (name, value) in properties {
                schema
                    .properties
                    .insert(name.clone(), FieldSchema::from_json(value));
            }
        }
        schema.required.extend(remote.required());
        schema
    }

    /// Check `values` against the schema. An empty result means the
    /// submission may proceed.
    pub fn validate(&self, values: &serde_json::Map<String, serde_json::Value>) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        for name in &self.required {
            let missing = match values.get(name) {
                None | Some(serde_json::Value::Null) => true,
                Some(serde_json::Value::String(s)) => s.is_empty(),
                Some(_) => false,
            };
            if missing {
                violations.push(FieldViolation::new(name, "is required"));
            }
        }

        for (name, field) in &self.properties {
            let Some(value) = values.get(name) else {
                continue;
            };
            if let Some(text) = value.as_str() {
                self.check_string(name, field, text, &mut violations);
            }
            if let Some(number) = value.as_f64() {
                if field.minimum.is_some_and(|minimum| number < minimum) {
                    violations.push(FieldViolation::new(name, "is too small"));
                }
                if field.maximum.is_some_and(|maximum| number > maximum) {
                    violations.push(FieldViolation::new(name, "is too large"));
                }
            }
        }

        violations
    }

    fn check_string(
        &self,
        name: &str,
        field: &FieldSchema,
        text: &str,
        violations: &mut Vec<FieldViolation>,
    ) {
        let length = text.chars().count() as u64;
        if field.min_length.is_some_and(|min| length < min) {
            violations.push(FieldViolation::new(name, "is too short"));
        }
        if field.max_length.is_some_and(|max| length > max) {
            violations.push(FieldViolation::new(name, "is too long"));
        }
        if field.format.as_deref() == Some("email") && !looks_like_email(text) {
            violations.push(FieldViolation::new(name, "is not a valid email address"));
        }
        if let Some(pattern) = &field.pattern {
            // An unparseable provider pattern is skipped rather than
            // blocking every submission.
            match regex::Regex::new(pattern) {
                Ok(re) if !re.is_match(text) => {
                    violations.push(FieldViolation::new(name, "does not match the expected format"));
                }
                Ok(_) => {}
                Err(e) => log::debug!("ignoring unparseable pattern for {name}: {e}"),
            }
        }
    }
}

fn looks_like_email(text: &str) -> bool {
    matches!(text.split_once('@'), Some((user, host)) if !user.is_empty() && host.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, serde_json::Value)]) -> serde_json::Map<String, serde_json::Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn absent_remote_leaves_local_unchanged() {
        let local = Schema::new()
            .field("email", FieldSchema::string().min_length(1))
            .require("email");
        assert_eq!(Schema::merge(&local, None), local);
    }

    #[test]
    fn merged_schema_enforces_local_and_remote_constraints() {
        let local = Schema::new()
            .field("email", FieldSchema::string().min_length(1))
            .require("email");
        let remote = Schema::new().field("email", FieldSchema::string().format("email"));
        let merged = Schema::merge(&local, Some(&remote));

        // Local minLength still applies.
        let empty = merged.validate(&values(&[("email", serde_json::json!(""))]));
        assert!(empty.iter().any(|v| v.message == "is required" || v.message == "is too short"));

        // Remote format applies too.
        let invalid = merged.validate(&values(&[("email", serde_json::json!("nobody"))]));
        assert!(invalid.iter().any(|v| v.message == "is not a valid email address"));

        // A value satisfying both passes.
        let valid = merged.validate(&values(&[("email", serde_json::json!("a@b.com"))]));
        assert!(valid.is_empty());
    }

    #[test]
    fn remote_only_fields_are_added_and_required_sets_union() {
        let local = Schema::new().field("email", FieldSchema::string());
        let remote = Schema::new()
            .field("phone", FieldSchema::string().pattern(r"^\+[0-9]+$"))
            .require("phone");
        let merged = Schema::merge(&local, Some(&remote));

        assert!(merged.properties.contains_key("email"));
        assert!(merged.required.contains("phone"));
        let violations = merged.validate(&values(&[("phone", serde_json::json!("12345"))]));
        assert!(violations.iter().any(|v| v.field == "phone"));
    }

    #[test]
    fn lowering_reads_json_schema_keywords() {
        let remote = RemoteSchema(serde_json::json!({
            "properties": {
                "traits": {
                    "properties": {
                        "email": {"type": "string", "format": "email", "minLength": 3}
                    },
                    "required": ["email"]
                }
            }
        }));
        let schema = Schema::from_remote(&remote);
        let email = schema.properties.get("email").expect("email field");
        assert_eq!(email.format.as_deref(), Some("email"));
        assert_eq!(email.min_length, Some(3));
        assert!(schema.required.contains("email"));
    }
}
