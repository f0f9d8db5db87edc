//! Action manifest parsing and validation.
//!
//! An action package is a directory containing an `action.json` manifest and
//! a registered implementation. The manifest declares the action's contract
//! (input/output schemas), the capabilities it requires, and descriptive
//! metadata. Manifests are immutable once loaded and are identified by their
//! resolved filesystem location — two manifests may share a name across
//! resolution roots, and the root search order disambiguates.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::CapabilityName;

/// Manifest file name inside an action package directory.
pub const MANIFEST_FILE: &str = "action.json";

/// Manifest error type.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Failed to parse a manifest document.
    #[error("failed to parse action manifest: {reason}")]
    Parse { reason: String },

    /// A manifest field failed validation.
    #[error("validation error in {field}: {message}")]
    Validation { field: String, message: String },

    /// IO error reading a manifest file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The `action.json` manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionManifest {
    /// Unique name: flat (`A_EXTRACT_TOPIC`) or legacy (`category/name`).
    pub name: String,

    /// Semantic version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Input schema document.
    #[serde(default)]
    pub input: Option<SchemaDoc>,

    /// Output schema document. Absent means output validation is skipped.
    #[serde(default)]
    pub output: Option<SchemaDoc>,

    /// Capabilities this action requires.
    #[serde(default)]
    pub requires: Vec<CapabilityName>,

    /// Tags for categorization.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Author information.
    #[serde(default)]
    pub author: Option<ActionAuthor>,

    /// SPDX license identifier.
    #[serde(default)]
    pub license: Option<String>,

    /// Deployment hints for an external scheduler. Advisory only; nothing
    /// here is enforced in-process.
    #[serde(default)]
    pub deployment: Option<DeploymentConfig>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl ActionManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, ManifestError> {
        let manifest: Self = serde_json::from_str(json_str).map_err(|e| ManifestError::Parse {
            reason: e.to_string(),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest from an `action.json` file on disk.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// A bare manifest for implementations registered without a package
    /// (the legacy, pre-manifest form). No contract, no capabilities.
    pub fn implicit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "0.0.0".to_string(),
            description: String::new(),
            input: None,
            output: None,
            requires: Vec::new(),
            tags: Vec::new(),
            author: None,
            license: None,
            deployment: None,
        }
    }

    /// Validate required fields.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.is_empty() {
            return Err(ManifestError::Validation {
                field: "name".to_string(),
                message: "name cannot be empty".to_string(),
            });
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(ManifestError::Validation {
                field: "name".to_string(),
                message: "name cannot contain whitespace".to_string(),
            });
        }
        if self.version.is_empty() {
            return Err(ManifestError::Validation {
                field: "version".to_string(),
                message: "version cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Author information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionAuthor {
    /// Author name.
    pub name: String,
    /// Author URL (optional).
    #[serde(default)]
    pub url: Option<String>,
}

/// Deployment hints carried in a manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Timeout in milliseconds.
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Memory limit in MB for worker sizing.
    #[serde(default)]
    pub memory: Option<u64>,

    /// Secret names required at deployment time.
    #[serde(default)]
    pub secrets: Vec<String>,

    /// CPU-intensive hint for worker placement.
    #[serde(default)]
    pub cpu_intensive: Option<bool>,
}

/// A schema document in one of the two supported formats.
///
/// Manifests predate a format change: older ones carry full JSON-Schema
/// objects, newer ones a simplified per-field shape
/// `{ field: { type, required, default } }`. The format is detected once
/// here, at load time — a string-valued `"type"` key selects the JSON-Schema
/// strategy — and never re-detected per validation call.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SchemaDoc {
    /// A full JSON-Schema-style object.
    JsonSchema(Value),
    /// The simplified per-field shape.
    Fields(BTreeMap<String, FieldSpec>),
}

impl SchemaDoc {
    /// Detect the schema format from a raw JSON value.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let map = match &value {
            Value::Object(map) => map,
            _ => return Err("schema must be a JSON object".to_string()),
        };

        if map.get("type").map(Value::is_string).unwrap_or(false) {
            return Ok(SchemaDoc::JsonSchema(value));
        }

        let fields: BTreeMap<String, FieldSpec> = serde_json::from_value(value)
            .map_err(|e| format!("invalid per-field schema: {e}"))?;
        Ok(SchemaDoc::Fields(fields))
    }
}

impl<'de> Deserialize<'de> for SchemaDoc {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        SchemaDoc::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// One field declaration in the simplified per-field schema shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Expected primitive type (`string`, `number`, `boolean`, `object`,
    /// `array`). Absent means any type is accepted.
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,

    /// Whether the field must be present and non-null.
    #[serde(default)]
    pub required: bool,

    /// Declared default value. Carried as metadata; the validator does not
    /// apply it.
    #[serde(default)]
    pub default: Option<Value>,

    /// Field description.
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_manifest_json() -> &'static str {
        r#"{
  "name": "A_EXTRACT_TOPIC",
  "version": "1.2.0",
  "description": "Extract the main topic from a piece of text",
  "input": {
    "text": { "type": "string", "required": true },
    "limit": { "type": "number", "required": false, "default": 3 }
  },
  "output": {
    "topic": { "type": "string", "required": true }
  },
  "requires": ["llm"],
  "tags": ["parse", "nlp"],
  "author": { "name": "Test Author", "url": "https://example.com" },
  "license": "MIT",
  "deployment": { "timeout": 30000, "memory": 128, "secrets": ["API_KEY"] }
}"#
    }

    #[test]
    fn test_parse_full_manifest() {
        let manifest = ActionManifest::from_json(sample_manifest_json()).unwrap();

        assert_eq!(manifest.name, "A_EXTRACT_TOPIC");
        assert_eq!(manifest.version, "1.2.0");
        assert_eq!(manifest.requires, vec![CapabilityName::Llm]);
        assert_eq!(manifest.tags, vec!["parse", "nlp"]);
        assert_eq!(manifest.author.as_ref().unwrap().name, "Test Author");
        assert_eq!(manifest.license.as_deref(), Some("MIT"));

        let deployment = manifest.deployment.as_ref().unwrap();
        assert_eq!(deployment.timeout, Some(30000));
        assert_eq!(deployment.secrets, vec!["API_KEY"]);
    }

    #[test]
    fn test_minimal_manifest() {
        let manifest = ActionManifest::from_json(r#"{ "name": "parse/topic" }"#).unwrap();
        assert_eq!(manifest.name, "parse/topic");
        assert_eq!(manifest.version, "1.0.0"); // default
        assert!(manifest.input.is_none());
        assert!(manifest.output.is_none());
        assert!(manifest.requires.is_empty());
    }

    #[test]
    fn test_empty_name_fails_validation() {
        let err = ActionManifest::from_json(r#"{ "name": "" }"#).unwrap_err();
        assert!(matches!(err, ManifestError::Validation { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_whitespace_name_fails_validation() {
        let err = ActionManifest::from_json(r#"{ "name": "my action" }"#).unwrap_err();
        assert!(matches!(err, ManifestError::Validation { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_invalid_json() {
        let err = ActionManifest::from_json("not json {{{").unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_unknown_capability_is_parse_error() {
        let err = ActionManifest::from_json(r#"{ "name": "x", "requires": ["teleport"] }"#)
            .unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_schema_detects_per_field_shape() {
        let manifest = ActionManifest::from_json(sample_manifest_json()).unwrap();
        match manifest.input.as_ref().unwrap() {
            SchemaDoc::Fields(fields) => {
                assert!(fields["text"].required);
                assert_eq!(fields["text"].field_type.as_deref(), Some("string"));
                assert_eq!(fields["limit"].default, Some(json!(3)));
            }
            SchemaDoc::JsonSchema(_) => panic!("expected per-field schema"),
        }
    }

    #[test]
    fn test_schema_detects_json_schema_shape() {
        let json_str = r#"{
            "name": "parse/topic",
            "input": {
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            }
        }"#;
        let manifest = ActionManifest::from_json(json_str).unwrap();
        match manifest.input.as_ref().unwrap() {
            SchemaDoc::JsonSchema(schema) => {
                assert_eq!(schema["type"], "object");
            }
            SchemaDoc::Fields(_) => panic!("expected JSON Schema"),
        }
    }

    #[test]
    fn test_field_named_type_stays_per_field() {
        // A per-field schema whose field is literally named "type": the
        // value under "type" is an object, not a string, so the per-field
        // strategy is selected.
        let doc = SchemaDoc::from_value(json!({
            "type": { "type": "string", "required": true }
        }))
        .unwrap();
        assert!(matches!(doc, SchemaDoc::Fields(_)));
    }

    #[test]
    fn test_non_object_schema_rejected() {
        assert!(SchemaDoc::from_value(json!("string")).is_err());
        assert!(SchemaDoc::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_implicit_manifest() {
        let manifest = ActionManifest::implicit("legacy/summarize");
        assert_eq!(manifest.name, "legacy/summarize");
        assert_eq!(manifest.version, "0.0.0");
        assert!(manifest.input.is_none());
        assert!(manifest.requires.is_empty());
    }

    #[test]
    fn test_roundtrip_serialize() {
        let manifest = ActionManifest::from_json(sample_manifest_json()).unwrap();
        let serialized = serde_json::to_string(&manifest).unwrap();
        let reparsed = ActionManifest::from_json(&serialized).unwrap();
        assert_eq!(reparsed.name, manifest.name);
        assert!(matches!(reparsed.input, Some(SchemaDoc::Fields(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, sample_manifest_json()).unwrap();

        let manifest = ActionManifest::from_file(&path).unwrap();
        assert_eq!(manifest.name, "A_EXTRACT_TOPIC");
    }
}
