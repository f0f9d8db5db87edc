//! Schema validator integration.
//!
//! Validates values against the two manifest schema formats: full
//! JSON-Schema documents go through a general-purpose structural validator,
//! the simplified per-field shape through a lighter presence/type check.
//! Validation never fails with an error or a panic — it always returns a
//! structured [`Validation`] so callers can format a uniform message
//! (`"Input validation failed: <joined messages>"`).

use std::collections::BTreeMap;

use pai_types::{FieldSpec, SchemaDoc};
use serde_json::Value;

/// Outcome of validating a value against a schema document.
#[derive(Debug, Clone)]
pub struct Validation {
    /// Whether the value satisfied the schema.
    pub valid: bool,
    /// Structured error messages when it did not.
    pub errors: Vec<String>,
}

impl Validation {
    /// A passing outcome.
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A failing outcome with the given messages.
    pub fn fail(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }

    /// Join error messages for envelope formatting.
    pub fn summary(&self) -> String {
        self.errors.join(", ")
    }
}

/// Validate a value against a schema document.
pub fn validate(doc: &SchemaDoc, value: &Value) -> Validation {
    match doc {
        SchemaDoc::JsonSchema(schema) => validate_json_schema(schema, value),
        SchemaDoc::Fields(fields) => validate_fields(fields, value),
    }
}

/// Structural validation for full JSON-Schema documents.
///
/// The schema is compiled per call; a schema that fails to compile reports
/// as invalid rather than erroring, keeping the never-throws contract.
fn validate_json_schema(schema: &Value, value: &Value) -> Validation {
    let validator = match jsonschema::validator_for(schema) {
        Ok(v) => v,
        Err(e) => return Validation::fail(vec![format!("invalid schema: {e}")]),
    };

    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| format!("{} {}", e.instance_path, e))
        .collect();

    if errors.is_empty() {
        Validation::ok()
    } else {
        Validation::fail(errors)
    }
}

/// Presence/type check for the simplified per-field shape.
fn validate_fields(fields: &BTreeMap<String, FieldSpec>, value: &Value) -> Validation {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => return Validation::fail(vec!["value must be a JSON object".to_string()]),
    };

    let mut errors = Vec::new();
    for (name, spec) in fields {
        match obj.get(name) {
            None | Some(Value::Null) => {
                if spec.required {
                    errors.push(format!("Missing required input: {name}"));
                }
            }
            Some(present) => {
                if let Some(expected) = spec.field_type.as_deref()
                    && !type_matches(expected, present)
                {
                    errors.push(format!("Field '{name}' expected type {expected}"));
                }
            }
        }
    }

    if errors.is_empty() {
        Validation::ok()
    } else {
        Validation::fail(errors)
    }
}

/// Check a JSON value against a declared primitive type name.
///
/// Unknown type names accept anything rather than rejecting the value.
fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_schema(raw: Value) -> SchemaDoc {
        SchemaDoc::from_value(raw).unwrap()
    }

    #[test]
    fn test_fields_required_present() {
        let doc = field_schema(json!({
            "text": { "type": "string", "required": true }
        }));
        let result = validate(&doc, &json!({"text": "hello"}));
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_fields_required_missing() {
        let doc = field_schema(json!({
            "text": { "type": "string", "required": true }
        }));
        let result = validate(&doc, &json!({}));
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Missing required input: text"]);
    }

    #[test]
    fn test_fields_null_counts_as_missing() {
        let doc = field_schema(json!({
            "text": { "type": "string", "required": true }
        }));
        let result = validate(&doc, &json!({"text": null}));
        assert!(!result.valid);
        assert!(result.summary().contains("Missing required input: text"));
    }

    #[test]
    fn test_fields_optional_missing_ok() {
        let doc = field_schema(json!({
            "limit": { "type": "number", "required": false, "default": 3 }
        }));
        assert!(validate(&doc, &json!({})).valid);
    }

    #[test]
    fn test_fields_type_mismatch() {
        let doc = field_schema(json!({
            "limit": { "type": "number" }
        }));
        let result = validate(&doc, &json!({"limit": "three"}));
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Field 'limit' expected type number"]);
    }

    #[test]
    fn test_fields_unknown_type_accepts_anything() {
        let doc = field_schema(json!({
            "blob": { "type": "binary" }
        }));
        assert!(validate(&doc, &json!({"blob": 42})).valid);
    }

    #[test]
    fn test_fields_extra_keys_allowed() {
        let doc = field_schema(json!({
            "text": { "type": "string", "required": true }
        }));
        assert!(validate(&doc, &json!({"text": "x", "extra": true})).valid);
    }

    #[test]
    fn test_fields_non_object_value() {
        let doc = field_schema(json!({
            "text": { "type": "string" }
        }));
        let result = validate(&doc, &json!("just a string"));
        assert!(!result.valid);
    }

    #[test]
    fn test_fields_multiple_errors_joined() {
        let doc = field_schema(json!({
            "a": { "type": "string", "required": true },
            "b": { "type": "number", "required": true }
        }));
        let result = validate(&doc, &json!({}));
        assert_eq!(result.errors.len(), 2);
        assert!(result.summary().contains("a"));
        assert!(result.summary().contains("b"));
    }

    #[test]
    fn test_json_schema_valid() {
        let doc = field_schema(json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"]
        }));
        assert!(matches!(doc, SchemaDoc::JsonSchema(_)));
        assert!(validate(&doc, &json!({"text": "hello"})).valid);
    }

    #[test]
    fn test_json_schema_missing_required() {
        let doc = field_schema(json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"]
        }));
        let result = validate(&doc, &json!({}));
        assert!(!result.valid);
        assert!(!result.errors.is_empty());
    }

    #[test]
    fn test_json_schema_wrong_type() {
        let doc = field_schema(json!({
            "type": "object",
            "properties": { "count": { "type": "integer" } }
        }));
        let result = validate(&doc, &json!({"count": "ten"}));
        assert!(!result.valid);
        assert!(result.summary().contains("count"));
    }

    #[test]
    fn test_json_schema_invalid_schema_reports_not_panics() {
        // A schema the structural validator cannot compile still produces a
        // structured failure.
        let doc = SchemaDoc::JsonSchema(json!({"type": "object", "properties": 42}));
        let result = validate(&doc, &json!({}));
        assert!(!result.valid);
        assert!(result.summary().contains("schema"));
    }
}
