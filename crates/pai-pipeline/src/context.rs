//! Template interpolation for pipeline data flow.
//!
//! Step input templates and output mappings contain `{{dot.path}}`
//! expressions resolved against the pipeline's execution context:
//!
//! - `{{input.field}}` — the caller-supplied pipeline input
//! - `{{steps.proofread.output}}` — a completed step's full output
//! - `{{steps.proofread.output.corrected}}` — nested field access
//! - `{{steps.search.output.hits[0].url}}` — array index access
//!
//! A string that is *entirely* one expression resolves to the referenced
//! value's native JSON type, so a step can pipe a structured object, not
//! just a string. Embedded expressions substitute textually, serializing
//! non-string values as JSON.
//!
//! Resolution is permissive by design: a missing or non-traversable path
//! short-circuits to an absent value (null for whole-string expressions,
//! empty string when embedded) instead of failing, so forward references
//! and typos never abort a pipeline.

use serde_json::Value;

/// Resolve all `{{...}}` expressions in a template value tree.
///
/// Strings are interpolated; arrays and objects recurse; other scalars pass
/// through unchanged. Never fails.
pub fn interpolate(template: &Value, context: &Value) -> Value {
    match template {
        Value::String(s) => interpolate_string(s, context),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| interpolate(item, context)).collect())
        }
        Value::Object(map) => {
            let mut resolved = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                resolved.insert(key.clone(), interpolate(value, context));
            }
            Value::Object(resolved)
        }
        other => other.clone(),
    }
}

/// Interpolate one string, preserving the native JSON type when the whole
/// string is a single expression.
fn interpolate_string(s: &str, context: &Value) -> Value {
    let expressions = find_expressions(s);
    if expressions.is_empty() {
        return Value::String(s.to_string());
    }

    // Whole-string expression: pipe the value through with its type.
    if expressions.len() == 1 && expressions[0].full == s {
        return resolve_path(&expressions[0].path, context).unwrap_or(Value::Null);
    }

    // Mixed text and expressions: substitute textually. Missing references
    // become empty strings.
    let mut result = s.to_string();
    for expr in &expressions {
        let replacement = match resolve_path(&expr.path, context) {
            Some(value) => stringify(&value),
            None => String::new(),
        };
        result = result.replace(&expr.full, &replacement);
    }
    Value::String(result)
}

/// One `{{...}}` occurrence in a string.
struct Expression {
    /// Full match including braces.
    full: String,
    /// Trimmed inner path.
    path: String,
}

/// Scan a string for `{{...}}` expressions. An unclosed `{{` is left
/// verbatim.
fn find_expressions(s: &str) -> Vec<Expression> {
    let mut expressions = Vec::new();
    let mut rest = s;

    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open..].find("}}") else {
            break;
        };
        let end = open + close + 2;
        let inner = rest[open + 2..open + close].trim();
        if !inner.is_empty() {
            expressions.push(Expression {
                full: rest[open..end].to_string(),
                path: inner.to_string(),
            });
        }
        rest = &rest[end..];
    }

    expressions
}

/// Walk a dot-separated path (with optional `[index]` suffixes) through the
/// context. Any miss — absent key, out-of-range index, or a scalar where an
/// object is needed — yields `None`.
pub fn resolve_path(path: &str, context: &Value) -> Option<Value> {
    let mut current = context;

    for segment in path.split('.') {
        let (name, index) = split_index(segment);
        if !name.is_empty() {
            current = current.get(name)?;
        }
        if let Some(i) = index {
            current = current.get(i)?;
        }
    }

    Some(current.clone())
}

/// Split `"items[0]"` into `("items", Some(0))`; a segment without brackets
/// comes back unchanged.
fn split_index(segment: &str) -> (&str, Option<usize>) {
    if let Some(open) = segment.find('[')
        && let Some(close) = segment.find(']')
        && close > open
    {
        let index = segment[open + 1..close].parse::<usize>().ok();
        if index.is_some() {
            return (&segment[..open], index);
        }
    }
    (segment, None)
}

/// Render a resolved value for embedding into surrounding text.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_json::to_string(other).unwrap_or_else(|_| "null".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Value {
        json!({
            "input": {
                "x": 42,
                "text": "Hello world",
                "tags": ["rust", "pipelines"]
            },
            "steps": {
                "extract": {
                    "output": {
                        "topic": "quantum computing",
                        "entities": [
                            { "name": "Alice" },
                            { "name": "Acme" }
                        ]
                    }
                }
            }
        })
    }

    #[test]
    fn test_whole_string_preserves_native_type() {
        let result = interpolate(&json!("{{input.x}}"), &ctx());
        assert_eq!(result, json!(42));
    }

    #[test]
    fn test_embedded_expression_stringifies() {
        let result = interpolate(&json!("value: {{input.x}}"), &ctx());
        assert_eq!(result, json!("value: 42"));
    }

    #[test]
    fn test_whole_string_object_pipe() {
        let result = interpolate(&json!("{{steps.extract.output}}"), &ctx());
        assert_eq!(result["topic"], "quantum computing");
    }

    #[test]
    fn test_object_embedded_serializes_as_json() {
        let result = interpolate(&json!("data: {{steps.extract.output}}"), &ctx());
        let s = result.as_str().unwrap();
        assert!(s.starts_with("data: {"));
        assert!(s.contains("\"topic\""));
    }

    #[test]
    fn test_array_index_access() {
        let result = interpolate(&json!("{{steps.extract.output.entities[1].name}}"), &ctx());
        assert_eq!(result, json!("Acme"));
    }

    #[test]
    fn test_whole_array_pipe() {
        let result = interpolate(&json!("{{input.tags}}"), &ctx());
        assert_eq!(result, json!(["rust", "pipelines"]));
    }

    #[test]
    fn test_missing_path_is_null_not_error() {
        let result = interpolate(&json!("{{steps.missing.output}}"), &ctx());
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn test_missing_path_embedded_is_empty() {
        let result = interpolate(&json!("got: {{steps.missing.output}}!"), &ctx());
        assert_eq!(result, json!("got: !"));
    }

    #[test]
    fn test_traversal_through_scalar_is_null() {
        // input.x is a number; digging further short-circuits
        let result = interpolate(&json!("{{input.x.deeper}}"), &ctx());
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn test_index_out_of_range_is_null() {
        let result = interpolate(&json!("{{steps.extract.output.entities[9].name}}"), &ctx());
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn test_multiple_expressions_in_one_string() {
        let result = interpolate(
            &json!("{{steps.extract.output.entities[0].name}} works at {{steps.extract.output.entities[1].name}}"),
            &ctx(),
        );
        assert_eq!(result, json!("Alice works at Acme"));
    }

    #[test]
    fn test_recursion_through_objects_and_arrays() {
        let template = json!({
            "prompt": "Summarize: {{input.text}}",
            "count": "{{input.x}}",
            "nested": { "inner": ["{{input.text}}", "literal"] }
        });
        let result = interpolate(&template, &ctx());
        assert_eq!(result["prompt"], json!("Summarize: Hello world"));
        assert_eq!(result["count"], json!(42)); // sole expression keeps type
        assert_eq!(result["nested"]["inner"][0], json!("Hello world"));
        assert_eq!(result["nested"]["inner"][1], json!("literal"));
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(interpolate(&json!(7), &ctx()), json!(7));
        assert_eq!(interpolate(&json!(true), &ctx()), json!(true));
        assert_eq!(interpolate(&Value::Null, &ctx()), Value::Null);
    }

    #[test]
    fn test_no_expressions() {
        assert_eq!(
            interpolate(&json!("plain text"), &ctx()),
            json!("plain text")
        );
    }

    #[test]
    fn test_whitespace_inside_braces_trimmed() {
        assert_eq!(interpolate(&json!("{{ input.x }}"), &ctx()), json!(42));
    }

    #[test]
    fn test_unclosed_braces_left_verbatim() {
        assert_eq!(
            interpolate(&json!("open {{ but never closed"), &ctx()),
            json!("open {{ but never closed")
        );
    }

    #[test]
    fn test_empty_expression_ignored() {
        assert_eq!(interpolate(&json!("{{}} stays"), &ctx()), json!("{{}} stays"));
    }

    #[test]
    fn test_null_value_embeds_as_null_text() {
        let context = json!({ "input": { "gone": null }, "steps": {} });
        let result = interpolate(&json!("value: {{input.gone}}"), &context);
        assert_eq!(result, json!("value: null"));
    }

    #[test]
    fn test_boolean_embedding() {
        let context = json!({ "input": { "flag": true }, "steps": {} });
        assert_eq!(
            interpolate(&json!("enabled: {{input.flag}}"), &context),
            json!("enabled: true")
        );
    }

    #[test]
    fn test_resolve_path_direct() {
        assert_eq!(resolve_path("input.text", &ctx()), Some(json!("Hello world")));
        assert_eq!(resolve_path("steps.nope", &ctx()), None);
    }
}
