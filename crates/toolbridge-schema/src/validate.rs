// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Well-formedness check for published parameter schemas.

use serde_json::Value;

/// Checks that `schema` is an `object`-typed JSON Schema the planner can use.
///
/// The document must declare `"type": "object"`, `properties` (if present)
/// must be an object, and the whole document must compile as a JSON Schema.
pub fn check_parameters_schema(schema: &Value) -> Result<(), String> {
    if !schema.is_object() {
        return Err("parameter schema must be a JSON object".into());
    }
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Err("parameter schema must declare \"type\": \"object\"".into());
    }
    if let Some(properties) = schema.get("properties")
        && !properties.is_object()
    {
        return Err("`properties` must be an object".into());
    }
    jsonschema::validator_for(schema)
        .map(|_| ())
        .map_err(|e| format!("not a valid JSON Schema: {e}"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_generated_shape() {
        let schema = json!({
            "type": "object",
            "properties": {"x": {"type": "integer"}, "blob": {}},
            "required": ["x"]
        });
        assert!(check_parameters_schema(&schema).is_ok());
    }

    #[test]
    fn rejects_non_object_types() {
        assert!(check_parameters_schema(&json!({"type": "string"})).is_err());
        assert!(check_parameters_schema(&json!("object")).is_err());
        assert!(check_parameters_schema(&json!({"properties": {}})).is_err());
    }

    #[test]
    fn rejects_malformed_properties() {
        let schema = json!({"type": "object", "properties": ["x"]});
        let err = check_parameters_schema(&schema).unwrap_err();
        assert!(err.contains("properties"));
    }

    #[test]
    fn rejects_documents_that_do_not_compile() {
        let schema = json!({
            "type": "object",
            "properties": {"x": {"type": "integer"}},
            "required": "x"
        });
        assert!(check_parameters_schema(&schema).is_err());
    }
}
