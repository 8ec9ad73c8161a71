// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parameter lists derived from typed argument structs via schemars.
//!
//! A struct deriving `JsonSchema` stands in for a signature: each top-level
//! property is a parameter, `required` decides optionality, and property
//! `default`s carry over. Optional properties without a default get `null`,
//! so "required iff no default" still holds.

use std::str::FromStr;

use schemars::JsonSchema;
use serde_json::Value;
use toolbridge_core::{ParameterSpec, TypeTag};

/// Generates the JSON Schema document for `T`.
pub fn schema_for<T: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(&schema).unwrap_or(Value::Null)
}

/// Derives the parameter list of an argument struct `T`.
///
/// Returns `None` when `T` does not describe an object with named
/// properties (e.g. a bare integer or a tuple), which the builder reports as
/// a schema generation failure.
pub fn parameters_for<T: JsonSchema>() -> Option<Vec<ParameterSpec>> {
    parameters_from_schema(&schema_for::<T>())
}

/// Derives a parameter list from an `object` JSON Schema document.
pub fn parameters_from_schema(schema: &Value) -> Option<Vec<ParameterSpec>> {
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return None;
    }
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = schema.get("properties") else {
        return Some(Vec::new());
    };
    let properties = properties.as_object()?;

    let parameters = properties
        .iter()
        .map(|(name, property)| {
            let is_required = required.contains(&name.as_str());
            let default = match property.get("default") {
                Some(value) => Some(value.clone()),
                None if !is_required => Some(Value::Null),
                None => None,
            };
            ParameterSpec {
                name: name.clone(),
                declared: Some(tag_of(property)),
                default,
                description: property
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }
        })
        .collect();
    Some(parameters)
}

/// Picks the primitive tag for one property schema.
fn tag_of(property: &Value) -> TypeTag {
    match property.get("type") {
        Some(Value::String(name)) => return parse_tag(name),
        Some(Value::Array(names)) => {
            if let Some(name) = names.iter().filter_map(Value::as_str).find(|n| *n != "null") {
                return parse_tag(name);
            }
        }
        _ => {}
    }
    if property.get("$ref").is_some() || property.get("properties").is_some() {
        return TypeTag::Object;
    }
    if property.get("items").is_some() {
        return TypeTag::Array;
    }
    if let Some(Value::Array(variants)) = property.get("enum")
        && variants.iter().all(Value::is_string)
    {
        return TypeTag::String;
    }
    for key in ["anyOf", "oneOf"] {
        if let Some(Value::Array(alternatives)) = property.get(key) {
            let tag = alternatives
                .iter()
                .filter(|alt| alt.get("type").and_then(Value::as_str) != Some("null"))
                .map(tag_of)
                .next();
            if let Some(tag) = tag {
                return tag;
            }
        }
    }
    TypeTag::Any
}

fn parse_tag(name: &str) -> TypeTag {
    match name {
        "null" => TypeTag::Any,
        other => TypeTag::from_str(other).unwrap_or(TypeTag::Any),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct SubArgs {
        /// Minuend.
        x: i64,
        y: i64,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Nested {
        inner: Inner,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Inner {
        a: bool,
    }

    #[test]
    fn struct_fields_become_required_parameters() {
        let params = parameters_for::<SubArgs>().unwrap();
        assert_eq!(params.len(), 2);
        let x = params.iter().find(|p| p.name == "x").unwrap();
        assert_eq!(x.declared, Some(TypeTag::Integer));
        assert_eq!(x.default, None);
        assert_eq!(x.description.as_deref(), Some("Minuend."));
    }

    #[test]
    fn nested_struct_is_an_object_parameter() {
        let params = parameters_for::<Nested>().unwrap();
        assert_eq!(params[0].declared, Some(TypeTag::Object));
    }

    #[test]
    fn non_object_types_are_not_parameter_lists() {
        assert!(parameters_for::<i64>().is_none());
    }

    #[test]
    fn optional_properties_default_to_null() {
        let schema = json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "page": {"type": ["integer", "null"]},
                "lang": {"type": "string", "default": "en"}
            },
            "required": ["query"]
        });
        let params = parameters_from_schema(&schema).unwrap();
        let by_name = |n: &str| params.iter().find(|p| p.name == n).unwrap();

        assert_eq!(by_name("query").default, None);
        assert_eq!(by_name("page").default, Some(Value::Null));
        assert_eq!(by_name("page").declared, Some(TypeTag::Integer));
        assert_eq!(by_name("lang").default, Some(json!("en")));
    }

    #[test]
    fn tag_of_handles_composite_schemas() {
        assert_eq!(tag_of(&json!({"$ref": "#/$defs/Inner"})), TypeTag::Object);
        assert_eq!(tag_of(&json!({"items": {"type": "string"}})), TypeTag::Array);
        assert_eq!(tag_of(&json!({"enum": ["a", "b"]})), TypeTag::String);
        assert_eq!(
            tag_of(&json!({"anyOf": [{"type": "null"}, {"type": "number"}]})),
            TypeTag::Number
        );
        assert_eq!(tag_of(&json!({})), TypeTag::Any);
    }
}
