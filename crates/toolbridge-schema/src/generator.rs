// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema generation from a callable's signature.
//!
//! Generation is total over introspectable callables: a parameter without a
//! declared type becomes an `any` entry instead of an error. Only a callable
//! that cannot describe its parameter list at all is rejected.

use serde::Serialize;
use serde_json::{Map, Value, json};
use toolbridge_core::{BridgeError, Callable, ParameterEntry, Signature, TypeTag};

/// The generated description of one callable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSchema {
    pub name: String,
    /// Trimmed documentation text, or empty.
    pub description: String,
    /// JSON Schema document of type `object`.
    pub parameters: Value,
    /// Per-parameter entries the schema was rendered from.
    #[serde(skip)]
    pub entries: Vec<ParameterEntry>,
}

/// Introspects a callable, failing only when its parameter list is opaque.
pub fn signature_of(callable: &dyn Callable) -> Result<Signature, BridgeError> {
    let name = callable.name().to_string();
    let parameters = callable
        .parameters()
        .ok_or_else(|| BridgeError::SchemaGeneration {
            tool: name.clone(),
            message: "callable does not expose a parameter list".into(),
        })?;
    Ok(Signature {
        name,
        doc: callable.doc().map(str::to_string),
        parameters,
    })
}

/// Derives one entry per declared parameter, in declaration order.
pub fn parameter_entries(signature: &Signature) -> Vec<ParameterEntry> {
    signature
        .parameters
        .iter()
        .map(|p| ParameterEntry {
            name: p.name.clone(),
            type_tag: p.declared.unwrap_or(TypeTag::Any),
            required: p.default.is_none(),
            default: p.default.clone(),
            description: p.description.clone(),
        })
        .collect()
}

/// Renders entries as a JSON Schema `object` document.
///
/// Properties carry the type tag plus, when present, `description` and
/// `default`; `required` lists parameters without a default in declaration
/// order. A `null` default only marks a parameter optional and is not
/// rendered.
pub fn parameters_schema(entries: &[ParameterEntry]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for entry in entries {
        let mut property = entry.type_tag.to_schema();
        if let Some(description) = &entry.description {
            property.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(default) = entry.default.as_ref().filter(|d| !d.is_null()) {
            property.insert("default".into(), default.clone());
        }
        properties.insert(entry.name.clone(), Value::Object(property));
        if entry.required {
            required.push(Value::String(entry.name.clone()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Documentation normalised to a description: trimmed, empty when absent.
pub fn description_of(signature: &Signature) -> String {
    signature
        .doc
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Generates the full function schema for a callable.
///
/// A callable that publishes an explicit schema keeps it; the entries are
/// still derived from its parameter list so argument mapping stays exact.
pub fn generate(callable: &dyn Callable) -> Result<FunctionSchema, BridgeError> {
    let signature = signature_of(callable)?;
    let entries = parameter_entries(&signature);
    let parameters = match callable.explicit_schema() {
        Some(schema) => {
            crate::validate::check_parameters_schema(&schema).map_err(|message| {
                BridgeError::SchemaGeneration {
                    tool: signature.name.clone(),
                    message,
                }
            })?;
            schema
        }
        None => parameters_schema(&entries),
    };

    tracing::debug!(
        tool = signature.name.as_str(),
        parameters = entries.len(),
        "generated parameter schema"
    );

    Ok(FunctionSchema {
        description: description_of(&signature),
        name: signature.name,
        parameters,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use toolbridge_core::{Arguments, ParameterSpec};

    use super::*;

    /// Minimal callable used to drive the generator.
    struct Described {
        name: &'static str,
        doc: Option<&'static str>,
        params: Option<Vec<ParameterSpec>>,
        explicit: Option<Value>,
    }

    impl Described {
        fn new(name: &'static str, params: Vec<ParameterSpec>) -> Self {
            Self {
                name,
                doc: None,
                params: Some(params),
                explicit: None,
            }
        }
    }

    impl Callable for Described {
        fn name(&self) -> &str {
            self.name
        }

        fn doc(&self) -> Option<&str> {
            self.doc
        }

        fn parameters(&self) -> Option<Vec<ParameterSpec>> {
            self.params.clone()
        }

        fn explicit_schema(&self) -> Option<Value> {
            self.explicit.clone()
        }

        fn call(&self, _args: &Arguments) -> Result<Value, BridgeError> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn add_schema_matches_exactly() {
        let add = Described::new(
            "add",
            vec![ParameterSpec::typed::<i64>("x"), ParameterSpec::typed::<i64>("y")],
        );
        let schema = generate(&add).unwrap();
        assert_eq!(schema.name, "add");
        assert_eq!(
            schema.parameters,
            json!({
                "type": "object",
                "properties": {"x": {"type": "integer"}, "y": {"type": "integer"}},
                "required": ["x", "y"]
            })
        );
    }

    #[test]
    fn zero_parameters_yield_empty_object_schema() {
        let now = Described::new("now", vec![]);
        let schema = generate(&now).unwrap();
        assert_eq!(
            schema.parameters,
            json!({"type": "object", "properties": {}, "required": []})
        );
        assert!(schema.entries.is_empty());
    }

    #[test]
    fn untyped_parameter_becomes_any() {
        let f = Described::new("store", vec![ParameterSpec::untyped("payload")]);
        let schema = generate(&f).unwrap();
        assert_eq!(schema.entries[0].type_tag, TypeTag::Any);
        assert_eq!(schema.parameters["properties"]["payload"], json!({}));
        assert_eq!(schema.parameters["required"], json!(["payload"]));
    }

    #[test]
    fn defaults_make_parameters_optional_and_are_published() {
        let f = Described::new(
            "search",
            vec![
                ParameterSpec::typed::<String>("query").with_description("Search terms"),
                ParameterSpec::typed::<u32>("limit").with_default(10),
            ],
        );
        let schema = generate(&f).unwrap();
        assert_eq!(schema.parameters["required"], json!(["query"]));
        assert_eq!(
            schema.parameters["properties"]["limit"],
            json!({"type": "integer", "default": 10})
        );
        assert_eq!(
            schema.parameters["properties"]["query"]["description"],
            "Search terms"
        );
        assert!(!schema.entries[1].required);
    }

    #[allow(dead_code)]
    #[derive(serde::Deserialize, schemars::JsonSchema)]
    struct PageArgs {
        query: String,
        page: Option<u32>,
    }

    #[test]
    fn optional_struct_fields_publish_no_default() {
        let params = crate::derive::parameters_for::<PageArgs>().unwrap();
        let f = Described::new("page", params);
        let schema = generate(&f).unwrap();

        assert_eq!(schema.parameters["required"], json!(["query"]));
        let page = schema.parameters["properties"]["page"].as_object().unwrap();
        assert_eq!(page.get("type"), Some(&json!("integer")));
        assert!(!page.contains_key("default"));
        let entry = schema.entries.iter().find(|e| e.name == "page").unwrap();
        assert!(!entry.required);
    }

    #[test]
    fn description_is_trimmed_doc_or_empty() {
        let mut f = Described::new("f", vec![]);
        f.doc = Some("\n   Multiply two numbers.\n   Returns the product.  \n");
        assert_eq!(
            generate(&f).unwrap().description,
            "Multiply two numbers.\n   Returns the product."
        );

        f.doc = None;
        assert_eq!(generate(&f).unwrap().description, "");
    }

    #[test]
    fn opaque_callable_is_rejected() {
        let mut f = Described::new("native_blob", vec![]);
        f.params = None;
        let err = generate(&f).unwrap_err();
        match err {
            BridgeError::SchemaGeneration { tool, .. } => assert_eq!(tool, "native_blob"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn explicit_schema_is_kept_when_valid() {
        let mut f = Described::new("sub", vec![ParameterSpec::typed::<i64>("x")]);
        let explicit = json!({
            "type": "object",
            "properties": {"x": {"type": "integer", "minimum": 0}},
            "required": ["x"]
        });
        f.explicit = Some(explicit.clone());
        assert_eq!(generate(&f).unwrap().parameters, explicit);

        f.explicit = Some(json!({"type": "array"}));
        assert!(matches!(
            generate(&f).unwrap_err(),
            BridgeError::SchemaGeneration { .. }
        ));
    }

    proptest! {
        #[test]
        fn required_and_property_counts(required in 0usize..8, optional in 0usize..8) {
            let mut params = Vec::new();
            for i in 0..required {
                params.push(ParameterSpec::typed::<i64>(format!("r{i}")));
            }
            for i in 0..optional {
                params.push(ParameterSpec::typed::<String>(format!("o{i}")).with_default("x"));
            }
            let signature = Signature { name: "f".into(), doc: None, parameters: params };
            let schema = parameters_schema(&parameter_entries(&signature));

            prop_assert_eq!(schema["required"].as_array().unwrap().len(), required);
            prop_assert_eq!(
                schema["properties"].as_object().unwrap().len(),
                required + optional
            );
        }
    }
}
