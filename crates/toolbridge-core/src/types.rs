// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the schema generator, the trampoline layer, and
//! the agent facade.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::BridgeError;

/// Unique identifier for one agent instance; scopes its trampoline bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub uuid::Uuid);

impl AgentId {
    /// Generates a fresh random agent id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Schema primitive tag inferred for a parameter.
///
/// `Any` is the catch-all used when no declared type is available or the
/// declared type has no primitive mapping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Any,
}

impl TypeTag {
    /// Infers a tag from a declared type name.
    ///
    /// Accepts JSON Schema names, Rust primitive names, and the common
    /// spellings host languages use (`int`, `str`, `dict`, `list`, ...).
    /// Generic wrappers such as `Vec<u8>` or `Option<String>` are resolved by
    /// their outer name. Unknown names map to [`TypeTag::Any`].
    pub fn infer(declared: &str) -> Self {
        let declared = declared.trim();
        let base = declared
            .split(['<', '['])
            .next()
            .unwrap_or(declared)
            .trim()
            .rsplit("::")
            .next()
            .unwrap_or(declared)
            .to_ascii_lowercase();

        if declared.starts_with('[') || (declared.starts_with('&') && declared.contains('[')) {
            return Self::Array;
        }

        match base.as_str() {
            "string" | "str" | "&str" | "char" | "text" | "pathbuf" | "path" => Self::String,
            "integer" | "int" | "long" | "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8"
            | "u16" | "u32" | "u64" | "u128" | "usize" => Self::Integer,
            "number" | "float" | "double" | "f32" | "f64" | "decimal" => Self::Number,
            "boolean" | "bool" => Self::Boolean,
            "object" | "dict" | "map" | "hashmap" | "btreemap" | "record" => Self::Object,
            "array" | "list" | "vec" | "vecdeque" | "tuple" | "set" | "hashset" | "btreeset" => {
                Self::Array
            }
            "option" => declared
                .find('<')
                .zip(declared.rfind('>'))
                .filter(|(start, end)| start < end)
                .map(|(start, end)| Self::infer(&declared[start + 1..end]))
                .unwrap_or(Self::Any),
            _ => Self::Any,
        }
    }

    /// Renders this tag as a JSON Schema fragment.
    ///
    /// `Any` becomes the empty schema `{}`, which accepts every value.
    pub fn to_schema(self) -> serde_json::Map<String, serde_json::Value> {
        let mut fragment = serde_json::Map::new();
        if self != Self::Any {
            fragment.insert("type".into(), serde_json::Value::String(self.to_string()));
        }
        fragment
    }
}

/// Whether a bound callable may be entered from several threads at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concurrency {
    /// Safe to re-enter concurrently (the default).
    #[default]
    Reentrant,
    /// Single-threaded; calls are serialized behind a per-binding lock.
    Serialized,
}

/// One parameter of a generated schema.
///
/// `required` is true iff the original signature declared no default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntry {
    pub name: String,
    pub type_tag: TypeTag,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Native entry points recorded for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiAddresses {
    /// Address of the trampoline: `char *(*)(const char *)`.
    pub callback_address: usize,
    /// Address of the buffer release function: `void (*)(char *)`.
    pub release_address: usize,
}

/// Immutable registration record identifying a tool to the native agent core.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    version: String,
    author: String,
    parameters: serde_json::Value,
    abi: AbiAddresses,
}

impl ToolDescriptor {
    /// Creates a descriptor after checking its structural invariants: the
    /// name is non-empty and `parameters` is a JSON object of type `object`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
        author: impl Into<String>,
        parameters: serde_json::Value,
        abi: AbiAddresses,
    ) -> Result<Self, BridgeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BridgeError::InvalidDescriptor {
                name,
                message: "tool name must not be empty".into(),
            });
        }
        match parameters.get("type").and_then(|t| t.as_str()) {
            Some("object") if parameters.is_object() => {}
            _ => {
                return Err(BridgeError::InvalidDescriptor {
                    name,
                    message: "parameters must be a JSON Schema of type `object`".into(),
                });
            }
        }
        Ok(Self {
            name,
            description: description.into(),
            version: version.into(),
            author: author.into(),
            parameters,
            abi,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// The JSON Schema describing accepted arguments.
    pub fn parameters(&self) -> &serde_json::Value {
        &self.parameters
    }

    pub fn abi(&self) -> AbiAddresses {
        self.abi
    }

    /// Builds the payload handed to the native agent core, with the schema
    /// serialized as text.
    pub fn registration_payload(&self) -> RegistrationPayload {
        RegistrationPayload {
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            parameters: self.parameters.to_string(),
            author: self.author.clone(),
            callback_address: self.abi.callback_address,
            release_address: self.abi.release_address,
        }
    }
}

/// Wire form of a [`ToolDescriptor`] passed at agent-construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    pub name: String,
    pub version: String,
    pub description: String,
    /// JSON Schema, serialized as text.
    pub parameters: String,
    pub author: String,
    pub callback_address: usize,
    pub release_address: usize,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    const ABI: AbiAddresses = AbiAddresses {
        callback_address: 0x1000,
        release_address: 0x2000,
    };

    #[test]
    fn type_tag_display_and_parse_round_trip() {
        for tag in [
            TypeTag::String,
            TypeTag::Integer,
            TypeTag::Number,
            TypeTag::Boolean,
            TypeTag::Object,
            TypeTag::Array,
            TypeTag::Any,
        ] {
            assert_eq!(TypeTag::from_str(&tag.to_string()).unwrap(), tag);
        }
        assert_eq!(TypeTag::Integer.to_string(), "integer");
    }

    #[test]
    fn infer_maps_declared_names() {
        assert_eq!(TypeTag::infer("int"), TypeTag::Integer);
        assert_eq!(TypeTag::infer("u64"), TypeTag::Integer);
        assert_eq!(TypeTag::infer("str"), TypeTag::String);
        assert_eq!(TypeTag::infer("std::string::String"), TypeTag::String);
        assert_eq!(TypeTag::infer("f64"), TypeTag::Number);
        assert_eq!(TypeTag::infer("bool"), TypeTag::Boolean);
        assert_eq!(TypeTag::infer("dict"), TypeTag::Object);
        assert_eq!(TypeTag::infer("HashMap<String, i64>"), TypeTag::Object);
        assert_eq!(TypeTag::infer("Vec<u8>"), TypeTag::Array);
        assert_eq!(TypeTag::infer("list[int]"), TypeTag::Array);
        assert_eq!(TypeTag::infer("[i32; 4]"), TypeTag::Array);
        assert_eq!(TypeTag::infer("Option<i32>"), TypeTag::Integer);
    }

    #[test]
    fn infer_falls_back_to_any() {
        assert_eq!(TypeTag::infer("DateTime<Utc>"), TypeTag::Any);
        assert_eq!(TypeTag::infer(""), TypeTag::Any);
        assert_eq!(TypeTag::infer("Option"), TypeTag::Any);
    }

    #[test]
    fn any_renders_as_empty_schema() {
        assert!(TypeTag::Any.to_schema().is_empty());
        assert_eq!(
            serde_json::Value::Object(TypeTag::Boolean.to_schema()),
            json!({"type": "boolean"})
        );
    }

    #[test]
    fn descriptor_rejects_non_object_schema() {
        let err = ToolDescriptor::new("t", "", "1.0.0", "Unknown", json!({"type": "string"}), ABI)
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidDescriptor { .. }));

        let err = ToolDescriptor::new("t", "", "1.0.0", "Unknown", json!([1, 2]), ABI).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidDescriptor { .. }));
    }

    #[test]
    fn descriptor_rejects_empty_name() {
        let err = ToolDescriptor::new(" ", "", "1.0.0", "Unknown", json!({"type": "object"}), ABI)
            .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn registration_payload_serializes_schema_as_text() {
        let schema = json!({"type": "object", "properties": {}, "required": []});
        let descriptor =
            ToolDescriptor::new("noop", "Does nothing", "1.0.0", "Unknown", schema.clone(), ABI)
                .unwrap();

        let payload = descriptor.registration_payload();
        assert_eq!(payload.name, "noop");
        assert_eq!(payload.version, "1.0.0");
        assert_eq!(payload.author, "Unknown");
        assert_eq!(payload.callback_address, 0x1000);
        assert_eq!(payload.release_address, 0x2000);

        let reparsed: serde_json::Value = serde_json::from_str(&payload.parameters).unwrap();
        assert_eq!(reparsed, schema);
    }

    #[test]
    fn agent_ids_are_unique() {
        assert_ne!(AgentId::new(), AgentId::new());
    }
}
