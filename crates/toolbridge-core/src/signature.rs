// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signature description types and the decoded argument object.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;
use crate::types::TypeTag;

/// Declared description of one callable parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    /// Declared type, if the callable exposes one.
    pub declared: Option<TypeTag>,
    /// Default value; a parameter with a default is optional.
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl ParameterSpec {
    /// A parameter with no declared type.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared: None,
            default: None,
            description: None,
        }
    }

    /// A parameter whose type tag is taken from the Rust type `T`.
    pub fn typed<T: SchemaType + ?Sized>(name: impl Into<String>) -> Self {
        Self {
            declared: Some(T::type_tag()),
            ..Self::untyped(name)
        }
    }

    /// A parameter whose type is only known by name (for example from a
    /// manifest written for another runtime).
    pub fn declared(name: impl Into<String>, type_name: &str) -> Self {
        Self {
            declared: Some(TypeTag::infer(type_name)),
            ..Self::untyped(name)
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The introspected shape of a callable: identifier, documentation, and
/// ordered parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub doc: Option<String>,
    pub parameters: Vec<ParameterSpec>,
}

/// Maps a Rust type to its schema primitive tag.
pub trait SchemaType {
    fn type_tag() -> TypeTag;
}

macro_rules! impl_schema_type {
    ($tag:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl SchemaType for $ty {
                fn type_tag() -> TypeTag {
                    TypeTag::$tag
                }
            }
        )+
    };
}

impl_schema_type!(String: String, str, char, std::path::PathBuf);
impl_schema_type!(Integer: i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_schema_type!(Number: f32, f64);
impl_schema_type!(Boolean: bool);
impl_schema_type!(Object: serde_json::Map<String, Value>);
impl_schema_type!(Any: Value);

impl<T: SchemaType + ?Sized> SchemaType for &T {
    fn type_tag() -> TypeTag {
        T::type_tag()
    }
}

impl<T: SchemaType + ?Sized> SchemaType for Box<T> {
    fn type_tag() -> TypeTag {
        T::type_tag()
    }
}

impl<T: SchemaType> SchemaType for Option<T> {
    fn type_tag() -> TypeTag {
        T::type_tag()
    }
}

impl<T> SchemaType for [T] {
    fn type_tag() -> TypeTag {
        TypeTag::Array
    }
}

impl<T> SchemaType for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::Array
    }
}

impl<T> SchemaType for VecDeque<T> {
    fn type_tag() -> TypeTag {
        TypeTag::Array
    }
}

impl<T, S> SchemaType for HashSet<T, S> {
    fn type_tag() -> TypeTag {
        TypeTag::Array
    }
}

impl<T> SchemaType for BTreeSet<T> {
    fn type_tag() -> TypeTag {
        TypeTag::Array
    }
}

impl<K, V, S> SchemaType for HashMap<K, V, S> {
    fn type_tag() -> TypeTag {
        TypeTag::Object
    }
}

impl<K, V> SchemaType for BTreeMap<K, V> {
    fn type_tag() -> TypeTag {
        TypeTag::Object
    }
}

/// The decoded argument object handed to a callable.
///
/// Keys are exactly the callable's parameter names; unknown keys sent by the
/// caller have already been dropped and omitted optional parameters carry
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(serde_json::Map<String, Value>);

impl Arguments {
    pub fn new(values: serde_json::Map<String, Value>) -> Self {
        Self(values)
    }

    /// Deserializes the named argument into `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, BridgeError> {
        let value = self.0.get(name).ok_or_else(|| BridgeError::MissingArgument {
            name: name.to_string(),
        })?;
        T::deserialize(value)
            .map_err(|e| BridgeError::InvalidArguments(format!("argument `{name}`: {e}")))
    }

    /// Like [`get`](Self::get), but absent and `null` both yield `None`.
    pub fn get_opt<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, BridgeError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.get(name).map(Some),
        }
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns the arguments as a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
