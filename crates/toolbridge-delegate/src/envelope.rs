// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invocation envelope codec.
//!
//! Inbound: UTF-8 bytes holding a JSON object of argument name to value.
//! Outbound: the callable's JSON result, or `{"error": "<message>"}`.

use serde_json::{Map, Value, json};
use toolbridge_core::{Arguments, BridgeError, ParameterEntry};

/// Outcome of one call, ready to cross the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success(Value),
    Error(String),
}

impl Envelope {
    /// Converts a call result; every error becomes an error envelope
    /// carrying the error's `Display` text.
    pub fn from_result(result: Result<Value, BridgeError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Error(err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Success(value) => value.clone(),
            Self::Error(message) => json!({ "error": message }),
        }
    }

    /// Serializes the envelope as compact JSON text.
    pub fn to_json_text(&self) -> String {
        self.to_value().to_string()
    }
}

/// Decodes an input buffer into an argument object.
pub fn decode_arguments(input: &[u8]) -> Result<Map<String, Value>, BridgeError> {
    let text = std::str::from_utf8(input)
        .map_err(|e| BridgeError::InvalidArguments(format!("input is not valid UTF-8: {e}")))?;
    let value: Value =
        serde_json::from_str(text).map_err(|e| BridgeError::InvalidArguments(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(BridgeError::InvalidArguments(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Maps decoded keys onto parameters by exact name.
///
/// Required parameters must be present. Omitted optional parameters receive
/// their default unless that default is `null`, in which case they stay
/// absent. Keys that name no parameter are dropped.
pub fn bind_arguments(
    entries: &[ParameterEntry],
    mut input: Map<String, Value>,
) -> Result<Arguments, BridgeError> {
    let mut bound = Map::new();
    for entry in entries {
        match input.remove(&entry.name) {
            Some(value) => {
                bound.insert(entry.name.clone(), value);
            }
            None if entry.required => {
                return Err(BridgeError::MissingArgument {
                    name: entry.name.clone(),
                });
            }
            None => {
                if let Some(default) = entry.default.as_ref().filter(|d| !d.is_null()) {
                    bound.insert(entry.name.clone(), default.clone());
                }
            }
        }
    }
    Ok(Arguments::new(bound))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
