// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tools the command-line front end registers on every agent.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use toolbridge_core::{BridgeError, Callable};
use toolbridge_delegate::{FnTool, TypedTool};

/// Arguments of `word_count`.
#[derive(Debug, Deserialize, JsonSchema)]
struct WordCountArgs {
    /// Text to measure.
    text: String,
}

#[derive(Debug, Serialize)]
struct WordCount {
    words: usize,
    chars: usize,
}

fn echo() -> FnTool {
    FnTool::new("echo", |args| Ok(Value::String(args.get::<String>("text")?)))
        .doc("Return the given text unchanged.")
        .param::<String>("text")
}

fn add() -> FnTool {
    FnTool::new("add", |args| {
        let (x, y) = (args.get::<i64>("x")?, args.get::<i64>("y")?);
        x.checked_add(y)
            .map(|sum| json!(sum))
            .ok_or_else(|| BridgeError::callable(format!("{x} + {y} overflows a 64-bit integer")))
    })
    .doc("Add two integers.")
    .param::<i64>("x")
    .param::<i64>("y")
}

fn fail() -> FnTool {
    FnTool::new("fail", |args| {
        Err(BridgeError::callable(args.get::<String>("message")?))
    })
    .doc("Always fail with the given message.")
    .param_with_default::<String>("message", json!("requested failure"))
}

fn word_count() -> impl Callable {
    TypedTool::new("word_count", |args: WordCountArgs| {
        Ok(WordCount {
            words: args.text.split_whitespace().count(),
            chars: args.text.chars().count(),
        })
    })
    .doc("Count the words and characters in a text.")
}

/// Every built-in tool, in registration order.
pub fn builtin_tools() -> Vec<Arc<dyn Callable>> {
    vec![
        Arc::new(echo()),
        Arc::new(add()),
        Arc::new(word_count()),
        Arc::new(fail()),
    ]
}
