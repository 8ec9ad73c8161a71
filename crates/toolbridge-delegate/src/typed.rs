// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tools whose arguments are a typed struct.
//!
//! The argument struct derives `Deserialize` and `JsonSchema`; its fields
//! become the tool's parameters and its doc comments their descriptions.

use std::fmt;
use std::marker::PhantomData;

use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use toolbridge_core::{Arguments, BridgeError, Callable, Concurrency, ParameterSpec};

/// A callable taking a typed argument struct `A` and returning `R`.
pub struct TypedTool<A, R, F> {
    name: String,
    doc: Option<String>,
    concurrency: Concurrency,
    handler: F,
    _marker: PhantomData<fn(A) -> R>,
}

impl<A, R, F> TypedTool<A, R, F>
where
    A: DeserializeOwned + JsonSchema,
    R: Serialize,
    F: Fn(A) -> Result<R, BridgeError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            doc: None,
            concurrency: Concurrency::Reentrant,
            handler,
            _marker: PhantomData,
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn serialized(mut self) -> Self {
        self.concurrency = Concurrency::Serialized;
        self
    }
}

impl<A, R, F> fmt::Debug for TypedTool<A, R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedTool")
            .field("name", &self.name)
            .field("arguments", &std::any::type_name::<A>())
            .finish_non_exhaustive()
    }
}

impl<A, R, F> Callable for TypedTool<A, R, F>
where
    A: DeserializeOwned + JsonSchema,
    R: Serialize,
    F: Fn(A) -> Result<R, BridgeError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn parameters(&self) -> Option<Vec<ParameterSpec>> {
        toolbridge_schema::parameters_for::<A>()
    }

    fn call(&self, args: &Arguments) -> Result<Value, BridgeError> {
        let typed: A = serde_json::from_value(args.clone().into_value())
            .map_err(|e| BridgeError::InvalidArguments(e.to_string()))?;
        let result = (self.handler)(typed)?;
        serde_json::to_value(result)
            .map_err(|e| BridgeError::callable(format!("result could not be encoded: {e}")))
    }

    fn concurrency(&self) -> Concurrency {
        self.concurrency
    }
}
