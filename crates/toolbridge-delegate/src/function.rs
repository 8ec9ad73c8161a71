// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Closure-backed callables with a declared parameter list.

use std::fmt;

use serde_json::Value;
use toolbridge_core::{Arguments, BridgeError, Callable, Concurrency, ParameterSpec, SchemaType};

type Handler = dyn Fn(&Arguments) -> Result<Value, BridgeError> + Send + Sync;

/// A tool implemented by a closure.
///
/// ```ignore
/// let add = FnTool::new("add", |args| {
///     Ok(json!(args.get::<i64>("x")? + args.get::<i64>("y")?))
/// })
/// .doc("Add two integers.")
/// .param::<i64>("x")
/// .param::<i64>("y");
/// ```
pub struct FnTool {
    name: String,
    doc: Option<String>,
    parameters: Option<Vec<ParameterSpec>>,
    schema: Option<Value>,
    concurrency: Concurrency,
    handler: Box<Handler>,
}

impl FnTool {
    /// Creates a tool with an empty parameter list.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Value, BridgeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            doc: None,
            parameters: Some(Vec::new()),
            schema: None,
            concurrency: Concurrency::Reentrant,
            handler: Box::new(handler),
        }
    }

    /// Creates a tool whose parameter list is taken from an explicit JSON
    /// Schema text. The schema is published as-is.
    pub fn from_schema<F>(
        name: impl Into<String>,
        schema_text: &str,
        handler: F,
    ) -> Result<Self, BridgeError>
    where
        F: Fn(&Arguments) -> Result<Value, BridgeError> + Send + Sync + 'static,
    {
        let name = name.into();
        let schema: Value =
            serde_json::from_str(schema_text).map_err(|e| BridgeError::SchemaGeneration {
                tool: name.clone(),
                message: format!("schema is not valid JSON: {e}"),
            })?;
        let parameters = toolbridge_schema::parameters_from_schema(&schema);
        Ok(Self {
            parameters,
            schema: Some(schema),
            ..Self::new(name, handler)
        })
    }

    /// A tool that cannot describe its parameters. Building it fails with a
    /// schema generation error.
    pub fn opaque<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Value, BridgeError> + Send + Sync + 'static,
    {
        Self {
            parameters: None,
            ..Self::new(name, handler)
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Appends a required parameter typed by `T`.
    pub fn param<T: SchemaType + ?Sized>(self, name: impl Into<String>) -> Self {
        self.parameter(ParameterSpec::typed::<T>(name))
    }

    /// Appends an optional parameter typed by `T` with a default.
    pub fn param_with_default<T: SchemaType + ?Sized>(
        self,
        name: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        self.parameter(ParameterSpec::typed::<T>(name).with_default(default))
    }

    /// Appends a required parameter with no declared type.
    pub fn param_untyped(self, name: impl Into<String>) -> Self {
        self.parameter(ParameterSpec::untyped(name))
    }

    /// Appends a required parameter whose type is known only by name.
    pub fn param_declared(self, name: impl Into<String>, type_name: &str) -> Self {
        self.parameter(ParameterSpec::declared(name, type_name))
    }

    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.get_or_insert_with(Vec::new).push(spec);
        self
    }

    /// Marks the handler single-threaded.
    pub fn serialized(mut self) -> Self {
        self.concurrency = Concurrency::Serialized;
        self
    }
}

impl fmt::Debug for FnTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .field("parameters", &self.parameters)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl Callable for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn parameters(&self) -> Option<Vec<ParameterSpec>> {
        self.parameters.clone()
    }

    fn explicit_schema(&self) -> Option<Value> {
        self.schema.clone()
    }

    fn call(&self, args: &Arguments) -> Result<Value, BridgeError> {
        (self.handler)(args)
    }

    fn concurrency(&self) -> Concurrency {
        self.concurrency
    }
}
