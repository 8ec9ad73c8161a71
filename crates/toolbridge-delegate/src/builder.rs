// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Delegate Tool Builder: callable in, descriptor plus binding out.

use std::sync::Arc;

use serde_json::Value;
use toolbridge_core::{
    AgentId, BridgeError, Callable, Concurrency, ParameterEntry, ToolDescriptor,
};
use toolbridge_schema::generate;
use tracing::{debug, info};

use crate::binding::TrampolineBinding;

/// Placeholder version assigned when a tool carries no version of its own.
/// It is not derived from any metadata.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Placeholder author assigned when a tool carries no author of its own.
/// It is not derived from any metadata.
pub const DEFAULT_AUTHOR: &str = "Unknown";

/// Builder-wide defaults, normally filled from the `[tools]` config section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefaults {
    pub version: String,
    pub author: String,
    /// Serialize calls to every built callable, regardless of what the
    /// callable reports.
    pub serialize_calls: bool,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            serialize_calls: false,
        }
    }
}

/// Per-tool overrides of the builder defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolMetadata {
    pub version: Option<String>,
    pub author: Option<String>,
}

impl ToolMetadata {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// A registered tool: its descriptor and, when the host owns the
/// implementation, the binding that keeps its callback address alive.
#[derive(Debug)]
pub struct DelegateTool {
    descriptor: ToolDescriptor,
    binding: Option<TrampolineBinding>,
}

impl DelegateTool {
    /// Wraps a descriptor whose callback address is owned elsewhere (for
    /// example a tool implemented natively). Passed through unchanged.
    pub fn external(descriptor: ToolDescriptor) -> Self {
        Self {
            descriptor,
            binding: None,
        }
    }

    /// Pairs a descriptor with the binding it was built from.
    pub fn from_parts(descriptor: ToolDescriptor, binding: TrampolineBinding) -> Self {
        Self {
            descriptor,
            binding: Some(binding),
        }
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    pub fn binding(&self) -> Option<&TrampolineBinding> {
        self.binding.as_ref()
    }

    pub fn into_parts(self) -> (ToolDescriptor, Option<TrampolineBinding>) {
        (self.descriptor, self.binding)
    }
}

/// Builds descriptors and trampoline bindings for one agent.
#[derive(Debug, Clone)]
pub struct DelegateToolBuilder {
    agent: AgentId,
    defaults: ToolDefaults,
}

impl DelegateToolBuilder {
    pub fn new(agent: AgentId, defaults: ToolDefaults) -> Self {
        Self { agent, defaults }
    }

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn defaults(&self) -> &ToolDefaults {
        &self.defaults
    }

    /// Builds a tool with the default version and author.
    pub fn build(
        &self,
        callable: Arc<dyn Callable>,
    ) -> Result<(ToolDescriptor, TrampolineBinding), BridgeError> {
        self.build_with(callable, ToolMetadata::default())
    }

    /// Builds a tool, applying per-tool metadata overrides.
    ///
    /// Fails with [`BridgeError::SchemaGeneration`] when the callable's
    /// signature is opaque. Schema generation happens before a trampoline
    /// slot is claimed, so a failed build never allocates a binding.
    pub fn build_with(
        &self,
        callable: Arc<dyn Callable>,
        metadata: ToolMetadata,
    ) -> Result<(ToolDescriptor, TrampolineBinding), BridgeError> {
        let schema = generate(callable.as_ref())?;
        let concurrency = if self.defaults.serialize_calls {
            Concurrency::Serialized
        } else {
            callable.concurrency()
        };

        let binding = TrampolineBinding::install(
            self.agent,
            schema.name.clone(),
            schema.entries,
            callable,
            concurrency,
        )?;
        let descriptor = ToolDescriptor::new(
            schema.name,
            schema.description,
            metadata.version.unwrap_or_else(|| self.defaults.version.clone()),
            metadata.author.unwrap_or_else(|| self.defaults.author.clone()),
            schema.parameters,
            binding.abi(),
        )?;

        info!(
            tool = descriptor.name(),
            agent = %self.agent,
            version = descriptor.version(),
            ?concurrency,
            "built delegate tool"
        );
        Ok((descriptor, binding))
    }

    /// Builds a [`DelegateTool`] from an explicit schema.
    ///
    /// `schema_text` must be a JSON Schema `object` document. Its
    /// `properties` and `required` decide how arguments are bound, so the
    /// callable's own parameter list is not consulted.
    pub fn build_explicit(
        &self,
        description: impl Into<String>,
        schema_text: &str,
        callable: Arc<dyn Callable>,
        metadata: ToolMetadata,
    ) -> Result<DelegateTool, BridgeError> {
        let name = callable.name().to_string();
        let parameters: Value =
            serde_json::from_str(schema_text).map_err(|e| BridgeError::SchemaGeneration {
                tool: name.clone(),
                message: format!("schema is not valid JSON: {e}"),
            })?;
        toolbridge_schema::check_parameters_schema(&parameters).map_err(|message| {
            BridgeError::SchemaGeneration {
                tool: name.clone(),
                message,
            }
        })?;
        let entries = entries_from_schema(&parameters);
        let concurrency = if self.defaults.serialize_calls {
            Concurrency::Serialized
        } else {
            callable.concurrency()
        };

        let binding =
            TrampolineBinding::install(self.agent, name.clone(), entries, callable, concurrency)?;
        let descriptor = ToolDescriptor::new(
            name,
            description,
            metadata.version.unwrap_or_else(|| self.defaults.version.clone()),
            metadata.author.unwrap_or_else(|| self.defaults.author.clone()),
            parameters,
            binding.abi(),
        )?;
        debug!(tool = descriptor.name(), agent = %self.agent, "built tool from explicit schema");
        Ok(DelegateTool::from_parts(descriptor, binding))
    }
}

fn entries_from_schema(schema: &Value) -> Vec<ParameterEntry> {
    let Some(parameters) = toolbridge_schema::parameters_from_schema(schema) else {
        return Vec::new();
    };
    parameters
        .into_iter()
        .map(|p| ParameterEntry {
            required: p.default.is_none(),
            type_tag: p.declared.unwrap_or(toolbridge_core::TypeTag::Any),
            name: p.name,
            default: p.default,
            description: p.description,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use toolbridge_core::{Arguments, ParameterSpec};

    use super::*;
    use crate::trampoline::{call_abi, registered_bindings};

    struct Add;

    impl Callable for Add {
        fn name(&self) -> &str {
            "add"
        }

        fn doc(&self) -> Option<&str> {
            Some("  Add two integers.  ")
        }

        fn parameters(&self) -> Option<Vec<ParameterSpec>> {
            Some(vec![
                ParameterSpec::typed::<i64>("x"),
                ParameterSpec::typed::<i64>("y"),
            ])
        }

        fn call(&self, args: &Arguments) -> Result<Value, BridgeError> {
            Ok(json!(args.get::<i64>("x")? + args.get::<i64>("y")?))
        }
    }

    struct Opaque;

    impl Callable for Opaque {
        fn name(&self) -> &str {
            "opaque"
        }

        fn parameters(&self) -> Option<Vec<ParameterSpec>> {
            None
        }

        fn call(&self, _args: &Arguments) -> Result<Value, BridgeError> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn build_fills_placeholders_and_records_the_address() {
        let builder = DelegateToolBuilder::new(AgentId::new(), ToolDefaults::default());
        let (descriptor, binding) = builder.build(Arc::new(Add)).unwrap();

        assert_eq!(descriptor.name(), "add");
        assert_eq!(descriptor.description(), "Add two integers.");
        assert_eq!(descriptor.version(), "1.0.0");
        assert_eq!(descriptor.author(), "Unknown");
        assert_eq!(descriptor.abi().callback_address, binding.callback_address());

        let payload = descriptor.registration_payload();
        assert_eq!(payload.callback_address, binding.callback_address());
        assert_eq!(
            serde_json::from_str::<Value>(&payload.parameters).unwrap(),
            json!({
                "type": "object",
                "properties": {"x": {"type": "integer"}, "y": {"type": "integer"}},
                "required": ["x", "y"]
            })
        );

        // SAFETY: the binding is alive.
        let out = unsafe { call_abi(descriptor.abi(), r#"{"x":2,"y":3}"#) }.unwrap();
        assert_eq!(out, "5");
    }

    #[test]
    fn overrides_win_over_defaults() {
        let defaults = ToolDefaults {
            version: "2.0.0".into(),
            author: "Ops".into(),
            serialize_calls: false,
        };
        let builder = DelegateToolBuilder::new(AgentId::new(), defaults);
        let (descriptor, _binding) = builder
            .build_with(Arc::new(Add), ToolMetadata::default().version("3.1.4"))
            .unwrap();
        assert_eq!(descriptor.version(), "3.1.4");
        assert_eq!(descriptor.author(), "Ops");
    }

    #[test]
    fn opaque_callables_fail_without_claiming_a_slot() {
        let agent = AgentId::new();
        let builder = DelegateToolBuilder::new(agent, ToolDefaults::default());
        let err = builder.build(Arc::new(Opaque)).unwrap_err();
        assert!(matches!(err, BridgeError::SchemaGeneration { .. }));
        assert!(!registered_bindings().iter().any(|(a, _)| *a == agent));
    }

    #[test]
    fn explicit_schema_drives_binding() {
        let builder = DelegateToolBuilder::new(AgentId::new(), ToolDefaults::default());
        let tool = builder
            .build_explicit(
                "Add with an optional y.",
                r#"{"type":"object","properties":{"x":{"type":"integer"},"y":{"type":"integer","default":1}},"required":["x"]}"#,
                Arc::new(Add),
                ToolMetadata::default().author("Math Team"),
            )
            .unwrap();
        assert_eq!(tool.descriptor().author(), "Math Team");
        assert_eq!(tool.descriptor().description(), "Add with an optional y.");
        let binding = tool.binding().unwrap();
        assert_eq!(binding.invoke(r#"{"x": 41}"#), "42");
    }

    #[test]
    fn explicit_schema_must_be_an_object_schema() {
        let builder = DelegateToolBuilder::new(AgentId::new(), ToolDefaults::default());
        let err = builder
            .build_explicit("", r#"{"type":"string"}"#, Arc::new(Add), ToolMetadata::default())
            .unwrap_err();
        assert!(matches!(err, BridgeError::SchemaGeneration { .. }));

        let err = builder
            .build_explicit("", "{not json", Arc::new(Add), ToolMetadata::default())
            .unwrap_err();
        assert!(err.to_string().contains("schema is not valid JSON"));
    }

    #[test]
    fn external_tools_carry_no_binding() {
        let descriptor = ToolDescriptor::new(
            "native_search",
            "",
            "1.0.0",
            "Unknown",
            json!({"type": "object", "properties": {}, "required": []}),
            toolbridge_core::AbiAddresses {
                callback_address: 0x1000,
                release_address: 0x2000,
            },
        )
        .unwrap();
        let tool = DelegateTool::external(descriptor.clone());
        assert!(tool.binding().is_none());
        assert_eq!(tool.into_parts().0, descriptor);
    }
}
