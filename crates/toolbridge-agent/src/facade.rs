// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Agent Facade: normalizes a mixed tool list and hands it to the
//! native agent core.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use toolbridge_config::{AgentConfig, ToolbridgeConfig, ToolsConfig};
use toolbridge_core::{
    AgentId, AgentRequest, BridgeError, Callable, NativeAgent, NativeAgentCore, ToolDescriptor,
};
use toolbridge_delegate::{
    BindingRegistry, BindingStats, DelegateTool, DelegateToolBuilder, ToolDefaults, ToolMetadata,
};
use tracing::{debug, info};

/// One element of the tool list passed to [`AgentFacade::create_agent`].
pub enum ToolSpec {
    /// Already described; passed through unchanged.
    Descriptor(DelegateTool),
    /// A plain callable, routed through the Delegate Tool Builder.
    Callable {
        callable: Arc<dyn Callable>,
        metadata: ToolMetadata,
    },
}

impl ToolSpec {
    /// Wraps a callable with the default version and author.
    pub fn callable(callable: impl Callable + 'static) -> Self {
        Self::from(Arc::new(callable) as Arc<dyn Callable>)
    }

    /// Wraps a callable with per-tool metadata overrides.
    pub fn with_metadata(callable: impl Callable + 'static, metadata: ToolMetadata) -> Self {
        Self::Callable {
            callable: Arc::new(callable),
            metadata,
        }
    }

    /// The name the tool will be registered under.
    pub fn name(&self) -> &str {
        match self {
            Self::Descriptor(tool) => tool.name(),
            Self::Callable { callable, .. } => callable.name(),
        }
    }
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Descriptor(tool) => f.debug_tuple("Descriptor").field(&tool.name()).finish(),
            Self::Callable { callable, .. } => {
                f.debug_tuple("Callable").field(&callable.name()).finish()
            }
        }
    }
}

impl From<DelegateTool> for ToolSpec {
    fn from(tool: DelegateTool) -> Self {
        Self::Descriptor(tool)
    }
}

impl From<ToolDescriptor> for ToolSpec {
    fn from(descriptor: ToolDescriptor) -> Self {
        Self::Descriptor(DelegateTool::external(descriptor))
    }
}

impl From<Arc<dyn Callable>> for ToolSpec {
    fn from(callable: Arc<dyn Callable>) -> Self {
        Self::Callable {
            callable,
            metadata: ToolMetadata::default(),
        }
    }
}

/// Agent construction options forwarded to the native core.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentOptions {
    pub name: String,
    pub model: String,
    pub preamble: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub mcp_config_path: Option<PathBuf>,
}

impl AgentOptions {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Fills every option from the `[agent]` config section.
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            name: config.name.clone(),
            model: config.model.clone(),
            preamble: config.preamble.clone(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            mcp_config_path: config.mcp_config_path.clone(),
        }
    }

    pub fn preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn mcp_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mcp_config_path = Some(path.into());
        self
    }
}

/// Builder defaults taken from the `[tools]` config section.
pub fn tool_defaults(config: &ToolsConfig) -> ToolDefaults {
    ToolDefaults {
        version: config.default_version.clone(),
        author: config.default_author.clone(),
        serialize_calls: config.serialize_calls,
    }
}

/// Creates agents on a native core from mixed tool lists.
#[derive(Clone)]
pub struct AgentFacade {
    core: Arc<dyn NativeAgentCore>,
    defaults: ToolDefaults,
}

impl AgentFacade {
    pub fn new(core: Arc<dyn NativeAgentCore>, defaults: ToolDefaults) -> Self {
        Self { core, defaults }
    }

    /// A facade using the `[tools]` section of `config` as builder defaults.
    pub fn from_config(core: Arc<dyn NativeAgentCore>, config: &ToolbridgeConfig) -> Self {
        Self::new(core, tool_defaults(&config.tools))
    }

    pub fn core(&self) -> &dyn NativeAgentCore {
        self.core.as_ref()
    }

    /// Creates an agent with only a name and model set.
    pub async fn create_agent(
        &self,
        name: impl Into<String>,
        model: impl Into<String>,
        tools: Vec<ToolSpec>,
    ) -> Result<AgentHandle, BridgeError> {
        self.create_agent_with(AgentOptions::new(name, model), tools)
            .await
    }

    /// Normalizes `tools` and asks the native core for an agent.
    ///
    /// Tool order is preserved. Duplicate names fail before any trampoline
    /// is installed. If any later step fails, every binding created so far
    /// is released.
    pub async fn create_agent_with(
        &self,
        options: AgentOptions,
        tools: Vec<ToolSpec>,
    ) -> Result<AgentHandle, BridgeError> {
        let mut seen = HashSet::with_capacity(tools.len());
        for tool in &tools {
            if !seen.insert(tool.name()) {
                return Err(BridgeError::DuplicateToolName {
                    name: tool.name().to_string(),
                });
            }
        }

        let id = AgentId::new();
        let builder = DelegateToolBuilder::new(id, self.defaults.clone());
        let mut registry = BindingRegistry::new(id);
        let mut descriptors = Vec::with_capacity(tools.len());

        for tool in tools {
            let (descriptor, binding) = match tool {
                ToolSpec::Descriptor(tool) => tool.into_parts(),
                ToolSpec::Callable { callable, metadata } => {
                    let (descriptor, binding) = builder.build_with(callable, metadata)?;
                    (descriptor, Some(binding))
                }
            };
            if let Some(binding) = binding {
                registry.insert(binding)?;
            }
            debug!(tool = descriptor.name(), agent = %id, "registered tool");
            descriptors.push(descriptor);
        }

        let request = AgentRequest {
            id,
            name: options.name.clone(),
            model: options.model.clone(),
            preamble: options.preamble,
            api_key: options.api_key,
            base_url: options.base_url,
            mcp_config_path: options.mcp_config_path,
            tools: descriptors
                .iter()
                .map(ToolDescriptor::registration_payload)
                .collect(),
        };
        let native = self.core.create_agent(request).await?;

        info!(
            agent = %id,
            name = options.name.as_str(),
            model = options.model.as_str(),
            core = self.core.name(),
            tools = descriptors.len(),
            "agent created"
        );
        Ok(AgentHandle {
            native,
            registry,
            id,
            name: options.name,
            descriptors,
        })
    }
}

impl std::fmt::Debug for AgentFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentFacade")
            .field("core", &self.core.name())
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// A live agent and the bindings its tools call into.
///
/// Field order matters: the native agent is dropped before the binding
/// registry, so the core stops calling before any slot is released.
pub struct AgentHandle {
    native: Box<dyn NativeAgent>,
    registry: BindingRegistry,
    id: AgentId,
    name: String,
    descriptors: Vec<ToolDescriptor>,
}

impl AgentHandle {
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered tools, in registration order.
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Call counters of every host-owned tool, sorted by name.
    pub fn tool_stats(&self) -> Vec<(&str, BindingStats)> {
        self.registry.stats()
    }

    /// Runs a prompt on the native agent.
    pub async fn prompt(&mut self, prompt: &str) -> Result<String, BridgeError> {
        debug!(agent = %self.id, "running prompt");
        self.native.prompt(prompt).await
    }
}

impl std::fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("tools", &self.registry.names())
            .finish_non_exhaustive()
    }
}

impl Drop for AgentHandle {
    fn drop(&mut self) {
        info!(agent = %self.id, name = self.name.as_str(), "agent destroyed");
    }
}
