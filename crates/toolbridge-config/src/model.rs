// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Toolbridge.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Toolbridge configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolbridgeConfig {
    /// Agent identity and native core connection settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Defaults applied to every wrapped callable.
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Agent identity and native core connection settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Model identifier handed to the native core.
    #[serde(default = "default_model")]
    pub model: String,

    /// System prompt.
    #[serde(default)]
    pub preamble: String,

    /// API key for the model provider. Prefer `TOOLBRIDGE_AGENT_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OpenAI-compatible endpoint. When unset the core picks a provider
    /// from the model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// MCP server configuration file forwarded to the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_config_path: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            model: default_model(),
            preamble: String::new(),
            api_key: None,
            base_url: None,
            mcp_config_path: None,
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "toolbridge".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Defaults applied when a wrapped callable carries no metadata of its own.
///
/// `default_version` and `default_author` are placeholders. They are never
/// derived from the callable.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    #[serde(default = "default_tool_version")]
    pub default_version: String,

    #[serde(default = "default_tool_author")]
    pub default_author: String,

    /// Treat every wrapped callable as single-threaded.
    #[serde(default)]
    pub serialize_calls: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            default_version: default_tool_version(),
            default_author: default_tool_author(),
            serialize_calls: false,
        }
    }
}

fn default_tool_version() -> String {
    "1.0.0".to_string()
}

fn default_tool_author() -> String {
    "Unknown".to_string()
}
