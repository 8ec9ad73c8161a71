// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traits for the native agent core the bridge hands tools to.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::BridgeError;
use crate::types::{AgentId, RegistrationPayload};

/// Everything the native core needs to construct one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentRequest {
    pub id: AgentId,
    pub name: String,
    pub model: String,
    /// System prompt.
    pub preamble: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// OpenAI-compatible endpoint; the core picks a provider from `model` when unset.
    pub base_url: Option<String>,
    pub mcp_config_path: Option<PathBuf>,
    /// Tools in registration order.
    pub tools: Vec<RegistrationPayload>,
}

/// The external runtime that plans, reasons, and calls registered tools.
///
/// Implementations receive registration payloads whose callback addresses
/// stay valid until the returned [`NativeAgent`] is dropped.
#[async_trait]
pub trait NativeAgentCore: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    /// Constructs an agent with the given tools.
    async fn create_agent(
        &self,
        request: AgentRequest,
    ) -> Result<Box<dyn NativeAgent>, BridgeError>;
}

/// One agent instance owned by the native core.
#[async_trait]
pub trait NativeAgent: Send {
    /// Runs a prompt to completion, calling tools as the core sees fit.
    async fn prompt(&mut self, prompt: &str) -> Result<String, BridgeError>;
}
