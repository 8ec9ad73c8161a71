// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An in-process native core that calls tools directly.
//!
//! A loopback agent does no planning. A prompt of the form
//! `<tool> <json-arguments>` is executed as one call through the tool's
//! C-ABI addresses, exactly as a native core would make it, and the output
//! envelope is returned as the reply.

use std::collections::HashMap;

use async_trait::async_trait;
use toolbridge_core::{
    AbiAddresses, AgentId, AgentRequest, BridgeError, NativeAgent, NativeAgentCore,
};
use tracing::debug;

/// A [`NativeAgentCore`] that executes prompts as direct tool calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoopbackCore;

impl LoopbackCore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NativeAgentCore for LoopbackCore {
    fn name(&self) -> &str {
        "loopback"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn create_agent(
        &self,
        request: AgentRequest,
    ) -> Result<Box<dyn NativeAgent>, BridgeError> {
        let tools = request
            .tools
            .iter()
            .map(|tool| {
                (
                    tool.name.clone(),
                    AbiAddresses {
                        callback_address: tool.callback_address,
                        release_address: tool.release_address,
                    },
                )
            })
            .collect();
        Ok(Box::new(LoopbackAgent {
            id: request.id,
            tools,
        }))
    }
}

struct LoopbackAgent {
    id: AgentId,
    tools: HashMap<String, AbiAddresses>,
}

/// Splits `<tool> <json>` into its parts; missing arguments become `{}`.
fn parse_prompt(prompt: &str) -> Result<(&str, &str), BridgeError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(BridgeError::core("empty prompt; expected `<tool> <json-arguments>`"));
    }
    Ok(match prompt.split_once(char::is_whitespace) {
        Some((tool, arguments)) => (tool, arguments.trim()),
        None => (prompt, "{}"),
    })
}

#[async_trait]
impl NativeAgent for LoopbackAgent {
    async fn prompt(&mut self, prompt: &str) -> Result<String, BridgeError> {
        let (tool, arguments) = parse_prompt(prompt)?;
        let abi = *self
            .tools
            .get(tool)
            .ok_or_else(|| BridgeError::core(format!("unknown tool `{tool}`")))?;
        debug!(agent = %self.id, tool, "loopback tool call");

        let arguments = arguments.to_string();
        // SAFETY: the addresses come from a registration payload built by
        // this crate. The owning handle drops this agent before its bindings,
        // and trampoline addresses stay valid even for emptied slots.
        tokio::task::spawn_blocking(move || unsafe {
            toolbridge_delegate::call_abi(abi, &arguments)
        })
        .await
        .map_err(|e| BridgeError::Internal(format!("tool call task failed: {e}")))?
    }
}
