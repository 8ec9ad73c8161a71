// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-agent registry of trampoline bindings.
//!
//! The [`BindingRegistry`] owns every [`TrampolineBinding`] created for one
//! agent, indexed by tool name. It is the single owner of those bindings:
//! dropping the registry releases all of the agent's trampoline slots.

use std::collections::HashMap;

use toolbridge_core::{AgentId, BridgeError};
use tracing::debug;

use crate::binding::{BindingStats, TrampolineBinding};

/// Bindings of one agent, keyed by tool name.
#[derive(Debug)]
pub struct BindingRegistry {
    agent: AgentId,
    bindings: HashMap<String, TrampolineBinding>,
}

impl BindingRegistry {
    /// Creates an empty registry for `agent`.
    pub fn new(agent: AgentId) -> Self {
        Self {
            agent,
            bindings: HashMap::new(),
        }
    }

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    /// Takes ownership of a binding. Rejects a second binding with the same
    /// tool name.
    ///
    /// A binding built for another agent id (a pre-built tool handed to this
    /// agent) is adopted and re-keyed to this agent.
    pub fn insert(&mut self, mut binding: TrampolineBinding) -> Result<(), BridgeError> {
        if self.bindings.contains_key(binding.tool_name()) {
            return Err(BridgeError::DuplicateToolName {
                name: binding.tool_name().to_string(),
            });
        }
        if binding.agent() != self.agent {
            debug!(
                tool = binding.tool_name(),
                owner = %binding.agent(),
                agent = %self.agent,
                "adopting pre-built binding"
            );
            binding.reassign(self.agent);
        }
        self.bindings.insert(binding.tool_name().to_string(), binding);
        Ok(())
    }

    /// Looks up a binding by tool name.
    pub fn get(&self, name: &str) -> Option<&TrampolineBinding> {
        self.bindings.get(name)
    }

    /// Returns all tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns `(name, stats)` pairs for all bindings, sorted by name.
    pub fn stats(&self) -> Vec<(&str, BindingStats)> {
        let mut entries: Vec<(&str, BindingStats)> = self
            .bindings
            .values()
            .map(|b| (b.tool_name(), b.stats()))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Drop for BindingRegistry {
    fn drop(&mut self) {
        debug!(
            agent = %self.agent,
            bindings = self.bindings.len(),
            "releasing agent bindings"
        );
    }
}
