// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between host callables, the bridge, and the native agent core.

pub mod agent_core;
pub mod callable;

pub use agent_core::{AgentRequest, NativeAgent, NativeAgentCore};
pub use callable::Callable;
