// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent Facade for the Toolbridge delegation bridge.
//!
//! [`AgentFacade`] accepts a mixed list of pre-built tools and plain
//! callables, routes the callables through the Delegate Tool Builder, and
//! asks a [`NativeAgentCore`](toolbridge_core::NativeAgentCore) to construct
//! the agent. The returned [`AgentHandle`] owns every trampoline binding the
//! agent's tools call into, so no callback address outlives its callable.

pub mod facade;
pub mod loopback;

pub use facade::{AgentFacade, AgentHandle, AgentOptions, ToolSpec, tool_defaults};
pub use loopback::LoopbackCore;
