// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delegation of host callables to a native agent core.
//!
//! This crate turns a [`Callable`](toolbridge_core::Callable) into a
//! [`ToolDescriptor`](toolbridge_core::ToolDescriptor) plus a live
//! [`TrampolineBinding`] whose C-ABI address the native core may call from
//! any of its threads:
//!
//! - [`builder`] -- the Delegate Tool Builder and its placeholder defaults
//! - [`trampoline`] -- static C-ABI entry points and the process-wide slot table
//! - [`binding`] -- the per-tool binding that owns a slot
//! - [`registry`] -- agent-scoped ownership of bindings
//! - [`envelope`] -- the JSON in/out codec for one call
//! - [`function`] / [`typed`] -- ready-made callables

pub mod binding;
pub mod builder;
pub mod envelope;
pub mod function;
pub mod registry;
pub mod trampoline;
pub mod typed;

pub use binding::{BindingStats, TrampolineBinding};
pub use builder::{
    DEFAULT_AUTHOR, DEFAULT_VERSION, DelegateTool, DelegateToolBuilder, ToolDefaults, ToolMetadata,
};
pub use envelope::Envelope;
pub use function::FnTool;
pub use registry::BindingRegistry;
pub use trampoline::{
    ReleaseFn, SLOT_CAPACITY, TrampolineFn, call_abi, registered_bindings,
    toolbridge_release_buffer,
};
pub use typed::TypedTool;
