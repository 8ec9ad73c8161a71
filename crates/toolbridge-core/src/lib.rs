// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Toolbridge tool delegation bridge.
//!
//! This crate provides the error taxonomy, the data model shared by the
//! schema generator and the trampoline layer, and the trait seams: the
//! [`Callable`] signature-description interface host functions implement,
//! and the [`NativeAgentCore`] interface of the external agent runtime.

pub mod error;
pub mod signature;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BridgeError;
pub use signature::{Arguments, ParameterSpec, SchemaType, Signature};
pub use types::{
    AbiAddresses, AgentId, Concurrency, ParameterEntry, RegistrationPayload, ToolDescriptor,
    TypeTag,
};

pub use traits::{AgentRequest, Callable, NativeAgent, NativeAgentCore};
