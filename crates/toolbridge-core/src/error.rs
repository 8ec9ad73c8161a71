// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Toolbridge delegation bridge.

use thiserror::Error;

/// The primary error type used across registration, invocation, and the
/// native agent core seam.
///
/// Variants fall into two groups. Per-call variants ([`InvalidArguments`],
/// [`MissingArgument`], [`CallableFailure`]) never leave the trampoline as
/// errors: they are rendered into an error envelope using their `Display`
/// text. Everything else is a registration-time failure surfaced to the code
/// constructing the agent.
///
/// [`InvalidArguments`]: BridgeError::InvalidArguments
/// [`MissingArgument`]: BridgeError::MissingArgument
/// [`CallableFailure`]: BridgeError::CallableFailure
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The callable's signature could not be introspected.
    #[error("schema generation failed for `{tool}`: {message}")]
    SchemaGeneration { tool: String, message: String },

    /// Two tools in one agent share a name.
    #[error("duplicate tool name: {name}")]
    DuplicateToolName { name: String },

    /// A pre-built descriptor failed validation.
    #[error("invalid tool descriptor `{name}`: {message}")]
    InvalidDescriptor { name: String, message: String },

    /// The input buffer was not UTF-8, not JSON, or not a JSON object.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// A required parameter was absent from the argument object.
    #[error("missing required argument: {name}")]
    MissingArgument { name: String },

    /// The bound callable itself failed. Displays the callable's message verbatim.
    #[error("{0}")]
    CallableFailure(String),

    /// Every trampoline slot in the process is occupied.
    #[error("trampoline pool exhausted: all {capacity} slots are in use")]
    TrampolinePoolExhausted { capacity: usize },

    /// The native agent core rejected a request or failed while running a prompt.
    #[error("agent core error: {message}")]
    Core {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Shorthand for a [`BridgeError::CallableFailure`] carrying `message`.
    pub fn callable(message: impl Into<String>) -> Self {
        Self::CallableFailure(message.into())
    }

    /// Shorthand for a [`BridgeError::Core`] without an underlying source.
    pub fn core(message: impl Into<String>) -> Self {
        Self::Core {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for failures that happen during a single tool invocation
    /// and are recovered into an error envelope at the trampoline boundary.
    pub fn is_per_call(&self) -> bool {
        matches!(
            self,
            Self::InvalidArguments(_) | Self::MissingArgument { .. } | Self::CallableFailure(_)
        )
    }
}
