// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The signature-description seam every bridged callable implements.

use serde_json::Value;

use crate::error::BridgeError;
use crate::signature::{Arguments, ParameterSpec};
use crate::types::Concurrency;

/// A host callable that can be wrapped as a tool.
///
/// Implementations describe themselves (identifier, documentation, parameter
/// list) so a schema can be derived, and accept decoded JSON arguments when
/// invoked. Returning `None` from [`parameters`](Callable::parameters) marks
/// the callable as opaque; wrapping it fails with a schema generation error
/// rather than registering a malformed tool.
pub trait Callable: Send + Sync {
    /// The callable's identifier, used as the tool name.
    fn name(&self) -> &str;

    /// Documentation text, if any.
    fn doc(&self) -> Option<&str> {
        None
    }

    /// Ordered parameter list, or `None` if it cannot be discovered.
    fn parameters(&self) -> Option<Vec<ParameterSpec>>;

    /// A hand-written or derived JSON Schema to publish instead of the one
    /// generated from [`parameters`](Callable::parameters).
    fn explicit_schema(&self) -> Option<Value> {
        None
    }

    /// Invokes the callable with arguments already mapped to its parameters.
    ///
    /// Failures are reported as [`BridgeError::CallableFailure`] (or
    /// [`BridgeError::InvalidArguments`] for values of the wrong shape).
    /// Panics are tolerated: the trampoline catches them.
    fn call(&self, args: &Arguments) -> Result<Value, BridgeError>;

    /// Whether the callable may be entered from several threads at once.
    fn concurrency(&self) -> Concurrency {
        Concurrency::Reentrant
    }
}
