// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema generation for the Toolbridge delegation bridge.
//!
//! Turns a [`Callable`](toolbridge_core::Callable)'s self-description into a
//! JSON Schema `object` document the native core's planner reads to decide
//! call arguments:
//!
//! - [`generator`] -- signature introspection and schema rendering
//! - [`derive`] -- parameter lists derived from `schemars::JsonSchema` types
//! - [`validate`] -- well-formedness check for published schemas

pub mod derive;
pub mod generator;
pub mod validate;

pub use derive::{parameters_for, parameters_from_schema, schema_for};
pub use generator::{
    FunctionSchema, description_of, generate, parameter_entries, parameters_schema, signature_of,
};
pub use validate::check_parameters_schema;
