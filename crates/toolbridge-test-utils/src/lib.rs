// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Toolbridge integration tests.
//!
//! - [`MockAgentCore`] - scripted native core that calls tools through their
//!   raw C-ABI addresses

pub mod mock_core;

pub use mock_core::{CallRecord, MockAgentCore, PlannedCall};
