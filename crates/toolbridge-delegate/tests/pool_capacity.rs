// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exhausts the process-wide trampoline slot table. Kept in its own test
//! binary so no other test competes for slots.

use std::sync::Arc;

use serde_json::json;
use toolbridge_core::{AgentId, BridgeError};
use toolbridge_delegate::{DelegateToolBuilder, FnTool, SLOT_CAPACITY, ToolDefaults};

fn numbered(i: usize) -> Arc<FnTool> {
    Arc::new(FnTool::new(format!("tool_{i}"), move |_| Ok(json!(i))))
}

#[test]
fn slots_are_bounded_and_reusable() {
    let builder = DelegateToolBuilder::new(AgentId::new(), ToolDefaults::default());

    let mut held = Vec::with_capacity(SLOT_CAPACITY);
    for i in 0..SLOT_CAPACITY {
        held.push(builder.build(numbered(i)).expect("slot should be free"));
    }

    let err = builder.build(numbered(SLOT_CAPACITY)).unwrap_err();
    assert!(matches!(
        err,
        BridgeError::TrampolinePoolExhausted { capacity } if capacity == SLOT_CAPACITY
    ));

    // Every held binding still answers with its own value.
    for (i, (_, binding)) in held.iter().enumerate() {
        assert_eq!(binding.invoke("{}"), i.to_string());
    }

    // Releasing one binding frees exactly one slot.
    held.pop();
    let (_, reused) = builder.build(numbered(999)).expect("a slot was released");
    assert_eq!(reused.invoke("{}"), "999");
    assert!(builder.build(numbered(1000)).is_err());
}
