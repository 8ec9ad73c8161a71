// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The C-ABI trampoline layer.
//!
//! A native caller holds one integer per tool: the address of a function
//! with the signature `char *tool(const char *json_args)`. Those addresses
//! point at a fixed set of static functions, one per slot of a process-wide
//! table. Installing a binding claims a free slot; dropping the owning
//! [`TrampolineBinding`](crate::binding::TrampolineBinding) empties it again.
//!
//! Because the functions themselves are static, a published address can
//! never dangle. A call that lands on an emptied slot is answered with an
//! error envelope instead of reaching a freed callable.
//!
//! Slots are claimed round-robin from a rotating cursor, so an emptied slot
//! is handed out again only after every other slot has been tried. Until
//! then a stale address keeps answering with the released-slot envelope.
//! Once the cursor wraps back to it, the slot may hold an unrelated tool,
//! and an address kept past its agent's teardown for that long reaches that
//! tool. A native core must stop calling an agent's addresses once the
//! agent is destroyed.
//!
//! Buffer ownership: every trampoline returns a buffer allocated here. The
//! caller copies it and hands it back to [`toolbridge_release_buffer`]
//! (whose address travels next to the callback address) so it is freed by
//! the allocator that produced it.

use std::ffi::{CStr, CString, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use toolbridge_core::{AbiAddresses, AgentId, BridgeError};
use tracing::warn;

use crate::binding::BindingCore;
use crate::envelope::Envelope;

/// `char *(*)(const char *)`: the single wire contract for tool calls.
pub type TrampolineFn = unsafe extern "C" fn(*const c_char) -> *mut c_char;

/// `void (*)(char *)`: frees a buffer returned by a trampoline.
pub type ReleaseFn = unsafe extern "C" fn(*mut c_char);

/// Number of tools that can be bound at once across the whole process.
pub const SLOT_CAPACITY: usize = 128;

/// Envelope text for calls that land on an emptied slot.
pub const RELEASED_MESSAGE: &str = "tool is no longer registered";

const ENCODING_FAILURE: &CStr = c"{\"error\":\"tool output could not be encoded\"}";

static SLOTS: [RwLock<Option<Arc<BindingCore>>>; SLOT_CAPACITY] =
    [const { RwLock::new(None) }; SLOT_CAPACITY];

/// Where the next free-slot search starts.
static NEXT_SLOT: AtomicUsize = AtomicUsize::new(0);

macro_rules! trampoline_table {
    ($($slot:literal)*) => {
        [$(slot_trampoline::<$slot> as TrampolineFn),*]
    };
}

static TRAMPOLINES: [TrampolineFn; SLOT_CAPACITY] = trampoline_table![
    0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31 32 33
    34 35 36 37 38 39 40 41 42 43 44 45 46 47 48 49 50 51 52 53 54 55 56 57 58 59 60 61 62 63
    64 65 66 67 68 69 70 71 72 73 74 75 76 77 78 79 80 81 82 83 84 85 86 87 88 89 90 91 92 93
    94 95 96 97 98 99 100 101 102 103 104 105 106 107 108 109 110 111 112 113 114 115 116 117
    118 119 120 121 122 123 124 125 126 127];

/// # Safety
///
/// `input` must be null or point to a NUL-terminated buffer that stays
/// valid for the duration of the call.
unsafe extern "C" fn slot_trampoline<const SLOT: usize>(input: *const c_char) -> *mut c_char {
    let bytes = if input.is_null() {
        None
    } else {
        // SAFETY: non-null and NUL-terminated per this function's contract.
        Some(unsafe { CStr::from_ptr(input) }.to_bytes())
    };
    let text = panic::catch_unwind(AssertUnwindSafe(|| dispatch(SLOT, bytes)))
        .unwrap_or_else(|_| Envelope::Error("tool dispatch panicked".into()).to_json_text());
    into_raw_buffer(text)
}

/// Frees a buffer previously returned by a trampoline. Null is ignored.
///
/// # Safety
///
/// `buffer` must be null or a pointer returned by a trampoline that has not
/// been released yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn toolbridge_release_buffer(buffer: *mut c_char) {
    if !buffer.is_null() {
        // SAFETY: the buffer came from `CString::into_raw` in `into_raw_buffer`.
        drop(unsafe { CString::from_raw(buffer) });
    }
}

fn dispatch(slot: usize, input: Option<&[u8]>) -> String {
    let Some(binding) = binding_at(slot) else {
        warn!(slot, "call landed on a released trampoline slot");
        return Envelope::Error(RELEASED_MESSAGE.into()).to_json_text();
    };
    let envelope = match input {
        Some(bytes) => binding.invoke(bytes),
        None => Envelope::from_result(Err(BridgeError::InvalidArguments(
            "null input buffer".into(),
        ))),
    };
    envelope.to_json_text()
}

fn into_raw_buffer(text: String) -> *mut c_char {
    CString::new(text)
        .unwrap_or_else(|_| CString::from(ENCODING_FAILURE))
        .into_raw()
}

fn binding_at(slot: usize) -> Option<Arc<BindingCore>> {
    SLOTS
        .get(slot)?
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Slot indices in search order, starting at `start` and wrapping around.
fn search_order(start: usize) -> impl Iterator<Item = usize> {
    (0..SLOT_CAPACITY).map(move |offset| (start + offset) % SLOT_CAPACITY)
}

/// Claims a free slot for `binding`, returning its index.
///
/// The search starts just past the most recently claimed slot.
pub(crate) fn install(binding: Arc<BindingCore>) -> Result<usize, BridgeError> {
    for index in search_order(NEXT_SLOT.load(Ordering::Relaxed)) {
        let mut guard = SLOTS[index].write().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            *guard = Some(binding);
            NEXT_SLOT.store((index + 1) % SLOT_CAPACITY, Ordering::Relaxed);
            return Ok(index);
        }
    }
    Err(BridgeError::TrampolinePoolExhausted {
        capacity: SLOT_CAPACITY,
    })
}

/// Empties a slot. Calls already in flight keep their own reference to the
/// binding and finish normally.
pub(crate) fn uninstall(slot: usize) {
    if let Some(entry) = SLOTS.get(slot) {
        entry.write().unwrap_or_else(PoisonError::into_inner).take();
    }
}

/// The native addresses for a slot.
pub(crate) fn abi_for(slot: usize) -> AbiAddresses {
    AbiAddresses {
        callback_address: TRAMPOLINES[slot] as usize,
        release_address: toolbridge_release_buffer as ReleaseFn as usize,
    }
}

/// Lists the `(agent, tool)` keys of every live binding in the process.
///
/// A binding adopted by another agent's registry is listed under the
/// adopting agent.
pub fn registered_bindings() -> Vec<(AgentId, String)> {
    SLOTS
        .iter()
        .filter_map(|slot| {
            slot.read()
                .unwrap_or_else(PoisonError::into_inner)
                .as_ref()
                .map(|binding| (binding.agent(), binding.tool_name().to_string()))
        })
        .collect()
}

/// Calls a tool through its native addresses exactly as a foreign caller
/// would: pass a NUL-terminated argument buffer, copy the returned buffer,
/// then hand it back to the release function.
///
/// # Safety
///
/// `abi.callback_address` must be the address of a live [`TrampolineFn`]
/// and `abi.release_address` the matching [`ReleaseFn`]. Addresses taken
/// from descriptors built by this crate always satisfy this.
pub unsafe fn call_abi(abi: AbiAddresses, arguments: &str) -> Result<String, BridgeError> {
    let input = CString::new(arguments)
        .map_err(|e| BridgeError::InvalidArguments(format!("argument text contains NUL: {e}")))?;

    // SAFETY: guaranteed by the caller.
    let callback = unsafe { std::mem::transmute::<usize, TrampolineFn>(abi.callback_address) };
    // SAFETY: guaranteed by the caller.
    let release = unsafe { std::mem::transmute::<usize, ReleaseFn>(abi.release_address) };

    // SAFETY: `input` is NUL-terminated and outlives the call.
    let output = unsafe { callback(input.as_ptr()) };
    if output.is_null() {
        return Err(BridgeError::Internal("trampoline returned a null buffer".into()));
    }
    // SAFETY: non-null buffers returned by a trampoline are NUL-terminated.
    let text = unsafe { CStr::from_ptr(output) }.to_string_lossy().into_owned();
    // SAFETY: `output` came from `callback` and is released exactly once.
    unsafe { release(output) };
    Ok(text)
}
