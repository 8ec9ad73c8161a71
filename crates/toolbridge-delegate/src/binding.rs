// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bindings between a trampoline slot and a host callable.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;
use serde_json::Value;
use toolbridge_core::{AbiAddresses, AgentId, BridgeError, Callable, Concurrency, ParameterEntry};
use tracing::{debug, warn};

use crate::envelope::{Envelope, bind_arguments, decode_arguments};
use crate::trampoline;

/// Call counters for one binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BindingStats {
    pub calls: u64,
    pub failures: u64,
}

/// The state a trampoline slot points at.
pub(crate) struct BindingCore {
    agent: RwLock<AgentId>,
    tool_name: String,
    entries: Vec<ParameterEntry>,
    callable: Arc<dyn Callable>,
    serial: Option<Mutex<()>>,
    calls: AtomicU64,
    failures: AtomicU64,
}

impl BindingCore {
    pub(crate) fn new(
        agent: AgentId,
        tool_name: String,
        entries: Vec<ParameterEntry>,
        callable: Arc<dyn Callable>,
        concurrency: Concurrency,
    ) -> Self {
        Self {
            agent: RwLock::new(agent),
            tool_name,
            entries,
            callable,
            serial: (concurrency == Concurrency::Serialized).then(|| Mutex::new(())),
            calls: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub(crate) fn agent(&self) -> AgentId {
        *self.agent.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_agent(&self, agent: AgentId) {
        *self.agent.write().unwrap_or_else(PoisonError::into_inner) = agent;
    }

    pub(crate) fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Runs one call: decode, bind, invoke, wrap.
    pub(crate) fn invoke(&self, input: &[u8]) -> Envelope {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let agent = self.agent();
        let result = decode_arguments(input)
            .and_then(|map| bind_arguments(&self.entries, map))
            .and_then(|arguments| {
                let _guard = self
                    .serial
                    .as_ref()
                    .map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner));
                panic::catch_unwind(AssertUnwindSafe(|| self.callable.call(&arguments)))
                    .unwrap_or_else(|payload| Err(BridgeError::CallableFailure(panic_message(payload))))
            });

        match &result {
            Ok(_) => debug!(tool = self.tool_name.as_str(), %agent, "tool call succeeded"),
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    tool = self.tool_name.as_str(),
                    %agent,
                    error = %err,
                    "tool call failed"
                );
            }
        }
        Envelope::from_result(result)
    }

    fn stats(&self) -> BindingStats {
        BindingStats {
            calls: self.calls.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool panicked".to_string()
    }
}

/// Owns one trampoline slot for the lifetime of an agent.
///
/// The slot's native address stays callable while this value lives.
/// Dropping it empties the slot; later calls through the address receive an
/// error envelope.
pub struct TrampolineBinding {
    core: Arc<BindingCore>,
    slot: usize,
    abi: AbiAddresses,
}

impl TrampolineBinding {
    /// Claims a slot for `callable` under `agent`.
    pub fn install(
        agent: AgentId,
        tool_name: impl Into<String>,
        entries: Vec<ParameterEntry>,
        callable: Arc<dyn Callable>,
        concurrency: Concurrency,
    ) -> Result<Self, BridgeError> {
        let core = Arc::new(BindingCore::new(
            agent,
            tool_name.into(),
            entries,
            callable,
            concurrency,
        ));
        let slot = trampoline::install(Arc::clone(&core))?;
        debug!(tool = core.tool_name(), %agent, slot, "installed trampoline binding");
        Ok(Self {
            core,
            slot,
            abi: trampoline::abi_for(slot),
        })
    }

    pub fn tool_name(&self) -> &str {
        self.core.tool_name()
    }

    /// The agent that owns this binding.
    pub fn agent(&self) -> AgentId {
        self.core.agent()
    }

    /// Moves the binding to `agent`, e.g. when a tool built ahead of time is
    /// handed to a new agent.
    pub fn reassign(&mut self, agent: AgentId) {
        self.core.set_agent(agent);
    }

    /// The integer the native core calls.
    pub fn callback_address(&self) -> usize {
        self.abi.callback_address
    }

    pub fn abi(&self) -> AbiAddresses {
        self.abi
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Runs a call in-process, skipping the C boundary. Returns the
    /// envelope text the trampoline would have produced.
    pub fn invoke(&self, arguments: &str) -> String {
        self.core.invoke(arguments.as_bytes()).to_json_text()
    }

    /// Runs a call and returns the envelope as a JSON value.
    pub fn invoke_value(&self, arguments: &Value) -> Value {
        self.core.invoke(arguments.to_string().as_bytes()).to_value()
    }

    pub fn stats(&self) -> BindingStats {
        self.core.stats()
    }
}

impl std::fmt::Debug for TrampolineBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrampolineBinding")
            .field("tool", &self.core.tool_name())
            .field("agent", &self.core.agent())
            .field("slot", &self.slot)
            .finish()
    }
}

impl Drop for TrampolineBinding {
    fn drop(&mut self) {
        trampoline::uninstall(self.slot);
        debug!(
            tool = self.core.tool_name(),
            agent = %self.core.agent(),
            slot = self.slot,
            "released trampoline binding"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    use serde_json::json;
    use toolbridge_core::{Arguments, ParameterSpec, TypeTag};

    use super::*;
    use crate::trampoline::{call_abi, registered_bindings};

    struct Add;

    impl Callable for Add {
        fn name(&self) -> &str {
            "add"
        }

        fn parameters(&self) -> Option<Vec<ParameterSpec>> {
            Some(vec![
                ParameterSpec::typed::<i64>("x"),
                ParameterSpec::typed::<i64>("y"),
            ])
        }

        fn call(&self, args: &Arguments) -> Result<Value, BridgeError> {
            Ok(json!(args.get::<i64>("x")? + args.get::<i64>("y")?))
        }
    }

    struct Panics;

    impl Callable for Panics {
        fn name(&self) -> &str {
            "boom"
        }

        fn parameters(&self) -> Option<Vec<ParameterSpec>> {
            Some(Vec::new())
        }

        fn call(&self, _args: &Arguments) -> Result<Value, BridgeError> {
            panic!("kaboom")
        }
    }

    /// Records the highest number of overlapping calls it observed.
    struct Overlap {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Callable for Overlap {
        fn name(&self) -> &str {
            "overlap"
        }

        fn parameters(&self) -> Option<Vec<ParameterSpec>> {
            Some(Vec::new())
        }

        fn call(&self, _args: &Arguments) -> Result<Value, BridgeError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(Value::Null)
        }
    }

    fn entries() -> Vec<ParameterEntry> {
        ["x", "y"]
            .into_iter()
            .map(|name| ParameterEntry {
                name: name.into(),
                type_tag: TypeTag::Integer,
                required: true,
                default: None,
                description: None,
            })
            .collect()
    }

    fn add_binding() -> TrampolineBinding {
        TrampolineBinding::install(AgentId::new(), "add", entries(), Arc::new(Add), Concurrency::Reentrant)
            .unwrap()
    }

    #[test]
    fn invokes_through_the_native_address() {
        let binding = add_binding();
        // SAFETY: addresses come from a live binding.
        let out = unsafe { call_abi(binding.abi(), r#"{"x": 2, "y": 3}"#) }.unwrap();
        assert_eq!(out, "5");
        assert_eq!(binding.stats(), BindingStats { calls: 1, failures: 0 });
    }

    #[test]
    fn missing_argument_becomes_error_envelope() {
        let binding = add_binding();
        assert_eq!(
            binding.invoke(r#"{"x": 2}"#),
            r#"{"error":"missing required argument: y"}"#
        );
        assert_eq!(binding.stats().failures, 1);
    }

    #[test]
    fn panics_are_contained() {
        let binding = TrampolineBinding::install(
            AgentId::new(),
            "boom",
            Vec::new(),
            Arc::new(Panics),
            Concurrency::Reentrant,
        )
        .unwrap();
        // SAFETY: addresses come from a live binding.
        let out = unsafe { call_abi(binding.abi(), "{}") }.unwrap();
        assert_eq!(out, r#"{"error":"kaboom"}"#);

        // The binding keeps working after a panic.
        let again = unsafe { call_abi(binding.abi(), "{}") }.unwrap();
        assert_eq!(again, r#"{"error":"kaboom"}"#);
    }

    #[test]
    fn dropping_the_binding_unregisters_it() {
        let binding = add_binding();
        let agent = binding.agent();
        assert!(registered_bindings().contains(&(agent, "add".to_string())));
        drop(binding);
        assert!(!registered_bindings().iter().any(|(a, _)| *a == agent));
    }

    #[test]
    fn identical_calls_produce_identical_output() {
        let binding = add_binding();
        let first = binding.invoke(r#"{"x": 10, "y": -4}"#);
        let second = binding.invoke(r#"{"x": 10, "y": -4}"#);
        assert_eq!(first, second);
        assert_eq!(first, "6");
    }

    #[test]
    fn reentrant_bindings_run_calls_in_parallel() {
        let overlap = Arc::new(Overlap {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let binding = TrampolineBinding::install(
            AgentId::new(),
            "overlap",
            Vec::new(),
            overlap.clone(),
            Concurrency::Reentrant,
        )
        .unwrap();
        let abi = binding.abi();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                // SAFETY: the binding outlives every spawned call.
                thread::spawn(move || unsafe { call_abi(abi, "{}") }.unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "null");
        }
        assert!(overlap.peak.load(Ordering::SeqCst) >= 2);
        assert_eq!(binding.stats().calls, 4);
    }

    #[test]
    fn serialized_bindings_never_overlap() {
        let overlap = Arc::new(Overlap {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let binding = TrampolineBinding::install(
            AgentId::new(),
            "overlap",
            Vec::new(),
            overlap.clone(),
            Concurrency::Serialized,
        )
        .unwrap();
        let abi = binding.abi();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                // SAFETY: the binding outlives every spawned call.
                thread::spawn(move || unsafe { call_abi(abi, "{}") }.unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(overlap.peak.load(Ordering::SeqCst), 1);
    }
}
