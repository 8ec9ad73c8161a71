// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted stand-in for the native agent core.
//!
//! `MockAgentCore` records every [`AgentRequest`] it receives. Each agent it
//! creates answers a prompt by running a pre-planned list of tool calls
//! through the registered C-ABI addresses (address to function pointer,
//! call, copy, release), the same way a native core would.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use toolbridge_core::{
    AbiAddresses, AgentRequest, BridgeError, NativeAgent, NativeAgentCore, RegistrationPayload,
};

/// One tool call the mock agent makes when prompted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCall {
    pub tool: String,
    /// Raw argument text, sent as-is (it need not be valid JSON).
    pub arguments: String,
}

impl PlannedCall {
    pub fn new(tool: impl Into<String>, arguments: &Value) -> Self {
        Self {
            tool: tool.into(),
            arguments: arguments.to_string(),
        }
    }

    /// A call whose argument text is not produced by a JSON encoder.
    pub fn raw(tool: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            arguments: arguments.into(),
        }
    }
}

/// One completed call as observed by the mock agent.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub tool: String,
    pub arguments: String,
    /// Output envelope text copied out of the trampoline's buffer.
    pub output: String,
}

impl CallRecord {
    /// The output envelope parsed as JSON.
    pub fn output_json(&self) -> Value {
        serde_json::from_str(&self.output).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Default)]
struct Shared {
    requests: Vec<AgentRequest>,
    transcript: Vec<CallRecord>,
}

/// A mock native core with a fixed call plan.
#[derive(Debug, Clone, Default)]
pub struct MockAgentCore {
    plan: Vec<PlannedCall>,
    parallel: bool,
    reject_creation: Option<String>,
    shared: Arc<Mutex<Shared>>,
}

impl MockAgentCore {
    /// A core whose agents make no calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// A core whose agents make `plan` on every prompt, in order.
    pub fn with_plan(plan: Vec<PlannedCall>) -> Self {
        Self {
            plan,
            ..Self::default()
        }
    }

    /// Runs every planned call of a prompt on its own thread at once.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Makes `create_agent` fail with `message`.
    pub fn rejecting(mut self, message: impl Into<String>) -> Self {
        self.reject_creation = Some(message.into());
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<AgentRequest> {
        self.lock().requests.clone()
    }

    /// The registration payloads of the most recent request.
    pub fn last_tools(&self) -> Vec<RegistrationPayload> {
        self.lock()
            .requests
            .last()
            .map(|r| r.tools.clone())
            .unwrap_or_default()
    }

    /// Every call made by any agent of this core.
    pub fn transcript(&self) -> Vec<CallRecord> {
        self.lock().transcript.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl NativeAgentCore for MockAgentCore {
    fn name(&self) -> &str {
        "mock-core"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn create_agent(
        &self,
        request: AgentRequest,
    ) -> Result<Box<dyn NativeAgent>, BridgeError> {
        let tools = request.tools.clone();
        self.lock().requests.push(request);
        if let Some(message) = &self.reject_creation {
            return Err(BridgeError::core(message.clone()));
        }
        Ok(Box::new(MockAgent {
            tools,
            plan: self.plan.clone(),
            parallel: self.parallel,
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct MockAgent {
    tools: Vec<RegistrationPayload>,
    plan: Vec<PlannedCall>,
    parallel: bool,
    shared: Arc<Mutex<Shared>>,
}

impl MockAgent {
    fn resolve(&self, call: &PlannedCall) -> Result<AbiAddresses, BridgeError> {
        self.tools
            .iter()
            .find(|t| t.name == call.tool)
            .map(|t| AbiAddresses {
                callback_address: t.callback_address,
                release_address: t.release_address,
            })
            .ok_or_else(|| BridgeError::core(format!("mock plan names unknown tool `{}`", call.tool)))
    }
}

fn run(abi: AbiAddresses, call: &PlannedCall) -> Result<CallRecord, BridgeError> {
    // SAFETY: addresses come from registration payloads built by the
    // delegate builder; trampolines are static functions.
    let output = unsafe { toolbridge_delegate::call_abi(abi, &call.arguments) }?;
    Ok(CallRecord {
        tool: call.tool.clone(),
        arguments: call.arguments.clone(),
        output,
    })
}

#[async_trait]
impl NativeAgent for MockAgent {
    async fn prompt(&mut self, _prompt: &str) -> Result<String, BridgeError> {
        let resolved = self
            .plan
            .iter()
            .map(|call| self.resolve(call).map(|abi| (abi, call)))
            .collect::<Result<Vec<_>, _>>()?;

        let records = if self.parallel {
            std::thread::scope(|scope| {
                let handles: Vec<_> = resolved
                    .iter()
                    .map(|(abi, call)| scope.spawn(move || run(*abi, call)))
                    .collect();
                handles
                    .into_iter()
                    .map(|h| {
                        h.join()
                            .unwrap_or_else(|_| Err(BridgeError::Internal("call thread panicked".into())))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })?
        } else {
            resolved
                .iter()
                .map(|(abi, call)| run(*abi, call))
                .collect::<Result<Vec<_>, _>>()?
        };

        let reply = records
            .iter()
            .map(|r| r.output.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .transcript
            .extend(records);
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use toolbridge_core::AgentId;

    use super::*;

    fn request(tools: Vec<RegistrationPayload>) -> AgentRequest {
        AgentRequest {
            id: AgentId::new(),
            name: "mock".into(),
            model: "none".into(),
            preamble: String::new(),
            api_key: None,
            base_url: None,
            mcp_config_path: None,
            tools,
        }
    }

    #[tokio::test]
    async fn requests_are_recorded_even_when_rejected() {
        let core = MockAgentCore::new().rejecting("no capacity");
        let err = core.create_agent(request(Vec::new())).await.err().unwrap();
        assert_eq!(err.to_string(), "agent core error: no capacity");
        assert_eq!(core.requests().len(), 1);
        assert!(core.last_tools().is_empty());
    }

    #[tokio::test]
    async fn unknown_planned_tool_fails_the_prompt() {
        let core = MockAgentCore::with_plan(vec![PlannedCall::new("missing", &json!({}))]);
        let mut agent = core.create_agent(request(Vec::new())).await.unwrap();
        let err = agent.prompt("go").await.unwrap_err();
        assert!(err.to_string().contains("unknown tool `missing`"));
        assert!(core.transcript().is_empty());
    }

    #[tokio::test]
    async fn empty_plan_replies_with_nothing() {
        let core = MockAgentCore::new();
        let mut agent = core.create_agent(request(Vec::new())).await.unwrap();
        assert_eq!(agent.prompt("hello").await.unwrap(), "");
    }

    #[test]
    fn raw_calls_keep_their_text() {
        let call = PlannedCall::raw("add", "{\"x\": 1,");
        assert_eq!(call.arguments, "{\"x\": 1,");
        assert_eq!(PlannedCall::new("add", &json!({"x": 1})).arguments, "{\"x\":1}");
    }
}
