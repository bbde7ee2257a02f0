// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic fake runtime for use across crates' tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::runtime::{AgentRuntime, RuntimeInvocation, RuntimeReply};
use ap_core::AgentId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

type Handler = Box<dyn Fn(&RuntimeInvocation) -> RuntimeReply + Send + Sync>;

/// What a [`ScriptedRuntime`] records about each invocation.
#[derive(Debug, Clone)]
pub struct InvocationRecord {
    pub agent_id: AgentId,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub model: String,
    pub team: bool,
}

/// Fake [`AgentRuntime`] replaying canned replies.
///
/// Replies queued with [`with_reply`](Self::with_reply) are consumed in
/// order; once exhausted (or from the start, with none queued) the runtime
/// echoes the prompt back as a successful response. A handler closure
/// overrides both and gets the full invocation, coordination server
/// included.
#[derive(Default)]
pub struct ScriptedRuntime {
    replies: Mutex<VecDeque<RuntimeReply>>,
    handler: Option<Handler>,
    delay: Option<Duration>,
    invocations: Mutex<Vec<InvocationRecord>>,
}

impl ScriptedRuntime {
    /// Echo runtime: every invocation completes with its own prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a canned reply.
    pub fn with_reply(self, reply: RuntimeReply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    /// Sleep this long inside every invocation (for timeout tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Compute every reply from the invocation itself.
    pub fn with_handler(
        mut self,
        handler: impl Fn(&RuntimeInvocation) -> RuntimeReply + Send + Sync + 'static,
    ) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Everything this runtime has been asked to do, in order.
    pub fn invocations(&self) -> Vec<InvocationRecord> {
        self.invocations.lock().clone()
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    async fn run(&self, invocation: RuntimeInvocation) -> RuntimeReply {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.invocations.lock().push(InvocationRecord {
            agent_id: invocation.agent_id.clone(),
            prompt: invocation.prompt.clone(),
            system_prompt: invocation.system_prompt.clone(),
            model: invocation.model.clone(),
            team: invocation.coordination.is_some(),
        });

        if let Some(handler) = &self.handler {
            return handler(&invocation);
        }
        if let Some(reply) = self.replies.lock().pop_front() {
            return reply;
        }
        RuntimeReply::ok(invocation.prompt.clone())
    }
}
