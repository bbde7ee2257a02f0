// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inter-agent message type.
//!
//! Shared by the in-process bus and the journal; the serialized field names
//! are the `messages.jsonl` contract.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

/// Recipient marker addressing every agent except the sender.
pub const BROADCAST: &str = "*";

/// A single inter-agent message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub from: AgentId,
    /// Recipient agent id, or [`BROADCAST`]
    pub to: String,
    pub content: String,
    /// Seconds since epoch
    pub timestamp: f64,
}

impl Message {
    pub fn new(
        from: AgentId,
        to: impl Into<String>,
        content: impl Into<String>,
        timestamp: f64,
    ) -> Self {
        Self { from, to: to.into(), content: content.into(), timestamp }
    }

    pub fn is_broadcast(&self) -> bool {
        self.to == BROADCAST
    }

    /// True when `agent` should see this message: addressed to it (directly
    /// or by broadcast) and not sent by it.
    pub fn addressed_to(&self, agent: &AgentId) -> bool {
        (self.to == agent.as_str() || self.is_broadcast()) && self.from != *agent
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
