// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent coordination facade.
//!
//! Each agent gets its own server instance bound to its id and the shared
//! state directory. The server is a weak view: every operation opens a
//! fresh board handle on the shared file rather than holding the pool's
//! instance, so a server outliving its pool extends nothing. Replies are
//! structured JSON values; board errors come back as `{"error": ...}`
//! replies, never as Rust errors.

use crate::error::PoolError;
use ap_board::{BoardError, MessageJournal, TaskBoard};
use ap_core::AgentId;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;

/// Coordination surface handed to one agent's runtime.
#[derive(Debug)]
pub struct CoordinationServer {
    agent: AgentId,
    board_dir: PathBuf,
    stale_timeout: Option<Duration>,
    // The journal read cursor is per-server, so one agent's check never
    // consumes another's unread set.
    journal: parking_lot::Mutex<MessageJournal>,
}

impl CoordinationServer {
    pub fn new(
        agent: AgentId,
        board_dir: impl Into<PathBuf>,
        journal_dir: impl Into<PathBuf>,
        stale_timeout: Option<Duration>,
    ) -> Result<Self, PoolError> {
        let journal = MessageJournal::open(journal_dir)?;
        Ok(Self {
            agent,
            board_dir: board_dir.into(),
            stale_timeout,
            journal: parking_lot::Mutex::new(journal),
        })
    }

    pub fn agent(&self) -> &AgentId {
        &self.agent
    }

    /// Claim the best eligible task for this agent.
    pub fn claim_task(&self) -> Value {
        match self.open_board().and_then(|mut board| board.claim(&self.agent)) {
            Ok(Some(task)) => match serde_json::to_value(&task) {
                Ok(task) => json!({ "task": task }),
                Err(e) => error_reply(e),
            },
            Ok(None) => json!({ "status": "no tasks available" }),
            Err(e) => error_reply(e),
        }
    }

    /// Complete a task this agent still owns.
    pub fn complete_task(&self, id: &str, result: Option<String>) -> Value {
        match self.finish_owned(id, |board| board.complete(id, result.clone())) {
            Ok(reply) => reply,
            Err(e) => error_reply(e),
        }
    }

    /// Fail a task this agent still owns, recording the error.
    pub fn fail_task(&self, id: &str, error: &str) -> Value {
        match self.finish_owned(id, |board| board.fail(id, error)) {
            Ok(reply) => reply,
            Err(e) => error_reply(e),
        }
    }

    /// Snapshot of every task on the board.
    pub fn list_tasks(&self) -> Value {
        match self.open_board().and_then(|mut board| board.status()) {
            Ok(tasks) => match serde_json::to_value(&tasks) {
                Ok(tasks) => json!({ "tasks": tasks }),
                Err(e) => error_reply(e),
            },
            Err(e) => error_reply(e),
        }
    }

    /// Journal a direct message from this agent.
    pub fn send_message(&self, to: &str, content: &str) -> Value {
        match self.journal.lock().send(&self.agent, to, content) {
            Ok(_seq) => ack(),
            Err(e) => error_reply(e),
        }
    }

    /// Journal a broadcast from this agent.
    pub fn broadcast_message(&self, content: &str) -> Value {
        match self.journal.lock().broadcast(&self.agent, content) {
            Ok(_seq) => ack(),
            Err(e) => error_reply(e),
        }
    }

    /// Unread messages addressed to this agent.
    pub fn check_messages(&self) -> Value {
        match self.journal.lock().check(&self.agent) {
            Ok(messages) => match serde_json::to_value(&messages) {
                Ok(messages) => json!({ "messages": messages }),
                Err(e) => error_reply(e),
            },
            Err(e) => error_reply(e),
        }
    }

    /// Terminal transitions require that the task is still assigned to this
    /// agent; a claim lost to the stale sweep gets a rejection reply.
    fn finish_owned(
        &self,
        id: &str,
        op: impl FnOnce(&mut TaskBoard) -> Result<(), BoardError>,
    ) -> Result<Value, BoardError> {
        let mut board = self.open_board()?;
        let owned = board
            .status()?
            .iter()
            .any(|t| t.id == id && t.assigned_to.as_ref() == Some(&self.agent));
        if !owned {
            return Ok(json!({
                "error": format!("task {id} is not assigned to {}", self.agent)
            }));
        }
        op(&mut board)?;
        Ok(ack())
    }

    fn open_board(&self) -> Result<TaskBoard, BoardError> {
        let mut board = TaskBoard::open(&self.board_dir)?;
        if let Some(stale) = self.stale_timeout {
            board = board.with_stale_timeout(stale);
        }
        Ok(board)
    }
}

fn ack() -> Value {
    json!({ "status": "ok" })
}

fn error_reply(e: impl std::fmt::Display) -> Value {
    json!({ "error": e.to_string() })
}

#[cfg(test)]
#[path = "coordination_tests.rs"]
mod tests;
