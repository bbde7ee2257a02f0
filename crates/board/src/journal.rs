// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only cross-process message journal.
//!
//! One JSON object per line in `messages.jsonl`, serialized by an advisory
//! lock on `messages.lock`. Sequence ids are monotonic across processes
//! because the writer re-reads the tail under the exclusive lock. Each
//! journal handle keeps its own in-memory read cursor, so two agents
//! sharing a file never consume each other's unread set.

use crate::error::BoardError;
use crate::lock::{ExclusiveLock, SharedLock};
use ap_core::{AgentId, Clock, Message, SystemClock, BROADCAST};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

/// Journal file, one JSON object per line.
pub const JOURNAL_FILE: &str = "messages.jsonl";
/// Advisory-lock peer of [`JOURNAL_FILE`]; empty, never read.
pub const JOURNAL_LOCK_FILE: &str = "messages.lock";

#[derive(Debug, Serialize, Deserialize)]
struct JournalEntry {
    #[serde(flatten)]
    message: Message,
    seq: u64,
}

/// Handle on a shared journal directory with a private read cursor.
#[derive(Debug)]
pub struct MessageJournal<C: Clock = SystemClock> {
    dir: PathBuf,
    read_by: HashSet<u64>,
    clock: C,
}

impl MessageJournal<SystemClock> {
    /// Open (creating the directory if needed) a journal in `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, BoardError> {
        Self::open_with_clock(dir, SystemClock)
    }
}

impl<C: Clock> MessageJournal<C> {
    pub fn open_with_clock(dir: impl Into<PathBuf>, clock: C) -> Result<Self, BoardError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, read_by: HashSet::new(), clock })
    }

    /// Append a message addressed to `to` and return its sequence id.
    pub fn send(&self, from: &AgentId, to: &str, content: &str) -> Result<u64, BoardError> {
        let _guard = ExclusiveLock::acquire(&self.lock_path())?;

        let seq = self.next_seq_locked()?;
        let entry = JournalEntry {
            message: Message::new(from.clone(), to, content, self.clock.epoch_secs()),
            seq,
        };
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.journal_path())?;
        let line = serde_json::to_string(&entry)?;
        writeln!(file, "{line}")?;

        tracing::debug!(from = %from, to, seq, "message journaled");
        Ok(seq)
    }

    /// Append a message addressed to every other agent.
    pub fn broadcast(&self, from: &AgentId, content: &str) -> Result<u64, BoardError> {
        self.send(from, BROADCAST, content)
    }

    /// Unread messages addressed to `agent` (directly or broadcast, never
    /// its own), in journal order. Returned messages are marked read on
    /// this handle.
    pub fn check(&mut self, agent: &AgentId) -> Result<Vec<Message>, BoardError> {
        let entries = {
            let _guard = SharedLock::acquire(&self.lock_path())?;
            self.read_entries()?
        };

        let mut unread = Vec::new();
        for entry in entries {
            if self.read_by.contains(&entry.seq) {
                continue;
            }
            if entry.message.addressed_to(agent) {
                self.read_by.insert(entry.seq);
                unread.push(entry.message);
            }
        }
        Ok(unread)
    }

    fn journal_path(&self) -> PathBuf {
        self.dir.join(JOURNAL_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(JOURNAL_LOCK_FILE)
    }

    /// Next sequence id; caller holds the exclusive lock.
    fn next_seq_locked(&self) -> Result<u64, BoardError> {
        let last = self.read_entries()?.iter().map(|e| e.seq).max().unwrap_or(0);
        Ok(last + 1)
    }

    fn read_entries(&self) -> Result<Vec<JournalEntry>, BoardError> {
        let path = self.journal_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&path)?;
        let mut entries = Vec::new();
        for line in raw.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed journal line");
                }
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
