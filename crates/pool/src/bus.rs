// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process message bus with per-agent inboxes.
//!
//! Fire-and-forget: no acknowledgments, no persistence, and sends never
//! fail. Unknown recipients and full inboxes drop the message with a
//! warning. Each inbox is a bounded queue drained atomically by its single
//! consumer.

use ap_core::{AgentId, Clock, Message, SystemClock, BROADCAST};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const INBOX_CAPACITY: usize = 256;

struct Inbox {
    tx: mpsc::Sender<Message>,
    // The receiver lives behind its own async lock so a drain (which may
    // wait) never holds the registry lock.
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<Message>>>,
}

/// Per-agent inboxes plus an append log of everything sent.
#[derive(Default)]
pub struct MessageBus {
    inboxes: Mutex<HashMap<AgentId, Inbox>>,
    history: Mutex<Vec<Message>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an inbox for `agent`, replacing (and discarding) any
    /// existing one.
    pub fn register(&self, agent: &AgentId) {
        let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
        let inbox = Inbox { tx, rx: Arc::new(tokio::sync::Mutex::new(rx)) };
        if self.inboxes.lock().insert(agent.clone(), inbox).is_some() {
            tracing::warn!(agent = %agent, "re-registered agent, previous inbox dropped");
        }
        tracing::debug!(agent = %agent, "agent registered on bus");
    }

    /// Drop `agent`'s inbox; undelivered messages are lost.
    pub fn unregister(&self, agent: &AgentId) {
        self.inboxes.lock().remove(agent);
        tracing::debug!(agent = %agent, "agent unregistered from bus");
    }

    /// Enqueue a direct message. Never fails: unknown recipients and full
    /// inboxes are logged and the message dropped.
    pub fn send(&self, from: &AgentId, to: &AgentId, content: &str) {
        let message = Message::new(from.clone(), to.as_str(), content, SystemClock.epoch_secs());
        self.history.lock().push(message.clone());

        let tx = self.inboxes.lock().get(to).map(|i| i.tx.clone());
        match tx {
            None => {
                tracing::warn!(from = %from, to = %to, "message to unknown recipient dropped");
            }
            Some(tx) => {
                if tx.try_send(message).is_err() {
                    tracing::warn!(from = %from, to = %to, "inbox full, message dropped");
                }
            }
        }
    }

    /// Enqueue a message on every inbox except the sender's.
    pub fn broadcast(&self, from: &AgentId, content: &str) {
        let message = Message::new(from.clone(), BROADCAST, content, SystemClock.epoch_secs());
        self.history.lock().push(message.clone());

        let recipients: Vec<(AgentId, mpsc::Sender<Message>)> = self
            .inboxes
            .lock()
            .iter()
            .filter(|(id, _)| *id != from)
            .map(|(id, inbox)| (id.clone(), inbox.tx.clone()))
            .collect();

        for (id, tx) in recipients {
            if tx.try_send(message.clone()).is_err() {
                tracing::warn!(from = %from, to = %id, "inbox full, broadcast dropped for recipient");
            }
        }
    }

    /// Drain `agent`'s inbox. With an empty inbox and a positive timeout,
    /// wait up to `timeout` for the first message, then collect any
    /// further arrivals. Unknown agents get an empty list.
    pub async fn receive(&self, agent: &AgentId, timeout: Duration) -> Vec<Message> {
        let rx = self.inboxes.lock().get(agent).map(|i| i.rx.clone());
        let Some(rx) = rx else {
            tracing::warn!(agent = %agent, "receive for unregistered agent");
            return Vec::new();
        };

        let mut rx = rx.lock().await;
        let mut messages = drain(&mut rx);
        if messages.is_empty() && !timeout.is_zero() {
            if let Ok(Some(first)) = tokio::time::timeout(timeout, rx.recv()).await {
                messages.push(first);
                messages.extend(drain(&mut rx));
            }
        }
        messages
    }

    /// Ordered append log of every message sent through the bus.
    pub fn history(&self) -> Vec<Message> {
        self.history.lock().clone()
    }

    /// Drop every inbox (pool teardown).
    pub fn clear(&self) {
        self.inboxes.lock().clear();
    }
}

fn drain(rx: &mut mpsc::Receiver<Message>) -> Vec<Message> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
