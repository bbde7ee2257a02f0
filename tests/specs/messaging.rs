// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messaging specs: in-process bus and cross-process journal.

use ap_board::MessageJournal;
use ap_core::AgentId;
use ap_pool::MessageBus;
use std::time::Duration;

#[tokio::test]
async fn bus_broadcast_excludes_sender() {
    let bus = MessageBus::new();
    for id in ["a", "b", "c"] {
        bus.register(&AgentId::new(id));
    }

    bus.broadcast(&AgentId::new("a"), "hi");

    assert!(bus.receive(&AgentId::new("a"), Duration::ZERO).await.is_empty());
    for id in ["b", "c"] {
        let messages = bus.receive(&AgentId::new(id), Duration::ZERO).await;
        assert_eq!(messages.len(), 1, "{id} should see exactly one message");
        assert_eq!(messages[0].from, AgentId::new("a"));
        assert_eq!(messages[0].content, "hi");
    }
}

#[tokio::test]
async fn bus_message_visible_only_after_receive() {
    let bus = MessageBus::new();
    bus.register(&AgentId::new("a"));
    bus.register(&AgentId::new("b"));

    bus.send(&AgentId::new("a"), &AgentId::new("b"), "ping");
    // The send returned; the very next receive observes it.
    let messages = bus.receive(&AgentId::new("b"), Duration::ZERO).await;
    assert_eq!(messages.len(), 1);
}

#[test]
fn journal_flows_between_independent_handles() {
    let dir = tempfile::tempdir().unwrap();
    let lead = MessageJournal::open(dir.path()).unwrap();
    let mut w1 = MessageJournal::open(dir.path()).unwrap();
    let mut w2 = MessageJournal::open(dir.path()).unwrap();

    lead.broadcast(&AgentId::new("lead"), "board is seeded").unwrap();
    lead.send(&AgentId::new("lead"), "w1", "take the parser").unwrap();

    let w1_messages = w1.check(&AgentId::new("w1")).unwrap();
    assert_eq!(w1_messages.len(), 2);

    let w2_messages = w2.check(&AgentId::new("w2")).unwrap();
    assert_eq!(w2_messages.len(), 1);
    assert_eq!(w2_messages[0].content, "board is seeded");

    // Cursors advanced: nothing new on a second check.
    assert!(w1.check(&AgentId::new("w1")).unwrap().is_empty());
    assert!(w2.check(&AgentId::new("w2")).unwrap().is_empty());
}
