// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn direct_message_addressing() {
    let msg = Message::new(AgentId::new("a"), "b", "hi", 1.0);
    assert!(!msg.is_broadcast());
    assert!(msg.addressed_to(&AgentId::new("b")));
    assert!(!msg.addressed_to(&AgentId::new("c")));
    assert!(!msg.addressed_to(&AgentId::new("a")));
}

#[test]
fn broadcast_excludes_sender() {
    let msg = Message::new(AgentId::new("a"), BROADCAST, "hi", 1.0);
    assert!(msg.is_broadcast());
    assert!(msg.addressed_to(&AgentId::new("b")));
    assert!(msg.addressed_to(&AgentId::new("c")));
    assert!(!msg.addressed_to(&AgentId::new("a")));
}

#[test]
fn message_serde_field_names() {
    let msg = Message::new(AgentId::new("a"), "*", "status?", 12.5);
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value["from"], "a");
    assert_eq!(value["to"], "*");
    assert_eq!(value["content"], "status?");
    assert_eq!(value["timestamp"], 12.5);

    let parsed: Message = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, msg);
}
