// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task board specs: claim ordering, dependency gating, stale recovery.

use ap_board::TaskBoard;
use ap_core::{AgentId, TaskStatus};
use std::time::Duration;

#[test]
fn claim_ordering_by_priority_then_creation() {
    let dir = tempfile::tempdir().unwrap();
    let mut board = TaskBoard::open(dir.path()).unwrap();

    let a = board.add("a", &[], 1).unwrap();
    std::thread::sleep(Duration::from_millis(2));
    let b = board.add("b", &[], 5).unwrap();
    std::thread::sleep(Duration::from_millis(2));
    let c = board.add("c", &[], 5).unwrap();

    assert_eq!(board.claim(&AgentId::new("w1")).unwrap().unwrap().id, b);
    assert_eq!(board.claim(&AgentId::new("w2")).unwrap().unwrap().id, c);
    assert_eq!(board.claim(&AgentId::new("w3")).unwrap().unwrap().id, a);
    assert!(board.claim(&AgentId::new("w4")).unwrap().is_none());
}

#[test]
fn dependency_gating_across_handles() {
    let dir = tempfile::tempdir().unwrap();
    let mut adder = TaskBoard::open(dir.path()).unwrap();
    let mut claimer = TaskBoard::open(dir.path()).unwrap();

    let t1 = adder.add("t1", &[], 0).unwrap();
    let t2 = adder.add("t2", std::slice::from_ref(&t1), 0).unwrap();

    assert_eq!(claimer.claim(&AgentId::new("w1")).unwrap().unwrap().id, t1);
    assert!(claimer.claim(&AgentId::new("w1")).unwrap().is_none());

    claimer.complete(&t1, None).unwrap();
    assert_eq!(claimer.claim(&AgentId::new("w1")).unwrap().unwrap().id, t2);
}

#[test]
fn stale_recovery_hands_the_task_to_a_new_worker() {
    let dir = tempfile::tempdir().unwrap();
    let mut w1 = TaskBoard::open(dir.path())
        .unwrap()
        .with_stale_timeout(Duration::from_millis(100));
    let mut w2 = TaskBoard::open(dir.path())
        .unwrap()
        .with_stale_timeout(Duration::from_millis(100));

    let t1 = w1.add("t1", &[], 0).unwrap();
    assert_eq!(w1.claim(&AgentId::new("w1")).unwrap().unwrap().id, t1);

    std::thread::sleep(Duration::from_millis(200));

    let reclaimed = w2.claim(&AgentId::new("w2")).unwrap().unwrap();
    assert_eq!(reclaimed.id, t1);
    assert_eq!(reclaimed.assigned_to, Some(AgentId::new("w2")));
    assert_eq!(reclaimed.status, TaskStatus::InProgress);

    // The original claimer's completion attempt, through its coordination
    // server, is rejected after the sweep.
    let w1_server =
        ap_pool::CoordinationServer::new(AgentId::new("w1"), dir.path(), dir.path(), None).unwrap();
    let reply = w1_server.complete_task(&t1, None);
    assert!(reply["error"].as_str().unwrap().contains("not assigned"));

    // The new owner completes; final state is Completed, assignee null.
    w2.complete(&t1, None).unwrap();
    let task = &w2.status().unwrap()[0];
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.assigned_to, None);
}

#[test]
fn board_survives_reload_field_by_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut board = TaskBoard::open(dir.path()).unwrap();
    let t1 = board.add("keep me", &[], 9).unwrap();
    let _t2 = board.add("and me", std::slice::from_ref(&t1), -3).unwrap();
    board.claim(&AgentId::new("w1")).unwrap().unwrap();

    let before = board.status().unwrap();
    let after = TaskBoard::open(dir.path()).unwrap().status().unwrap();
    assert_eq!(before, after);
}
