// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool specs: ordering, failure isolation, team execution.

use ap_board::TaskBoard;
use ap_core::{AgentId, AgentRequest, AgentStatus, PoolConfig};
use ap_pool::test_support::ScriptedRuntime;
use ap_pool::{AgentPool, RuntimeReply};
use std::time::Duration;

#[tokio::test]
async fn parallel_agents_return_in_submission_order() {
    let workspace = tempfile::tempdir().unwrap();
    let mut pool = AgentPool::new(PoolConfig::new(workspace.path()), ScriptedRuntime::new());

    let ids: Vec<AgentId> =
        (0..4).map(|i| pool.submit(AgentRequest::new(format!("task {i}")))).collect();
    let results = pool.run().await;

    assert_eq!(results.len(), 4);
    for (id, result) in ids.iter().zip(&results) {
        assert_eq!(&result.agent_id, id);
        assert_eq!(result.status, AgentStatus::Completed);
    }
}

#[tokio::test]
async fn one_rejected_workspace_does_not_poison_the_rest() {
    let workspace = tempfile::tempdir().unwrap();
    let mut pool = AgentPool::new(PoolConfig::new(workspace.path()), ScriptedRuntime::new());

    pool.submit(AgentRequest::new("bad").with_workspace("/etc"));
    pool.submit(AgentRequest::new("good"));

    let results = pool.run().await;
    assert_eq!(results[0].status, AgentStatus::Error);
    assert!(results[0].error.as_deref().unwrap().contains("workspace rejected"));
    assert_eq!(results[1].status, AgentStatus::Completed);
}

#[tokio::test]
async fn timeouts_are_per_request() {
    let workspace = tempfile::tempdir().unwrap();
    let runtime = ScriptedRuntime::new().with_delay(Duration::from_millis(200));
    let mut pool = AgentPool::new(PoolConfig::new(workspace.path()), runtime);

    pool.submit(AgentRequest::new("slow").with_timeout(Duration::from_millis(50)));
    pool.submit(AgentRequest::new("patient").with_timeout(Duration::from_secs(10)));

    let results = pool.run().await;
    assert_eq!(results[0].status, AgentStatus::Timeout);
    assert_eq!(results[1].status, AgentStatus::Completed);
}

#[tokio::test]
async fn team_drains_the_board_and_exchanges_messages() {
    let workspace = tempfile::tempdir().unwrap();
    let state = tempfile::tempdir().unwrap();

    let runtime = ScriptedRuntime::new().with_handler(|invocation| {
        let server = invocation.coordination.as_ref().unwrap();
        if invocation.agent_id == "lead" {
            server.broadcast_message("tasks are on the board");
            return RuntimeReply::ok("plan issued");
        }

        let mut done = 0;
        loop {
            let claim = server.claim_task();
            let Some(task) = claim.get("task") else {
                break;
            };
            let id = task["id"].as_str().unwrap_or_default().to_string();
            server.complete_task(&id, Some(format!("done by {}", invocation.agent_id)));
            done += 1;
        }
        let _inbox = server.check_messages();
        RuntimeReply::ok(format!("completed {done}"))
    });

    let config = PoolConfig::new(workspace.path()).with_state_dir(state.path());
    let mut pool = AgentPool::new(config, runtime);
    pool.add_tasks(&["alpha", "beta", "gamma", "delta", "epsilon"]).unwrap();

    let results = pool.run_team("coordinate", "drain the board", 3).await.unwrap();

    assert_eq!(results.len(), 4);
    for result in &results {
        assert_eq!(result.status, AgentStatus::Completed);
    }

    let mut board = TaskBoard::open(state.path()).unwrap();
    assert!(board.all_done().unwrap());
    assert_eq!(board.completed_count().unwrap(), 5);

    // No task is still assigned anywhere.
    for task in board.status().unwrap() {
        assert_eq!(task.assigned_to, None);
    }
}
