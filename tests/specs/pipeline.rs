// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline specs: handoff, failure policy, prompt composition.

use ap_core::{AgentStatus, PoolConfig};
use ap_pool::test_support::ScriptedRuntime;
use ap_pool::{Pipeline, RuntimeReply, Stage};
use std::sync::Arc;

#[tokio::test]
async fn two_stage_handoff_substitutes_the_response() {
    let workspace = tempfile::tempdir().unwrap();
    let runtime = Arc::new(
        ScriptedRuntime::new()
            .with_reply(RuntimeReply::ok("Tokyo"))
            .with_reply(RuntimeReply::ok("about 37 million")),
    );

    let pipeline =
        Pipeline::<ScriptedRuntime>::new(workspace.path(), PoolConfig::new(workspace.path()), runtime.clone())
            .with_stage(Stage::new("pick", "Name a city: Tokyo."))
            .with_stage(Stage::new("population", "Population of {previous_response}?"));

    let result = pipeline.run().await;
    assert!(result.success);
    assert_eq!(result.stages.len(), 2);
    assert_eq!(result.final_response, "about 37 million");

    let prompts: Vec<String> =
        runtime.invocations().iter().map(|i| i.prompt.clone()).collect();
    assert_eq!(prompts, ["Name a city: Tokyo.", "Population of Tokyo?"]);
}

#[tokio::test]
async fn failing_stage_truncates_the_run() {
    let workspace = tempfile::tempdir().unwrap();
    let runtime = Arc::new(
        ScriptedRuntime::new()
            .with_reply(RuntimeReply::ok("ok"))
            .with_reply(RuntimeReply::error("no such city")),
    );

    let pipeline =
        Pipeline::<ScriptedRuntime>::new(workspace.path(), PoolConfig::new(workspace.path()), runtime.clone())
            .with_stage(Stage::new("one", "a"))
            .with_stage(Stage::new("two", "b"))
            .with_stage(Stage::new("three", "c"))
            .with_stage(Stage::new("four", "d"));

    let result = pipeline.run().await;
    assert!(!result.success);
    assert_eq!(result.stages.len(), 2);
    assert_eq!(result.stages[1].result.status, AgentStatus::Error);
    // Stages three and four never started.
    assert_eq!(runtime.invocations().len(), 2);
}

#[tokio::test]
async fn durations_accumulate_across_stages() {
    let workspace = tempfile::tempdir().unwrap();

    let pipeline = Pipeline::new(
        workspace.path(),
        PoolConfig::new(workspace.path()),
        ScriptedRuntime::new(),
    )
    .with_stage(Stage::new("one", "a"))
    .with_stage(Stage::new("two", "b"));

    let result = pipeline.run().await;
    assert!(result.success);
    let sum: f64 = result.stages.iter().map(|s| s.result.duration_secs).sum();
    assert_eq!(result.total_duration_secs, sum);
}
