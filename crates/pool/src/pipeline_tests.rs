// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::runtime::RuntimeReply;
use crate::test_support::ScriptedRuntime;
use ap_core::{AgentId, AgentStatus};

#[test]
fn compose_substitutes_every_placeholder_occurrence() {
    let composed = compose_prompt("Check {previous_response}; then {previous_response}.", "Tokyo");
    assert_eq!(composed, "Check Tokyo; then Tokyo.");
}

#[test]
fn compose_appends_context_without_placeholder() {
    let composed = compose_prompt("Summarize.", "stage one said things");
    assert_eq!(composed, "Summarize.\n\n## Context from previous stage\nstage one said things");
}

#[test]
fn compose_with_empty_prev_is_the_template() {
    assert_eq!(compose_prompt("Just do it.", ""), "Just do it.");
}

#[test]
fn compose_with_placeholder_and_empty_prev_blanks_it() {
    assert_eq!(compose_prompt("Data: {previous_response}", ""), "Data: ");
}

#[tokio::test]
async fn handoff_feeds_each_stage_the_previous_response() {
    let workspace = tempfile::tempdir().unwrap();
    let runtime = ScriptedRuntime::new()
        .with_reply(RuntimeReply::ok("Tokyo"))
        .with_reply(RuntimeReply::ok("37 million"));

    let pipeline = Pipeline::new(workspace.path(), PoolConfig::new(workspace.path()), runtime)
        .with_stage(Stage::new("pick", "Name a city: Tokyo."))
        .with_stage(Stage::new("lookup", "Population of {previous_response}?"));

    let result = pipeline.run().await;

    assert!(result.success);
    assert_eq!(result.final_response, "37 million");
    assert_eq!(result.stages.len(), 2);

    let prompts: Vec<String> =
        pipeline.runtime.invocations().iter().map(|i| i.prompt.clone()).collect();
    assert_eq!(prompts, ["Name a city: Tokyo.", "Population of Tokyo?"]);
}

#[tokio::test]
async fn transform_applies_before_substitution() {
    let workspace = tempfile::tempdir().unwrap();
    let runtime = ScriptedRuntime::new()
        .with_reply(RuntimeReply::ok("  Tokyo  "))
        .with_reply(RuntimeReply::ok("done"));

    let pipeline = Pipeline::new(workspace.path(), PoolConfig::new(workspace.path()), runtime)
        .with_stage(Stage::new("pick", "Name a city."))
        .with_stage(
            Stage::new("lookup", "Population of {previous_response}?")
                .with_transform(|prev| prev.trim().to_string()),
        );

    pipeline.run().await;
    let prompts: Vec<String> =
        pipeline.runtime.invocations().iter().map(|i| i.prompt.clone()).collect();
    assert_eq!(prompts[1], "Population of Tokyo?");
}

#[tokio::test]
async fn failed_stage_stops_the_pipeline() {
    let workspace = tempfile::tempdir().unwrap();
    let runtime = ScriptedRuntime::new()
        .with_reply(RuntimeReply::ok("fine"))
        .with_reply(RuntimeReply::error("stage two broke"));

    let pipeline = Pipeline::new(workspace.path(), PoolConfig::new(workspace.path()), runtime)
        .with_stage(Stage::new("one", "a"))
        .with_stage(Stage::new("two", "b"))
        .with_stage(Stage::new("three", "c"));

    let result = pipeline.run().await;

    assert!(!result.success);
    assert_eq!(result.stages.len(), 2);
    assert_eq!(result.stages[1].result.status, AgentStatus::Error);
    // Stage three never ran.
    assert_eq!(pipeline.runtime.invocations().len(), 2);
}

#[tokio::test]
async fn stage_overrides_reach_the_request() {
    let workspace = tempfile::tempdir().unwrap();
    let runtime = ScriptedRuntime::new();

    let pipeline = Pipeline::new(workspace.path(), PoolConfig::new(workspace.path()), runtime)
        .with_stage(
            Stage::new("special", "p")
                .with_model("m-exotic")
                .with_system_prompt("terse")
                .with_timeout(Duration::from_secs(5)),
        );

    let result = pipeline.run().await;
    assert!(result.success);

    let invocations = pipeline.runtime.invocations();
    assert_eq!(invocations[0].model, "m-exotic");
    assert_eq!(invocations[0].system_prompt.as_deref(), Some("terse"));
    assert_eq!(invocations[0].agent_id, AgentId::new("stage-1-special"));
}

#[tokio::test(flavor = "multi_thread")]
async fn stages_share_the_workspace_filesystem() {
    let workspace = tempfile::tempdir().unwrap();

    // Stage one writes a file through its sandbox; stage two reads it.
    let runtime = ScriptedRuntime::new().with_handler(|invocation| {
        let sandbox = invocation.sandbox.clone();
        let command = if invocation.prompt.starts_with("write") {
            "echo handoff > note.txt"
        } else {
            "cat note.txt"
        };
        let result = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                sandbox.lock().await.exec(command, Duration::from_secs(5)).await
            })
        });
        match result {
            Ok(exec) if exec.ok() => RuntimeReply::ok(exec.stdout.trim().to_string()),
            Ok(exec) => RuntimeReply::error(exec.stderr),
            Err(e) => RuntimeReply::error(e.to_string()),
        }
    });

    let pipeline = Pipeline::new(workspace.path(), PoolConfig::new(workspace.path()), runtime)
        .with_stage(Stage::new("writer", "write the note"))
        .with_stage(Stage::new("reader", "read the note"));

    let result = pipeline.run().await;
    assert!(result.success, "{:?}", result.stages.last().map(|s| &s.result.error));
    assert_eq!(result.final_response, "handoff");
}

#[tokio::test]
async fn empty_pipeline_is_a_successful_noop() {
    let workspace = tempfile::tempdir().unwrap();
    let pipeline: Pipeline<ScriptedRuntime> =
        Pipeline::new(workspace.path(), PoolConfig::new(workspace.path()), ScriptedRuntime::new());

    let result = pipeline.run().await;
    assert!(result.success);
    assert!(result.stages.is_empty());
    assert_eq!(result.final_response, "");
    assert_eq!(result.total_duration_secs, 0.0);
}
