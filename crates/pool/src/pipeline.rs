// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequential prompt pipelines with textual handoff.
//!
//! Each stage runs as a single-agent pool against the shared workspace, so
//! files written by one stage are visible to the next. The previous
//! stage's response feeds the next prompt, either through the literal
//! `{previous_response}` placeholder or appended as a context block. A
//! stage that ends in Error or Timeout stops the pipeline.

use crate::pool::AgentPool;
use crate::runtime::AgentRuntime;
use ap_core::{AgentRequest, AgentResult, PoolConfig, SandboxKind};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Placeholder substituted with the previous stage's response.
pub const PREVIOUS_RESPONSE: &str = "{previous_response}";

/// Text transform applied to a stage's incoming previous response.
pub type Transform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// One pipeline stage: a prompt template plus per-stage overrides.
#[derive(Clone)]
pub struct Stage {
    pub name: String,
    pub prompt: String,
    pub model: Option<String>,
    pub sandbox: Option<SandboxKind>,
    pub system_prompt: Option<String>,
    pub timeout: Option<Duration>,
    /// Applied to the previous response before substitution
    pub transform: Option<Transform>,
}

impl Stage {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            model: None,
            sandbox: None,
            system_prompt: None,
            timeout: None,
            transform: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_sandbox(mut self, kind: SandboxKind) -> Self {
        self.sandbox = Some(kind);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_transform(
        mut self,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("prompt", &self.prompt)
            .field("model", &self.model)
            .field("sandbox", &self.sandbox)
            .field("timeout", &self.timeout)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Result of one executed stage.
#[derive(Debug, Clone)]
pub struct StageResult {
    pub stage: String,
    pub result: AgentResult,
}

/// Outcome of a pipeline run; `stages` holds only the stages that actually
/// executed.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub stages: Vec<StageResult>,
    /// True iff every stage ran and completed
    pub success: bool,
    /// Response text of the last executed stage
    pub final_response: String,
    /// Sum of executed stage durations
    pub total_duration_secs: f64,
}

/// Ordered stages over a shared workspace.
pub struct Pipeline<R: AgentRuntime> {
    stages: Vec<Stage>,
    workspace: PathBuf,
    config: PoolConfig,
    runtime: Arc<R>,
}

impl<R: AgentRuntime> Pipeline<R> {
    pub fn new(
        workspace: impl Into<PathBuf>,
        config: PoolConfig,
        runtime: impl Into<Arc<R>>,
    ) -> Self {
        Self { stages: Vec::new(), workspace: workspace.into(), config, runtime: runtime.into() }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Execute the stages strictly in order, stopping at the first stage
    /// that does not complete.
    pub async fn run(&self) -> PipelineResult {
        let mut results: Vec<StageResult> = Vec::new();
        let mut prev = String::new();
        let mut success = true;

        for (index, stage) in self.stages.iter().enumerate() {
            let prompt = if index == 0 {
                // First stage: template as-is, no transform, no substitution.
                stage.prompt.clone()
            } else {
                let handed_off = match &stage.transform {
                    Some(transform) => transform(&prev),
                    None => prev.clone(),
                };
                compose_prompt(&stage.prompt, &handed_off)
            };

            tracing::info!(stage = %stage.name, index, "pipeline stage starting");
            let result = self.run_stage(index, stage, prompt).await;

            prev = result.response.clone();
            let completed = result.is_completed();
            results.push(StageResult { stage: stage.name.clone(), result });

            if !completed {
                tracing::warn!(stage = %stage.name, "pipeline stopped at failed stage");
                success = false;
                break;
            }
        }

        PipelineResult {
            success,
            final_response: results.last().map(|r| r.result.response.clone()).unwrap_or_default(),
            total_duration_secs: results.iter().map(|r| r.result.duration_secs).sum(),
            stages: results,
        }
    }

    /// One stage = one single-request pool run over the shared workspace.
    async fn run_stage(&self, index: usize, stage: &Stage, prompt: String) -> AgentResult {
        let mut config = self.config.clone();
        config.workspace = self.workspace.clone();
        config.max_agents = 1;

        let mut request = AgentRequest::new(prompt)
            .with_agent_id(format!("stage-{}-{}", index + 1, stage.name));
        if let Some(model) = &stage.model {
            request = request.with_model(model.clone());
        }
        if let Some(kind) = stage.sandbox {
            request = request.with_sandbox(kind);
        }
        if let Some(system_prompt) = &stage.system_prompt {
            request = request.with_system_prompt(system_prompt.clone());
        }
        if let Some(timeout) = stage.timeout {
            request = request.with_timeout(timeout);
        }

        let mut pool = AgentPool::<R>::new(config, self.runtime.clone());
        let agent_id = pool.submit(request);
        let mut results = pool.run().await;
        match results.pop() {
            Some(result) => result,
            // A submitted request always yields a result; guard anyway.
            None => AgentResult::error(agent_id, self.config.default_model.clone(), "stage produced no result"),
        }
    }
}

/// Compose the final stage prompt from the template and the (possibly
/// transformed) previous response.
pub(crate) fn compose_prompt(template: &str, prev: &str) -> String {
    if template.contains(PREVIOUS_RESPONSE) {
        template.replace(PREVIOUS_RESPONSE, prev)
    } else if !prev.is_empty() {
        format!("{template}\n\n## Context from previous stage\n{prev}")
    } else {
        template.to_string()
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
