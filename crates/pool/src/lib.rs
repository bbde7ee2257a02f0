// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ap-pool: the bounded agent orchestrator.
//!
//! Composes the board, journal, and sandbox crates into three execution
//! shapes: independent parallel agents, coordinated teams sharing a task
//! board and messages, and sequential pipelines with textual handoff.

pub mod bus;
pub mod coordination;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod pool;
mod runner;
pub mod runtime;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use bus::MessageBus;
pub use coordination::CoordinationServer;
pub use error::PoolError;
pub use pipeline::{Pipeline, PipelineResult, Stage, StageResult};
pub use pool::{AgentPool, PoolEvent};
pub use runtime::{AgentRuntime, RuntimeInvocation, RuntimeReply, RuntimeStatus};
