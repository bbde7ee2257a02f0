// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared task board with priority, dependency, and stale-claim semantics.
//!
//! File-backed boards are safe across OS processes: every operation
//! acquires the advisory lock on `taskboard.lock`, reloads
//! `taskboard.json`, mutates, and writes back before releasing. Claim is
//! therefore totally ordered across processes; two concurrent claimers can
//! never be handed the same task. Without a state directory the board is a
//! plain single-process structure with no locking or I/O.

use crate::error::BoardError;
use crate::lock::{ExclusiveLock, SharedLock};
use ap_core::{AgentId, BoardTask, Clock, SystemClock, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Board state file, a single `{"tasks": [...]}` object.
pub const BOARD_FILE: &str = "taskboard.json";
/// Advisory-lock peer of [`BOARD_FILE`]; empty, never read.
pub const BOARD_LOCK_FILE: &str = "taskboard.lock";

#[derive(Debug, Default, Serialize, Deserialize)]
struct BoardFile {
    tasks: Vec<BoardTask>,
}

/// Prioritised work queue shared by agents, optionally across processes.
#[derive(Debug)]
pub struct TaskBoard<C: Clock = SystemClock> {
    tasks: Vec<BoardTask>,
    state_dir: Option<PathBuf>,
    stale_timeout: Option<Duration>,
    clock: C,
}

impl TaskBoard<SystemClock> {
    /// Single-process board with no persistence.
    pub fn in_memory() -> Self {
        Self::in_memory_with_clock(SystemClock)
    }

    /// File-backed board in `state_dir`, creating the directory and loading
    /// any existing `taskboard.json`.
    pub fn open(state_dir: impl Into<PathBuf>) -> Result<Self, BoardError> {
        Self::open_with_clock(state_dir, SystemClock)
    }
}

impl<C: Clock> TaskBoard<C> {
    pub fn in_memory_with_clock(clock: C) -> Self {
        Self { tasks: Vec::new(), state_dir: None, stale_timeout: None, clock }
    }

    pub fn open_with_clock(state_dir: impl Into<PathBuf>, clock: C) -> Result<Self, BoardError> {
        let state_dir = state_dir.into();
        std::fs::create_dir_all(&state_dir)?;
        let mut board =
            Self { tasks: Vec::new(), state_dir: Some(state_dir), stale_timeout: None, clock };
        board.refresh()?;
        Ok(board)
    }

    /// Enable the stale sweep: InProgress tasks whose claim is at least this
    /// old are returned to Pending during the next claim.
    pub fn with_stale_timeout(mut self, timeout: Duration) -> Self {
        self.stale_timeout = Some(timeout);
        self
    }

    /// Current in-memory snapshot without reloading from disk.
    pub fn tasks(&self) -> &[BoardTask] {
        &self.tasks
    }

    /// Create a Pending task and return its id (8 hex characters).
    pub fn add(
        &mut self,
        description: &str,
        depends_on: &[String],
        priority: i64,
    ) -> Result<String, BoardError> {
        let guard = self.lock_exclusive()?;
        self.reload_locked()?;

        let id = self.fresh_id();
        let task = BoardTask::new(
            id.clone(),
            description,
            depends_on.to_vec(),
            priority,
            self.clock.epoch_secs(),
        );
        self.tasks.push(task);
        self.persist(guard.as_ref())?;
        tracing::debug!(task = %id, priority, "task added");
        Ok(id)
    }

    /// Atomically claim the best eligible Pending task for `agent`.
    ///
    /// Runs the stale sweep first, then selects among Pending tasks whose
    /// dependencies all exist and are Completed, ordered by priority
    /// descending then created_at ascending. Returns None when nothing is
    /// eligible.
    pub fn claim(&mut self, agent: &AgentId) -> Result<Option<BoardTask>, BoardError> {
        let guard = self.lock_exclusive()?;
        self.reload_locked()?;
        self.sweep_stale();

        let best = {
            let completed: HashSet<&str> = self
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .map(|t| t.id.as_str())
                .collect();

            let mut best: Option<usize> = None;
            for (i, task) in self.tasks.iter().enumerate() {
                if task.status != TaskStatus::Pending {
                    continue;
                }
                // An unknown dependency id never appears in the completed
                // set, so it blocks the claim like an unfinished one.
                if !task.depends_on.iter().all(|d| completed.contains(d.as_str())) {
                    continue;
                }
                best = match best {
                    None => Some(i),
                    Some(j) => {
                        let cur = &self.tasks[j];
                        if task.priority > cur.priority
                            || (task.priority == cur.priority && task.created_at < cur.created_at)
                        {
                            Some(i)
                        } else {
                            Some(j)
                        }
                    }
                };
            }
            best
        };

        let chosen = best.map(|i| {
            let now = self.clock.epoch_secs();
            let task = &mut self.tasks[i];
            task.status = TaskStatus::InProgress;
            task.assigned_to = Some(agent.clone());
            task.claimed_at = Some(now);
            task.clone()
        });

        // The stale sweep may have mutated state even when nothing was
        // claimable, so always write back.
        self.persist(guard.as_ref())?;

        match &chosen {
            Some(task) => tracing::info!(task = %task.id, agent = %agent, "task claimed"),
            None => tracing::debug!(agent = %agent, "no claimable task"),
        }
        Ok(chosen)
    }

    /// Transition an InProgress task to Completed.
    pub fn complete(&mut self, id: &str, result: Option<String>) -> Result<(), BoardError> {
        self.finish(id, TaskStatus::Completed, result, "complete")
    }

    /// Transition an InProgress task to Failed, storing the error as result.
    pub fn fail(&mut self, id: &str, error: &str) -> Result<(), BoardError> {
        self.finish(id, TaskStatus::Failed, Some(error.to_string()), "fail")
    }

    /// Return an InProgress task to Pending, clearing its claim.
    pub fn release(&mut self, id: &str) -> Result<(), BoardError> {
        let guard = self.lock_exclusive()?;
        self.reload_locked()?;

        let task = self.task_mut(id)?;
        if task.status != TaskStatus::InProgress {
            return Err(BoardError::InvalidTransition {
                id: id.to_string(),
                status: task.status,
                op: "release",
            });
        }
        task.status = TaskStatus::Pending;
        task.assigned_to = None;
        task.claimed_at = None;
        self.persist(guard.as_ref())?;
        tracing::info!(task = %id, "task released");
        Ok(())
    }

    /// Release every InProgress task assigned to `agent`; returns their ids.
    pub fn release_agent_tasks(&mut self, agent: &AgentId) -> Result<Vec<String>, BoardError> {
        let guard = self.lock_exclusive()?;
        self.reload_locked()?;

        let mut released = Vec::new();
        for task in &mut self.tasks {
            if task.status == TaskStatus::InProgress && task.assigned_to.as_ref() == Some(agent) {
                task.status = TaskStatus::Pending;
                task.assigned_to = None;
                task.claimed_at = None;
                released.push(task.id.clone());
            }
        }
        if !released.is_empty() {
            self.persist(guard.as_ref())?;
            tracing::info!(agent = %agent, count = released.len(), "agent tasks released");
        }
        Ok(released)
    }

    /// Snapshot of every task, reloaded from disk when file-backed.
    pub fn status(&mut self) -> Result<Vec<BoardTask>, BoardError> {
        self.refresh()?;
        Ok(self.tasks.clone())
    }

    pub fn pending_count(&mut self) -> Result<usize, BoardError> {
        self.refresh()?;
        Ok(self.tasks.iter().filter(|t| t.status == TaskStatus::Pending).count())
    }

    pub fn completed_count(&mut self) -> Result<usize, BoardError> {
        self.refresh()?;
        Ok(self.tasks.iter().filter(|t| t.status == TaskStatus::Completed).count())
    }

    /// True when no task is Pending or InProgress.
    pub fn all_done(&mut self) -> Result<bool, BoardError> {
        self.refresh()?;
        Ok(self
            .tasks
            .iter()
            .all(|t| !matches!(t.status, TaskStatus::Pending | TaskStatus::InProgress)))
    }

    fn finish(
        &mut self,
        id: &str,
        terminal: TaskStatus,
        result: Option<String>,
        op: &'static str,
    ) -> Result<(), BoardError> {
        let guard = self.lock_exclusive()?;
        self.reload_locked()?;

        let now = self.clock.epoch_secs();
        let task = self.task_mut(id)?;
        if task.status != TaskStatus::InProgress {
            return Err(BoardError::InvalidTransition {
                id: id.to_string(),
                status: task.status,
                op,
            });
        }
        task.status = terminal;
        task.result = result;
        task.completed_at = Some(now);
        task.assigned_to = None;
        self.persist(guard.as_ref())?;
        tracing::info!(task = %id, status = %terminal, "task finished");
        Ok(())
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut BoardTask, BoardError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| BoardError::TaskNotFound(id.to_string()))
    }

    fn fresh_id(&self) -> String {
        loop {
            let uuid = Uuid::new_v4().simple().to_string();
            let id = uuid[..8].to_string();
            if !self.tasks.iter().any(|t| t.id == id) {
                return id;
            }
        }
    }

    /// Sweep InProgress tasks whose claim has outlived `stale_timeout` back
    /// to Pending. Caller must hold the exclusive lock when file-backed.
    fn sweep_stale(&mut self) {
        let Some(stale) = self.stale_timeout else {
            return;
        };
        let now = self.clock.epoch_secs();
        for task in &mut self.tasks {
            if task.status != TaskStatus::InProgress {
                continue;
            }
            let Some(claimed_at) = task.claimed_at else {
                continue;
            };
            if now - claimed_at >= stale.as_secs_f64() {
                tracing::warn!(
                    task = %task.id,
                    agent = ?task.assigned_to,
                    "stale claim swept back to pending"
                );
                task.status = TaskStatus::Pending;
                task.assigned_to = None;
                task.claimed_at = None;
            }
        }
    }

    fn board_path(&self) -> Option<PathBuf> {
        self.state_dir.as_ref().map(|d| d.join(BOARD_FILE))
    }

    fn lock_path(&self) -> Option<PathBuf> {
        self.state_dir.as_ref().map(|d| d.join(BOARD_LOCK_FILE))
    }

    /// Acquire the exclusive lock when file-backed; None in memory mode.
    fn lock_exclusive(&self) -> Result<Option<ExclusiveLock>, BoardError> {
        match self.lock_path() {
            Some(path) => Ok(Some(ExclusiveLock::acquire(&path)?)),
            None => Ok(None),
        }
    }

    /// Reload from disk under a shared lock (observer path).
    fn refresh(&mut self) -> Result<(), BoardError> {
        if let Some(lock_path) = self.lock_path() {
            let _guard = SharedLock::acquire(&lock_path)?;
            self.reload_locked()?;
        }
        Ok(())
    }

    /// Replace the in-memory snapshot from disk. Caller holds a lock.
    fn reload_locked(&mut self) -> Result<(), BoardError> {
        let Some(path) = self.board_path() else {
            return Ok(());
        };
        if !path.exists() {
            self.tasks.clear();
            return Ok(());
        }
        let raw = std::fs::read_to_string(&path)?;
        let file: BoardFile = serde_json::from_str(&raw)?;
        self.tasks = file.tasks;
        Ok(())
    }

    /// Write the full board. The guard reference proves the caller already
    /// holds the exclusive lock; in-memory boards pass None and skip I/O.
    fn persist(&self, guard: Option<&ExclusiveLock>) -> Result<(), BoardError> {
        let (Some(path), Some(_held)) = (self.board_path(), guard) else {
            return Ok(());
        };
        let file = BoardFile { tasks: self.tasks.clone() };
        std::fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod tests;
