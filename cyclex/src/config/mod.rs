/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Task-set loading.
//!
//! A task file is JSON or YAML (picked by extension) with one top-level
//! `tasks` list:
//! ```yaml
//! tasks:
//!   - id: sensor_poll
//!     period: 4
//!     execution_time: 1
//!     priority: 2
//!   - id: control_loop
//!     period: 20
//!     execution_time: 5
//! ```
//!
//! Older files use `tarefas` / `periodo` / `tempo_execucao` / `prioridade`;
//! those names are accepted as aliases.  `priority` defaults to `0`, and `id`
//! may be a string or an integer.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{InvalidInput, PlanError};
use crate::task::Task;

// ── Private deserialization types ─────────────────────────────────────────────

/// Top-level wrapper that maps directly onto the file layout.
#[derive(Debug, Deserialize)]
struct TaskSetFile {
    #[serde(default, alias = "tarefas")]
    tasks: Option<Vec<TaskEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskId {
    Text(String),
    Number(i64),
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        match id {
            TaskId::Text(s) => s,
            TaskId::Number(n) => n.to_string(),
        }
    }
}

/// Per-task fields as they appear in the file.
///
/// Times are read as signed integers so a negative value surfaces as
/// [`InvalidInput`] rather than a generic parse error.
#[derive(Debug, Deserialize)]
struct TaskEntry {
    id: TaskId,
    #[serde(alias = "periodo")]
    period: i64,
    #[serde(alias = "tempo_execucao")]
    execution_time: i64,
    #[serde(default, alias = "prioridade")]
    priority: i64,
}

impl TryFrom<TaskEntry> for Task {
    type Error = InvalidInput;

    fn try_from(entry: TaskEntry) -> std::result::Result<Self, Self::Error> {
        let id = String::from(entry.id);
        let period = u64::try_from(entry.period)
            .ok()
            .filter(|&p| p > 0)
            .ok_or_else(|| InvalidInput::NonPositivePeriod { task: id.clone() })?;
        let execution_time = u64::try_from(entry.execution_time)
            .ok()
            .filter(|&e| e > 0)
            .ok_or_else(|| InvalidInput::NonPositiveExecutionTime { task: id.clone() })?;
        Ok(Task::new(id, period, execution_time, entry.priority))
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Serialisation format of a task file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFileFormat {
    Json,
    Yaml,
}

impl TaskFileFormat {
    /// `.yaml` / `.yml` (any case) is YAML; everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => TaskFileFormat::Yaml,
            _ => TaskFileFormat::Json,
        }
    }
}

/// Read and parse the task file at `path`.
///
/// # Errors
/// Returns an error if the file cannot be opened, is not valid JSON/YAML,
/// lacks the `tasks` key, or holds a task with a non-positive time.
pub fn load_task_set(path: &Path) -> Result<Vec<Task>> {
    info!("Loading task set from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open task file: {}", path.display()))?;

    let tasks = parse_task_set(&content, TaskFileFormat::from_path(path))
        .with_context(|| format!("Invalid task file: {}", path.display()))?;

    info!("Loaded {} task(s)", tasks.len());
    Ok(tasks)
}

/// Parse a task set from an in-memory document.
pub fn parse_task_set(content: &str, format: TaskFileFormat) -> Result<Vec<Task>> {
    let file: TaskSetFile = match format {
        TaskFileFormat::Json => serde_json::from_str(content).context("Failed to parse JSON")?,
        TaskFileFormat::Yaml => serde_yaml::from_str(content).context("Failed to parse YAML")?,
    };

    let entries = file
        .tasks
        .ok_or_else(|| anyhow!("document does not contain a 'tasks' key"))?;

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| -> Result<Task> {
            let task = Task::try_from(entry)
                .map_err(PlanError::from)
                .with_context(|| format!("task entry {}", i + 1))?;
            debug!(
                "  Task: {} | period: {} | execution: {} | priority: {}",
                task.id, task.period, task.execution_time, task.priority
            );
            Ok(task)
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
