/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task data structure for the cyclic-executive planner.
//!
//! ```text
//! task file ──(loader)──►  Task  ──(calculator, packer)──►  Frame / Schedule
//!                           ↑ immutable                         ↑ borrows &Task
//! ```
//!
//! # Ownership model
//! A `Vec<Task>` is built once by the loader and never mutated afterwards.
//! The calculator reads it, and the packer borrows each `Task` into the
//! frames it builds, so a [`Schedule`](crate::packer::Schedule) holds
//! references, never copies.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{InvalidInput, PlanError};

// ── Task ──────────────────────────────────────────────────────────────────────

/// One periodic unit of work.
///
/// All times are in the same abstract integer time unit; the planner never
/// interprets them as milliseconds or microseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Unique identifier within a task set.
    pub id: String,

    /// Maximum allowed spacing between consecutive starts.
    pub period: u64,

    /// Worst-case time consumed by one execution.
    pub execution_time: u64,

    /// Sort key only; higher runs earlier within a selection pass.
    pub priority: i64,
}

impl Task {
    pub fn new(id: impl Into<String>, period: u64, execution_time: u64, priority: i64) -> Self {
        Self {
            id: id.into(),
            period,
            execution_time,
            priority,
        }
    }

    /// CPU utilisation fraction: `execution_time / period`.
    ///
    /// Returns `0.0` when `period` is zero to avoid division by zero.
    pub fn utilization(&self) -> f64 {
        if self.period == 0 {
            0.0
        } else {
            self.execution_time as f64 / self.period as f64
        }
    }

    /// Fewest runs this task needs in a major cycle of `primary_cycle`.
    pub fn jobs_per_cycle(&self, primary_cycle: u64) -> u64 {
        if self.period == 0 {
            0
        } else {
            primary_cycle / self.period
        }
    }

    /// Check the per-task constraints: positive period and execution time,
    /// and `execution_time ≤ period`.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if self.period == 0 {
            return Err(InvalidInput::NonPositivePeriod {
                task: self.id.clone(),
            });
        }
        if self.execution_time == 0 {
            return Err(InvalidInput::NonPositiveExecutionTime {
                task: self.id.clone(),
            });
        }
        if self.execution_time > self.period {
            return Err(InvalidInput::ExecutionExceedsPeriod {
                task: self.id.clone(),
                execution_time: self.execution_time,
                period: self.period,
            });
        }
        Ok(())
    }
}

/// Validate a whole task set: non-empty, unique ids, every task valid.
///
/// The first problem found is returned; tasks are checked in input order.
pub fn validate_task_set(tasks: &[Task]) -> Result<(), PlanError> {
    if tasks.is_empty() {
        return Err(InvalidInput::NoTasks.into());
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(tasks.len());
    for task in tasks {
        task.validate()?;
        if !seen.insert(task.id.as_str()) {
            return Err(InvalidInput::DuplicateTaskId {
                task: task.id.clone(),
            }
            .into());
        }
    }
    Ok(())
}

/// Sum of the per-task utilisations.  `> 1.0` means no single-CPU schedule
/// can exist.
pub fn total_utilization(tasks: &[Task]) -> f64 {
    tasks.iter().map(Task::utilization).sum()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_utilization_is_correct() {
        let task = Task::new("t", 10, 1, 0);
        assert!((task.utilization() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn task_utilization_zero_period_returns_zero() {
        let task = Task::new("t", 0, 1, 0);
        assert_eq!(task.utilization(), 0.0);
    }

    #[test]
    fn jobs_per_cycle_counts_releases() {
        let task = Task::new("t", 4, 1, 0);
        assert_eq!(task.jobs_per_cycle(20), 5);
        assert_eq!(Task::new("z", 0, 1, 0).jobs_per_cycle(20), 0);
    }

    #[test]
    fn validate_rejects_zero_period() {
        let err = Task::new("t", 0, 1, 0).validate().unwrap_err();
        assert_eq!(err, InvalidInput::NonPositivePeriod { task: "t".into() });
    }

    #[test]
    fn validate_rejects_zero_execution_time() {
        let err = Task::new("t", 5, 0, 0).validate().unwrap_err();
        assert_eq!(
            err,
            InvalidInput::NonPositiveExecutionTime { task: "t".into() }
        );
    }

    #[test]
    fn validate_rejects_execution_longer_than_period() {
        let err = Task::new("t", 5, 6, 0).validate().unwrap_err();
        assert!(matches!(
            err,
            InvalidInput::ExecutionExceedsPeriod {
                execution_time: 6,
                period: 5,
                ..
            }
        ));
    }

    #[test]
    fn execution_equal_to_period_is_valid() {
        assert!(Task::new("t", 5, 5, 0).validate().is_ok());
    }

    #[test]
    fn empty_task_set_is_rejected() {
        assert_eq!(
            validate_task_set(&[]).unwrap_err(),
            PlanError::InvalidInput(InvalidInput::NoTasks)
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let tasks = vec![Task::new("a", 4, 1, 0), Task::new("a", 5, 1, 0)];
        assert_eq!(
            validate_task_set(&tasks).unwrap_err(),
            PlanError::InvalidInput(InvalidInput::DuplicateTaskId { task: "a".into() })
        );
    }

    #[test]
    fn total_utilization_sums_tasks() {
        let tasks = vec![
            Task::new("a", 4, 1, 0),
            Task::new("b", 5, 1, 0),
            Task::new("c", 20, 1, 0),
        ];
        assert!((total_utilization(&tasks) - 0.5).abs() < 1e-9);
    }
}
