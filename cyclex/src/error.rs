/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the cyclic-executive planner.
//!
//! Two reason enums model the two failure classes:
//!
//! * [`InvalidInput`]: the task set itself is malformed (empty, zero
//!   periods, duplicate ids, a major cycle that overflows or is too large).
//! * [`Infeasible`]: the task set is well-formed but no frame table exists
//!   under the derived cycles (a task cannot fit in a frame, the major cycle
//!   is overloaded, packing runs out of frames, or a task waits longer than
//!   its period between runs).
//!
//! Both are wrapped by [`PlanError`], the single error type returned from the
//! library.  Every variant carries the exact values involved so the binary
//! can print a precise diagnostic without re-deriving anything.

use thiserror::Error;

// ── Invalid input ─────────────────────────────────────────────────────────────

/// Why a task set was rejected before any cycle was computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    /// The task set (or the period slice) is empty.
    NoTasks,

    /// A task's period is zero or negative.
    NonPositivePeriod { task: String },

    /// A task's execution time is zero or negative.
    NonPositiveExecutionTime { task: String },

    /// A task needs longer than its own period to run once.
    ExecutionExceedsPeriod {
        task: String,
        execution_time: u64,
        period: u64,
    },

    /// Two tasks share the same id.
    DuplicateTaskId { task: String },

    /// `periods` and `execution_times` passed to the calculator differ in
    /// length.
    LengthMismatch {
        periods: usize,
        execution_times: usize,
    },

    /// The LCM of the periods does not fit in `u64`.
    CycleOverflow { a: u64, b: u64 },

    /// The major cycle exceeds the configured limit.
    CycleTooLarge { value: u64, limit: u64 },

    /// A hand-built cycle configuration whose frame is zero or does not divide
    /// the major cycle.
    FrameDoesNotDivideCycle {
        primary_cycle: u64,
        secondary_cycle: u64,
    },
}

impl std::fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidInput::NoTasks => write!(f, "task set is empty"),

            InvalidInput::NonPositivePeriod { task } => {
                write!(f, "task '{}' has a non-positive period", task)
            }

            InvalidInput::NonPositiveExecutionTime { task } => {
                write!(f, "task '{}' has a non-positive execution time", task)
            }

            InvalidInput::ExecutionExceedsPeriod {
                task,
                execution_time,
                period,
            } => write!(
                f,
                "task '{}' executes for {} but its period is only {}",
                task, execution_time, period
            ),

            InvalidInput::DuplicateTaskId { task } => {
                write!(f, "task id '{}' appears more than once", task)
            }

            InvalidInput::LengthMismatch {
                periods,
                execution_times,
            } => write!(
                f,
                "{} periods but {} execution times",
                periods, execution_times
            ),

            InvalidInput::CycleOverflow { a, b } => {
                write!(f, "major cycle overflows computing lcm({a}, {b})")
            }

            InvalidInput::CycleTooLarge { value, limit } => {
                write!(f, "major cycle {value} exceeds limit {limit}")
            }

            InvalidInput::FrameDoesNotDivideCycle {
                primary_cycle,
                secondary_cycle,
            } => write!(
                f,
                "frame length {} does not divide major cycle {}",
                secondary_cycle, primary_cycle
            ),
        }
    }
}

// ── Infeasibility ─────────────────────────────────────────────────────────────

/// Why a well-formed task set has no frame table under the derived cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Infeasible {
    /// The derived frame is shorter than the longest execution time, so the
    /// largest task fits in no frame.
    FrameBelowFloor {
        frame_floor: u64,
        secondary_cycle: u64,
    },

    /// A specific task cannot fit in a frame of the given length.
    TaskExceedsFrame {
        task: String,
        execution_time: u64,
        secondary_cycle: u64,
    },

    /// The tasks demand more execution time per major cycle than the cycle
    /// holds.
    Overloaded { demand: u64, primary_cycle: u64 },

    /// Every frame of the major cycle was filled and these tasks still had
    /// pending jobs.
    NoProgress { pending: Vec<String>, frames: usize },

    /// Two consecutive starts of a task, counting the wrap into the next
    /// major cycle, are further apart than its period.
    PeriodExceeded {
        task: String,
        from: u64,
        gap: u64,
        period: u64,
    },

    /// A task has no placement anywhere in the schedule.
    NeverScheduled { task: String },
}

impl std::fmt::Display for Infeasible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Infeasible::FrameBelowFloor {
                frame_floor,
                secondary_cycle,
            } => write!(
                f,
                "frame length {} is shorter than the longest execution time {}",
                secondary_cycle, frame_floor
            ),

            Infeasible::TaskExceedsFrame {
                task,
                execution_time,
                secondary_cycle,
            } => write!(
                f,
                "task '{}' needs {} but a frame is only {} long",
                task, execution_time, secondary_cycle
            ),

            Infeasible::Overloaded {
                demand,
                primary_cycle,
            } => write!(
                f,
                "tasks demand {} per major cycle of {} ({:.1}% utilization)",
                demand,
                primary_cycle,
                *demand as f64 * 100.0 / *primary_cycle as f64
            ),

            Infeasible::NoProgress { pending, frames } => write!(
                f,
                "all {} frames are used but tasks [{}] still have pending jobs",
                frames,
                pending.join(", ")
            ),

            Infeasible::PeriodExceeded {
                task,
                from,
                gap,
                period,
            } => write!(
                f,
                "task '{}' waits {} after its start at {} but its period is {}",
                task, gap, from, period
            ),

            Infeasible::NeverScheduled { task } => {
                write!(f, "task '{}' never runs", task)
            }
        }
    }
}

// ── Top-level error ───────────────────────────────────────────────────────────

/// Error returned by every fallible planner operation.
///
/// | Variant | CLI exit code |
/// |---|---|
/// | `InvalidInput` | 2 |
/// | `Infeasible` | 3 |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The task set is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(InvalidInput),

    /// No cyclic schedule exists for the task set under the derived cycles.
    #[error("infeasible schedule: {0}")]
    Infeasible(Infeasible),
}

impl From<InvalidInput> for PlanError {
    fn from(reason: InvalidInput) -> Self {
        PlanError::InvalidInput(reason)
    }
}

impl From<Infeasible> for PlanError {
    fn from(reason: Infeasible) -> Self {
        PlanError::Infeasible(reason)
    }
}
