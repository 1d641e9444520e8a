/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Greedy frame packer for the cyclic executive.
//!
//! [`FramePacker`] cuts one major cycle into `primary_cycle / secondary_cycle`
//! frames and fills them front to back.  Each frame is filled by repeated
//! passes over the working set (tasks that still need a run in this major
//! cycle) in [`AdmissionOrder`]:
//!
//! * a task that does not fit in the remaining frame time is skipped;
//! * a task already in the current frame is skipped;
//! * a task is admitted if it has never run, or if its deadline (previous
//!   start + period) falls before the end of the lookahead horizon;
//! * a task is retired once its deadline reaches its first start in the next
//!   major cycle, since that run covers the wrap.
//!
//! The lookahead horizon is `1 + lookahead` frames from the start of the
//! current frame.  With `lookahead == 0` a task runs in the last frame that
//! can still meet its deadline; larger values run tasks earlier, which leaves
//! room when several deadlines fall in the same frame.  [`FramePacker::pack`]
//! tries `lookahead = 0, 1, 2, …` and returns the first table in which no two
//! consecutive starts of any task (wrap included) are further apart than its
//! period.
//!
//! The position of a task's previous run is recovered from the frames built so
//! far by [`last_execution`], a backward scan that returns a [`LastExecution`]
//! rather than sentinel integers.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | State | Stateless `pack()`, working set and frames are locals |
//! | Frame contents | `&Task` borrows of the caller's slice, no copies |
//! | Working set updates | Passes iterate the working set unchanged; retirements are applied when the frame closes |
//! | Termination | Up-front `TaskExceedsFrame` / `Overloaded` checks, a hard frame budget (`NoProgress`) and a bounded lookahead search |
//! | Idle frames | Padded at the end so every schedule has exactly `frame_count()` frames |

pub mod feasibility;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cycles::CycleConfig;
use crate::error::{Infeasible, PlanError};
use crate::task::{validate_task_set, Task};

use feasibility::{check_spacing, total_demand};

// ── AdmissionOrder ────────────────────────────────────────────────────────────

/// Order in which the working set is scanned during each pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdmissionOrder {
    /// Priority descending, then period descending.  Remaining ties keep the
    /// input order.
    #[default]
    PriorityThenPeriod,

    /// Execution time ascending.  Ties keep the input order.
    ShortestExecutionFirst,
}

impl AdmissionOrder {
    /// Stable-sort `tasks` into this order.
    pub fn sort(self, tasks: &mut [&Task]) {
        match self {
            AdmissionOrder::PriorityThenPeriod => tasks.sort_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then_with(|| b.period.cmp(&a.period))
            }),
            AdmissionOrder::ShortestExecutionFirst => {
                tasks.sort_by_key(|t| t.execution_time)
            }
        }
    }
}

// ── LastExecution ─────────────────────────────────────────────────────────────

/// Where a task last ran, relative to the current position in the frame
/// being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastExecution {
    /// The task has not been placed in any frame yet.
    NeverExecuted,

    /// The task is already in the frame being filled.
    AlreadyInCurrentFrame,

    /// Time from the start of the task's most recent placement to the current
    /// position.
    ElapsedSince(u64),
}

// ── Frame / Schedule ──────────────────────────────────────────────────────────

/// One minor-cycle slot: the tasks that run in it, in execution order.
///
/// Tasks run shortest period first; equal periods keep admission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Frame<'t> {
    tasks: Vec<&'t Task>,
}

impl<'t> Frame<'t> {
    pub fn tasks(&self) -> &[&'t Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Total execution time committed to this frame.
    pub fn load(&self) -> u64 {
        self.tasks.iter().map(|t| t.execution_time).sum()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Index of task `id` within the frame.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Start offset of the task at `position`: the execution time of every
    /// task before it.
    pub fn offset_of(&self, position: usize) -> u64 {
        self.tasks[..position]
            .iter()
            .map(|t| t.execution_time)
            .sum()
    }

    /// Insert `task` after every task whose period is not longer, and return
    /// its position.
    fn insert(&mut self, task: &'t Task) -> usize {
        let position = self.tasks.partition_point(|t| t.period <= task.period);
        self.tasks.insert(position, task);
        position
    }
}

/// One major cycle's worth of frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule<'t> {
    secondary_cycle: u64,
    frames: Vec<Frame<'t>>,
}

impl<'t> Schedule<'t> {
    pub fn frames(&self) -> &[Frame<'t>] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn secondary_cycle(&self) -> u64 {
        self.secondary_cycle
    }

    /// Sum of the execution times of every placement in the schedule.
    pub fn total_execution_time(&self) -> u64 {
        self.frames.iter().map(Frame::load).sum()
    }

    /// Fraction of the major cycle spent executing tasks.
    pub fn utilization(&self, primary_cycle: u64) -> f64 {
        if primary_cycle == 0 {
            0.0
        } else {
            self.total_execution_time() as f64 / primary_cycle as f64
        }
    }

    /// Start times (from the beginning of the major cycle) of every placement
    /// of task `id`, in ascending order.
    pub fn placements(&self, id: &str) -> Vec<u64> {
        placements_in(&self.frames, id, self.secondary_cycle).collect()
    }
}

fn placements_in<'a>(
    frames: &'a [Frame<'a>],
    id: &'a str,
    secondary_cycle: u64,
) -> impl Iterator<Item = u64> + 'a {
    frames.iter().enumerate().filter_map(move |(i, frame)| {
        frame
            .position(id)
            .map(|p| i as u64 * secondary_cycle + frame.offset_of(p))
    })
}

// ── last_execution ────────────────────────────────────────────────────────────

/// Locate the most recent placement of `task`.
///
/// `current` is the frame being filled and `elapsed` the time already
/// committed to it; `frames` are the completed frames, oldest first.  For a
/// placement at position `p` of the completed frame `age` frames before the
/// most recent one, the distance is
/// `age × S + S + elapsed − offset(p)`.
pub fn last_execution(
    task: &Task,
    current: &Frame<'_>,
    elapsed: u64,
    frames: &[Frame<'_>],
    secondary_cycle: u64,
) -> LastExecution {
    if current.contains(&task.id) {
        return LastExecution::AlreadyInCurrentFrame;
    }

    for (age, frame) in frames.iter().rev().enumerate() {
        if let Some(p) = frame.position(&task.id) {
            let distance =
                age as u64 * secondary_cycle + secondary_cycle + elapsed - frame.offset_of(p);
            return LastExecution::ElapsedSince(distance);
        }
    }

    LastExecution::NeverExecuted
}

// ── FramePacker ───────────────────────────────────────────────────────────────

/// Builds a [`Schedule`] from a task set and a [`CycleConfig`].
///
/// # Example
/// ```rust
/// use cyclex::cycles::CycleConfig;
/// use cyclex::packer::FramePacker;
/// use cyclex::task::Task;
///
/// let tasks = vec![Task::new("a", 4, 1, 0), Task::new("b", 8, 2, 0)];
/// let cycles = CycleConfig::new(8, 4).unwrap();
/// let schedule = FramePacker::new().pack(&tasks, &cycles).unwrap();
/// assert_eq!(schedule.len(), 2);
/// assert_eq!(schedule.placements("a"), vec![0, 4]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FramePacker {
    order: AdmissionOrder,
}

impl FramePacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(order: AdmissionOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> AdmissionOrder {
        self.order
    }

    // ── Public entry point ────────────────────────────────────────────────────

    /// Pack `tasks` into one major cycle of frames.
    ///
    /// # Errors
    /// * [`PlanError::InvalidInput`] – the task set fails
    ///   [`validate_task_set`] or `cycles` is not a valid frame split.
    /// * [`Infeasible::TaskExceedsFrame`] – a task is longer than a frame.
    /// * [`Infeasible::Overloaded`] – total demand exceeds the major cycle.
    /// * [`Infeasible::NoProgress`] / [`Infeasible::PeriodExceeded`] – no
    ///   lookahead produced a table that keeps every task within its period.
    pub fn pack<'t>(
        &self,
        tasks: &'t [Task],
        cycles: &CycleConfig,
    ) -> Result<Schedule<'t>, PlanError> {
        // ── Preconditions ─────────────────────────────────────────────────────
        validate_task_set(tasks)?;
        let cycles = CycleConfig::new(cycles.primary_cycle, cycles.secondary_cycle)?;

        if let Some(task) = tasks
            .iter()
            .find(|t| t.execution_time > cycles.secondary_cycle)
        {
            warn!(
                task = %task.id,
                execution_time = task.execution_time,
                secondary_cycle = cycles.secondary_cycle,
                "task does not fit in a frame"
            );
            return Err(Infeasible::TaskExceedsFrame {
                task: task.id.clone(),
                execution_time: task.execution_time,
                secondary_cycle: cycles.secondary_cycle,
            }
            .into());
        }
        let demand = total_demand(tasks, cycles.primary_cycle);
        if demand > cycles.primary_cycle {
            return Err(Infeasible::Overloaded {
                demand,
                primary_cycle: cycles.primary_cycle,
            }
            .into());
        }

        let mut working: Vec<&'t Task> = tasks.iter().collect();
        self.order.sort(&mut working);

        // Beyond this every placed task is due inside the horizon in every
        // frame, so further attempts repeat the last one.
        let max_lookahead = tasks
            .iter()
            .map(|t| t.period.div_ceil(cycles.secondary_cycle))
            .max()
            .unwrap_or(0);

        info!(
            order = ?self.order,
            task_count = tasks.len(),
            frame_count = cycles.frame_count(),
            demand,
            max_lookahead,
            "=== FramePacker::pack() ==="
        );

        // ── Lookahead search ──────────────────────────────────────────────────
        let mut lookahead = 0;
        loop {
            match self.pack_with_lookahead(tasks, &working, &cycles, lookahead) {
                Ok(schedule) => {
                    info!(
                        lookahead,
                        frames = schedule.len(),
                        total_execution = schedule.total_execution_time(),
                        "=== Packing complete ==="
                    );
                    return Ok(schedule);
                }
                Err(reason) if lookahead < max_lookahead => {
                    debug!(lookahead, %reason, "attempt rejected, widening lookahead");
                    lookahead += 1;
                }
                Err(reason) => {
                    warn!(lookahead, %reason, "no lookahead yields a valid frame table");
                    return Err(reason.into());
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame construction
    // ─────────────────────────────────────────────────────────────────────────

    /// One packing attempt at a fixed lookahead, followed by the spacing
    /// check.
    fn pack_with_lookahead<'t>(
        &self,
        tasks: &'t [Task],
        ordered: &[&'t Task],
        cycles: &CycleConfig,
        lookahead: u64,
    ) -> Result<Schedule<'t>, Infeasible> {
        let frame_count = cycles.frame_count();
        let mut working = ordered.to_vec();
        let mut frames: Vec<Frame<'t>> = Vec::with_capacity(frame_count);

        while !working.is_empty() {
            if frames.len() == frame_count {
                let pending: Vec<String> = working.iter().map(|t| t.id.clone()).collect();
                debug!(?pending, frame_count, "frame budget exhausted");
                return Err(Infeasible::NoProgress {
                    pending,
                    frames: frame_count,
                });
            }

            let (frame, next) = self.fill_frame(working, &frames, cycles, lookahead);
            debug!(
                frame = frames.len(),
                tasks = frame.len(),
                load = frame.load(),
                remaining = next.len(),
                "frame closed"
            );
            frames.push(frame);
            working = next;
        }

        frames.resize_with(frame_count, Frame::default);

        let schedule = Schedule {
            secondary_cycle: cycles.secondary_cycle,
            frames,
        };
        check_spacing(tasks, &schedule, cycles)?;
        Ok(schedule)
    }

    /// Fill the frame that follows `frames` and return it together with the
    /// working set for the next frame.
    ///
    /// Passes over the working set repeat until one admits nothing.  Once the
    /// frame is closed, retirements are decided from the final start times
    /// and applied in one step.
    fn fill_frame<'t>(
        &self,
        working: Vec<&'t Task>,
        frames: &[Frame<'t>],
        cycles: &CycleConfig,
        lookahead: u64,
    ) -> (Frame<'t>, Vec<&'t Task>) {
        let secondary = cycles.secondary_cycle;
        let frame_start = cycles.frame_start(frames.len());
        let horizon = frame_start + (lookahead + 1) * secondary;
        let mut frame = Frame::default();
        let mut elapsed = 0u64;

        loop {
            let mut placed = false;

            for &task in &working {
                if elapsed + task.execution_time > secondary {
                    continue;
                }

                let admit = match last_execution(task, &frame, elapsed, frames, secondary) {
                    LastExecution::AlreadyInCurrentFrame => false,
                    LastExecution::NeverExecuted => true,
                    LastExecution::ElapsedSince(distance) => {
                        let previous = frame_start + elapsed - distance;
                        previous + task.period < horizon
                    }
                };
                if !admit {
                    continue;
                }

                let position = frame.insert(task);
                elapsed += task.execution_time;
                placed = true;
                debug!(task = %task.id, position, "✓ admitted");
            }

            if !placed {
                break;
            }
        }

        let retired: Vec<&str> = frame
            .tasks()
            .iter()
            .enumerate()
            .filter(|&(position, task)| {
                let start = frame_start + frame.offset_of(position);
                let first = placements_in(frames, &task.id, secondary)
                    .next()
                    .unwrap_or(start);
                start + task.period >= first + cycles.primary_cycle
            })
            .map(|(_, task)| task.id.as_str())
            .collect();
        if !retired.is_empty() {
            debug!(?retired, "retired for this major cycle");
        }

        let working = working
            .into_iter()
            .filter(|t| !retired.iter().any(|r| *r == t.id))
            .collect();
        (frame, working)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
