/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! End-to-end planning pipeline.
//!
//! ```text
//! &[Task] ──validate──► CycleTimeCalculator ──► FramePacker (pack + spacing check) ──► Plan
//! ```
//!
//! Everything the pipeline needs arrives as a parameter and everything it
//! produces is returned; there is no module-level state.

use serde::Serialize;
use tracing::{info, warn};

use crate::cycles::{CycleConfig, CycleTimeCalculator, FrameStart, DEFAULT_PRIMARY_CYCLE_LIMIT};
use crate::error::PlanError;
use crate::packer::{AdmissionOrder, FramePacker, Schedule};
use crate::task::{total_utilization, validate_task_set, Task};

/// Knobs for one planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    pub order: AdmissionOrder,
    pub frame_start: FrameStart,
    pub primary_cycle_limit: u64,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            order: AdmissionOrder::default(),
            frame_start: FrameStart::default(),
            primary_cycle_limit: DEFAULT_PRIMARY_CYCLE_LIMIT,
        }
    }
}

/// A verified cyclic-executive plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan<'t> {
    pub cycles: CycleConfig,
    pub schedule: Schedule<'t>,
}

impl Plan<'_> {
    /// Fraction of the major cycle spent executing tasks.
    pub fn utilization(&self) -> f64 {
        self.schedule.utilization(self.cycles.primary_cycle)
    }
}

/// Validate `tasks`, derive the cycles and pack the frames.  The packer only
/// returns a table in which every task's starts, wrap included, are at most a
/// period apart.  Either the whole plan is returned or nothing is.
pub fn plan<'t>(tasks: &'t [Task], options: &PlanOptions) -> Result<Plan<'t>, PlanError> {
    validate_task_set(tasks)?;

    let utilization = total_utilization(tasks);
    info!(
        task_count = tasks.len(),
        utilization_pct = utilization * 100.0,
        "Planning cyclic executive"
    );
    if utilization > 1.0 {
        warn!(
            utilization_pct = utilization * 100.0,
            "task set needs more than 100% of the CPU"
        );
    }

    let cycles = CycleTimeCalculator::with_limit(options.primary_cycle_limit)
        .frame_start(options.frame_start)
        .compute_for_tasks(tasks)?;

    let schedule = FramePacker::with_order(options.order).pack(tasks, &cycles)?;

    Ok(Plan { cycles, schedule })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Infeasible, InvalidInput};
    use crate::packer::feasibility::max_gap;

    fn scenario_a() -> Vec<Task> {
        vec![
            Task::new("A", 4, 1, 1),
            Task::new("B", 5, 1, 1),
            Task::new("C", 20, 1, 1),
        ]
    }

    #[test]
    fn scenario_a_end_to_end() {
        let tasks = scenario_a();
        let plan = plan(&tasks, &PlanOptions::default()).unwrap();

        assert_eq!(plan.cycles.primary_cycle, 20);
        assert_eq!(plan.cycles.secondary_cycle, 1);
        assert_eq!(plan.schedule.len(), 20);
        assert_eq!(plan.schedule.placements("A").len(), 5);
        assert_eq!(plan.schedule.placements("B").len(), 5);
        assert_eq!(plan.schedule.placements("C").len(), 1);
        assert!((plan.utilization() - 0.55).abs() < 1e-9);
    }

    #[test]
    fn scenario_b_is_infeasible_without_looping() {
        let tasks = vec![
            Task::new("big", 20, 10, 1),
            Task::new("fast", 4, 1, 1),
            Task::new("mid", 10, 1, 1),
        ];
        let err = plan(&tasks, &PlanOptions::default()).unwrap_err();
        assert!(matches!(err, PlanError::Infeasible(_)), "got {err:?}");
    }

    #[test]
    fn single_task_boundary() {
        let tasks = vec![Task::new("solo", 7, 2, 0)];
        let plan = plan(&tasks, &PlanOptions::default()).unwrap();
        assert_eq!(plan.cycles.primary_cycle, 7);
        assert_eq!(plan.cycles.secondary_cycle, 7);
        assert!(plan
            .schedule
            .frames()
            .iter()
            .all(|f| f.len() == 1 && f.tasks()[0].id == "solo"));
    }

    #[test]
    fn plan_properties_hold() {
        let sets = vec![
            scenario_a(),
            vec![
                Task::new("A", 4, 1, 3),
                Task::new("B", 8, 2, 2),
                Task::new("C", 16, 2, 1),
            ],
            vec![
                Task::new("a", 6, 2, 1),
                Task::new("b", 12, 3, 0),
                Task::new("c", 12, 1, 0),
                Task::new("d", 24, 4, 0),
            ],
        ];
        for tasks in &sets {
            let plan = plan(tasks, &PlanOptions::default()).unwrap();
            let c = plan.cycles;
            assert_eq!(c.primary_cycle % c.secondary_cycle, 0);
            assert_eq!(plan.schedule.len(), c.frame_count());
            assert!(plan.schedule.total_execution_time() <= c.primary_cycle);
            let u = plan.utilization();
            assert!((0.0..=1.0).contains(&u));
            for task in tasks {
                assert!(c.secondary_cycle >= task.execution_time);
                let starts = plan.schedule.placements(&task.id);
                assert!(starts.len() as u64 >= task.jobs_per_cycle(c.primary_cycle));
                let gap = max_gap(&starts, c.primary_cycle).unwrap();
                assert!(gap <= task.period, "{}: gap {gap}", task.id);
            }
        }
    }

    #[test]
    fn planning_is_deterministic() {
        let tasks = scenario_a();
        let a = plan(&tasks, &PlanOptions::default()).unwrap();
        let b = plan(&tasks, &PlanOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stranded_task_fails_the_whole_plan() {
        // "b" fills frame 0, so "a" first runs at 2 and cannot run again.
        let tasks = vec![Task::new("a", 2, 1, 0), Task::new("b", 4, 2, 0)];
        let err = plan(&tasks, &PlanOptions::default()).unwrap_err();
        assert_eq!(
            err,
            PlanError::Infeasible(Infeasible::NoProgress {
                pending: vec!["a".into()],
                frames: 2,
            })
        );
    }

    #[test]
    fn shortest_first_order_is_selectable() {
        let tasks = vec![Task::new("a", 2, 1, 0), Task::new("b", 4, 2, 0)];
        let options = PlanOptions {
            order: AdmissionOrder::ShortestExecutionFirst,
            ..PlanOptions::default()
        };
        let err = plan(&tasks, &options).unwrap_err();
        assert!(matches!(
            err,
            PlanError::Infeasible(Infeasible::NoProgress { .. })
        ));
    }

    #[test]
    fn invalid_tasks_are_rejected_first() {
        let tasks = vec![Task::new("a", 4, 5, 0)];
        let err = plan(&tasks, &PlanOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PlanError::InvalidInput(InvalidInput::ExecutionExceedsPeriod { .. })
        ));
    }

    #[test]
    fn limit_is_forwarded_to_the_calculator() {
        let tasks = scenario_a();
        let options = PlanOptions {
            primary_cycle_limit: 10,
            ..PlanOptions::default()
        };
        assert!(matches!(
            plan(&tasks, &options).unwrap_err(),
            PlanError::InvalidInput(InvalidInput::CycleTooLarge { value: 20, limit: 10 })
        ));
    }
}
