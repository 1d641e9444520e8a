/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Major and minor cycle derivation.
//!
//! The major (primary) cycle of a periodic task set is the LCM of all task
//! periods: the smallest window after which the whole schedule repeats.  The
//! minor (secondary) cycle is the frame length the major cycle is cut into.
//!
//! [`CycleTimeCalculator::compute`] starts the frame at the GCD of the periods
//! (or at the longest execution time, see [`FrameStart`]), grows it in steps of
//! the GCD while the frame-size condition
//! `2 × frame_floor − primary_cycle > secondary_cycle` holds, then rounds it
//! up to a divisor of the major cycle.  Every returned [`CycleConfig`]
//! satisfies:
//!
//! * `primary_cycle % secondary_cycle == 0`
//! * `secondary_cycle >= max(execution_time)`
//! * `2 × max(execution_time) − primary_cycle <= secondary_cycle`

pub mod math;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Infeasible, InvalidInput, PlanError};
use crate::task::Task;
use math::{gcd_of_slice, lcm_of_slice, smallest_divisor_at_least};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default upper limit on the major cycle, in task time units.
///
/// The packer builds `primary_cycle / secondary_cycle` frames, so an unbounded
/// major cycle (e.g. coprime periods in the thousands) would mean millions of
/// frames.  Callers that want a different limit use
/// [`CycleTimeCalculator::with_limit`].
pub const DEFAULT_PRIMARY_CYCLE_LIMIT: u64 = 1_000_000;

// ── CycleConfig ───────────────────────────────────────────────────────────────

/// Derived major/minor cycle pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleConfig {
    /// Length of one full schedule repetition (LCM of the periods).
    pub primary_cycle: u64,

    /// Frame length.  Always divides `primary_cycle`.
    pub secondary_cycle: u64,
}

impl CycleConfig {
    /// Build a configuration by hand, e.g. to pack against a fixed frame.
    ///
    /// # Errors
    /// [`InvalidInput::FrameDoesNotDivideCycle`] if either value is zero or
    /// the frame does not divide the major cycle.
    pub fn new(primary_cycle: u64, secondary_cycle: u64) -> Result<Self, PlanError> {
        if primary_cycle == 0 || secondary_cycle == 0 || primary_cycle % secondary_cycle != 0 {
            return Err(InvalidInput::FrameDoesNotDivideCycle {
                primary_cycle,
                secondary_cycle,
            }
            .into());
        }
        Ok(Self {
            primary_cycle,
            secondary_cycle,
        })
    }

    /// Number of frames in one major cycle.
    pub fn frame_count(&self) -> usize {
        (self.primary_cycle / self.secondary_cycle) as usize
    }

    /// Start time of frame `index` relative to the start of the major cycle.
    pub fn frame_start(&self, index: usize) -> u64 {
        index as u64 * self.secondary_cycle
    }
}

// ── FrameStart ────────────────────────────────────────────────────────────────

/// Where the frame-length search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameStart {
    /// Start from the GCD of the periods.  Yields the shortest frames; a task
    /// longer than the GCD makes the set infeasible.
    #[default]
    BaseUnit,

    /// Start from the longest execution time, so the largest task always fits
    /// and only divisibility pushes the frame further up.
    FrameFloor,
}

// ── CycleTimeCalculator ───────────────────────────────────────────────────────

/// Derives a [`CycleConfig`] from task periods and execution times.
///
/// # Example
/// ```rust
/// use cyclex::cycles::CycleTimeCalculator;
///
/// let calc = CycleTimeCalculator::new();
/// let cycles = calc.compute(&[4, 5, 20], &[1, 1, 1]).unwrap();
/// assert_eq!(cycles.primary_cycle, 20);
/// assert_eq!(cycles.secondary_cycle, 1);
/// ```
#[derive(Debug, Clone)]
pub struct CycleTimeCalculator {
    /// Upper bound on the major cycle.
    limit: u64,

    frame_start: FrameStart,
}

impl CycleTimeCalculator {
    /// Calculator with the default limit, starting from the base unit.
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_PRIMARY_CYCLE_LIMIT,
            frame_start: FrameStart::default(),
        }
    }

    /// Calculator with a custom major-cycle limit.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit,
            ..Self::new()
        }
    }

    /// Select where the frame search starts.
    pub fn frame_start(mut self, frame_start: FrameStart) -> Self {
        self.frame_start = frame_start;
        self
    }

    /// Compute the cycle pair for a task set.
    pub fn compute_for_tasks(&self, tasks: &[Task]) -> Result<CycleConfig, PlanError> {
        let periods: Vec<u64> = tasks.iter().map(|t| t.period).collect();
        let execution_times: Vec<u64> = tasks.iter().map(|t| t.execution_time).collect();
        self.compute(&periods, &execution_times)
    }

    /// Compute the cycle pair from parallel slices of periods and execution
    /// times (element `i` of both belongs to the same task).
    ///
    /// Tasks are labelled `#1`, `#2`, … in errors since no ids are available.
    ///
    /// # Errors
    /// * [`InvalidInput::NoTasks`] – `periods` is empty.
    /// * [`InvalidInput::LengthMismatch`] – the slices differ in length.
    /// * [`InvalidInput::NonPositivePeriod`] /
    ///   [`InvalidInput::NonPositiveExecutionTime`] /
    ///   [`InvalidInput::ExecutionExceedsPeriod`] – a bad task.
    /// * [`InvalidInput::CycleOverflow`] / [`InvalidInput::CycleTooLarge`] –
    ///   the LCM overflows or exceeds the limit.
    /// * [`Infeasible::FrameBelowFloor`] – the derived frame is shorter than
    ///   the longest execution time.
    pub fn compute(
        &self,
        periods: &[u64],
        execution_times: &[u64],
    ) -> Result<CycleConfig, PlanError> {
        if periods.is_empty() {
            warn!("No periods supplied to the cycle calculator");
            return Err(InvalidInput::NoTasks.into());
        }
        if periods.len() != execution_times.len() {
            return Err(InvalidInput::LengthMismatch {
                periods: periods.len(),
                execution_times: execution_times.len(),
            }
            .into());
        }
        for (i, (&period, &execution_time)) in periods.iter().zip(execution_times).enumerate() {
            let task = || format!("#{}", i + 1);
            if period == 0 {
                return Err(InvalidInput::NonPositivePeriod { task: task() }.into());
            }
            if execution_time == 0 {
                return Err(InvalidInput::NonPositiveExecutionTime { task: task() }.into());
            }
            if execution_time > period {
                return Err(InvalidInput::ExecutionExceedsPeriod {
                    task: task(),
                    execution_time,
                    period,
                }
                .into());
            }
        }

        let primary_cycle = lcm_of_slice(periods)?;
        if primary_cycle > self.limit {
            warn!(
                primary_cycle,
                limit = self.limit,
                "Major cycle exceeds configured limit"
            );
            return Err(InvalidInput::CycleTooLarge {
                value: primary_cycle,
                limit: self.limit,
            }
            .into());
        }

        let base_unit = gcd_of_slice(periods);
        let frame_floor = execution_times.iter().copied().max().unwrap_or(0);

        let mut secondary_cycle = match self.frame_start {
            FrameStart::BaseUnit => base_unit,
            FrameStart::FrameFloor => frame_floor,
        };

        // Frame-size condition: grow the frame while 2F - P > S.
        let excess = 2 * frame_floor as i128 - primary_cycle as i128;
        while excess > secondary_cycle as i128 {
            secondary_cycle += base_unit;
        }

        let rounded = smallest_divisor_at_least(primary_cycle, secondary_cycle).ok_or(
            InvalidInput::FrameDoesNotDivideCycle {
                primary_cycle,
                secondary_cycle,
            },
        )?;
        if rounded != secondary_cycle {
            debug!(
                from = secondary_cycle,
                to = rounded,
                "Rounded frame up to a divisor of the major cycle"
            );
        }
        secondary_cycle = rounded;

        if secondary_cycle < frame_floor {
            warn!(
                secondary_cycle,
                frame_floor, "Longest task does not fit in the derived frame"
            );
            return Err(Infeasible::FrameBelowFloor {
                frame_floor,
                secondary_cycle,
            }
            .into());
        }

        info!(
            primary_cycle,
            secondary_cycle,
            base_unit,
            frame_floor,
            frames = primary_cycle / secondary_cycle,
            "Calculated cycles"
        );

        Ok(CycleConfig {
            primary_cycle,
            secondary_cycle,
        })
    }
}

impl Default for CycleTimeCalculator {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn check_invariants(periods: &[u64], execution_times: &[u64], cfg: &CycleConfig) {
        let floor = *execution_times.iter().max().unwrap();
        assert_eq!(cfg.primary_cycle % cfg.secondary_cycle, 0, "{cfg:?}");
        assert!(cfg.secondary_cycle >= floor, "{cfg:?}");
        assert!(
            2 * floor as i128 - cfg.primary_cycle as i128 <= cfg.secondary_cycle as i128,
            "{cfg:?}"
        );
        assert!(periods.iter().all(|p| cfg.primary_cycle % p == 0));
    }

    // ── compute ───────────────────────────────────────────────────────────────

    #[test]
    fn scenario_a_cycles() {
        let calc = CycleTimeCalculator::new();
        let cfg = calc.compute(&[4, 5, 20], &[1, 1, 1]).unwrap();
        assert_eq!(cfg.primary_cycle, 20);
        assert_eq!(cfg.secondary_cycle, 1);
        assert_eq!(cfg.frame_count(), 20);
    }

    #[test]
    fn single_task_uses_its_own_period() {
        let calc = CycleTimeCalculator::new();
        let cfg = calc.compute(&[10], &[3]).unwrap();
        assert_eq!(cfg.primary_cycle, 10);
        assert_eq!(cfg.secondary_cycle, 10);
        assert_eq!(cfg.frame_count(), 1);
    }

    #[test]
    fn base_unit_with_common_divisor() {
        // lcm = 100, gcd = 25, longest execution = 20
        let calc = CycleTimeCalculator::new();
        let cfg = calc.compute(&[25, 50, 100], &[10, 5, 20]).unwrap();
        assert_eq!(cfg.primary_cycle, 100);
        assert_eq!(cfg.secondary_cycle, 25);
        check_invariants(&[25, 50, 100], &[10, 5, 20], &cfg);
    }

    #[test]
    fn frame_size_condition_grows_the_frame() {
        // P = 10, gcd = 2, F = 8 → 2F - P = 6: frame grows 2 → 4 → 6, then
        // rounds to the divisor 10.
        let calc = CycleTimeCalculator::new();
        let cfg = calc.compute(&[2, 10], &[1, 8]).unwrap();
        assert_eq!(cfg.primary_cycle, 10);
        assert_eq!(cfg.secondary_cycle, 10);
        check_invariants(&[2, 10], &[1, 8], &cfg);
    }

    #[test]
    fn frame_floor_start_always_fits_the_longest_task() {
        let calc = CycleTimeCalculator::new().frame_start(FrameStart::FrameFloor);
        let cfg = calc.compute(&[4, 6], &[1, 3]).unwrap();
        // P = 12, floor = 3 → smallest divisor of 12 that is >= 3
        assert_eq!(cfg.primary_cycle, 12);
        assert_eq!(cfg.secondary_cycle, 3);
        check_invariants(&[4, 6], &[1, 3], &cfg);
    }

    #[test]
    fn frame_floor_start_rounds_to_divisor() {
        let calc = CycleTimeCalculator::new().frame_start(FrameStart::FrameFloor);
        let cfg = calc.compute(&[10], &[3]).unwrap();
        assert_eq!(cfg.secondary_cycle, 5);
    }

    #[test]
    fn invariants_hold_across_task_sets() {
        let sets: &[(&[u64], &[u64])] = &[
            (&[4, 5, 20], &[1, 1, 1]),
            (&[6, 8, 12], &[2, 2, 2]),
            (&[10, 20, 40], &[3, 10, 5]),
            (&[3, 7], &[1, 1]),
            (&[12], &[12]),
        ];
        for start in [FrameStart::BaseUnit, FrameStart::FrameFloor] {
            let calc = CycleTimeCalculator::new().frame_start(start);
            for (periods, execs) in sets {
                match calc.compute(periods, execs) {
                    Ok(cfg) => check_invariants(periods, execs, &cfg),
                    Err(PlanError::Infeasible(Infeasible::FrameBelowFloor { .. })) => {
                        assert_eq!(start, FrameStart::BaseUnit)
                    }
                    Err(e) => panic!("unexpected error for {periods:?}: {e}"),
                }
            }
        }
    }

    // ── errors ────────────────────────────────────────────────────────────────

    #[test]
    fn longest_task_above_base_unit_is_infeasible() {
        // A 10-unit task next to a 4-period task: P = 20, S = 4 < 10
        let calc = CycleTimeCalculator::new();
        let err = calc.compute(&[20, 4], &[10, 1]).unwrap_err();
        assert_eq!(
            err,
            PlanError::Infeasible(Infeasible::FrameBelowFloor {
                frame_floor: 10,
                secondary_cycle: 4,
            })
        );
    }

    #[test]
    fn empty_periods_are_invalid() {
        let err = CycleTimeCalculator::new().compute(&[], &[]).unwrap_err();
        assert_eq!(err, PlanError::InvalidInput(InvalidInput::NoTasks));
    }

    #[test]
    fn zero_period_is_invalid() {
        let err = CycleTimeCalculator::new()
            .compute(&[4, 0], &[1, 1])
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::InvalidInput(InvalidInput::NonPositivePeriod { task: "#2".into() })
        );
    }

    #[test]
    fn zero_execution_time_is_invalid() {
        let err = CycleTimeCalculator::new().compute(&[4], &[0]).unwrap_err();
        assert!(matches!(
            err,
            PlanError::InvalidInput(InvalidInput::NonPositiveExecutionTime { .. })
        ));
    }

    #[test]
    fn length_mismatch_is_invalid() {
        let err = CycleTimeCalculator::new()
            .compute(&[4, 5], &[1])
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::InvalidInput(InvalidInput::LengthMismatch {
                periods: 2,
                execution_times: 1,
            })
        );
    }

    #[test]
    fn major_cycle_above_limit_is_rejected() {
        let calc = CycleTimeCalculator::with_limit(100);
        let err = calc.compute(&[7, 11, 13], &[1, 1, 1]).unwrap_err();
        assert_eq!(
            err,
            PlanError::InvalidInput(InvalidInput::CycleTooLarge {
                value: 1001,
                limit: 100,
            })
        );
    }

    #[test]
    fn major_cycle_at_exactly_the_limit_is_accepted() {
        let calc = CycleTimeCalculator::with_limit(20);
        assert!(calc.compute(&[4, 5], &[1, 1]).is_ok());
    }

    #[test]
    fn compute_for_tasks_matches_slices() {
        let tasks = vec![Task::new("a", 6, 2, 0), Task::new("b", 8, 2, 0)];
        let calc = CycleTimeCalculator::new();
        assert_eq!(
            calc.compute_for_tasks(&tasks).unwrap(),
            calc.compute(&[6, 8], &[2, 2]).unwrap()
        );
    }

    // ── CycleConfig::new ──────────────────────────────────────────────────────

    #[test]
    fn hand_built_config_must_divide() {
        assert!(CycleConfig::new(20, 4).is_ok());
        assert!(CycleConfig::new(20, 3).is_err());
        assert!(CycleConfig::new(20, 0).is_err());
        assert!(CycleConfig::new(0, 4).is_err());
    }

    #[test]
    fn frame_start_times() {
        let cfg = CycleConfig::new(20, 5).unwrap();
        assert_eq!(cfg.frame_start(0), 0);
        assert_eq!(cfg.frame_start(3), 15);
    }
}
