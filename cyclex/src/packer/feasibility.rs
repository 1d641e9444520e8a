/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedulability checks for a packed cyclic schedule.
//!
//! # Spacing
//! A task's period is the longest it may wait between two consecutive
//! starts.  The table repeats every major cycle, so the last start of one
//! cycle is followed by the first start of the next:
//!
//! ```text
//!   0        s0         s1              s2          P    P + s0
//!   |────────|──────────|───────────────|───────────|────|
//!            └── ≤ T ───┘└──── ≤ T ─────┘└────── ≤ T ─────┘
//! ```
//!
//! A table that keeps every gap, wrap included, within the period keeps it
//! there forever.
//!
//! # Demand
//! A task needs at least `primary_cycle / T` runs of `C` units per major
//! cycle, so `Σ (P / T) · C ≤ P` is necessary but not sufficient: frame
//! boundaries can still strand capacity.

use crate::cycles::CycleConfig;
use crate::error::Infeasible;
use crate::task::Task;

use super::Schedule;

// ── Public API ────────────────────────────────────────────────────────────────

/// Execution time the task set needs in one major cycle.
///
/// Saturates instead of overflowing so an absurd task set is simply reported
/// as overloaded.
pub fn total_demand(tasks: &[Task], primary_cycle: u64) -> u64 {
    tasks
        .iter()
        .map(|t| t.jobs_per_cycle(primary_cycle).saturating_mul(t.execution_time))
        .fold(0u64, u64::saturating_add)
}

/// Verify that no task waits longer than its period between consecutive
/// starts, counting the wrap from its last start to its first start in the
/// next major cycle.
///
/// Returns the first violation found, scanning tasks in input order and gaps
/// in time order.
pub fn check_spacing(
    tasks: &[Task],
    schedule: &Schedule<'_>,
    cycles: &CycleConfig,
) -> Result<(), Infeasible> {
    for task in tasks {
        let starts = schedule.placements(&task.id);
        if starts.is_empty() {
            return Err(Infeasible::NeverScheduled {
                task: task.id.clone(),
            });
        }
        if let Some((from, gap)) =
            gaps(&starts, cycles.primary_cycle).find(|&(_, gap)| gap > task.period)
        {
            return Err(Infeasible::PeriodExceeded {
                task: task.id.clone(),
                from,
                gap,
                period: task.period,
            });
        };
    }
    Ok(())
}

/// Largest start-to-start gap between consecutive placements, counting the
/// wrap from the last placement of one major cycle to the first of the next.
///
/// `None` when the task never runs.  A single placement yields
/// `primary_cycle`.
pub fn max_gap(starts: &[u64], primary_cycle: u64) -> Option<u64> {
    gaps(starts, primary_cycle).map(|(_, gap)| gap).max()
}

/// `(start, gap to the next start)` for every placement, the last one
/// wrapping to the first start of the next major cycle.
fn gaps(starts: &[u64], primary_cycle: u64) -> impl Iterator<Item = (u64, u64)> + '_ {
    let wrap = match (starts.first(), starts.last()) {
        (Some(&first), Some(&last)) => Some((last, first + primary_cycle - last)),
        _ => None,
    };
    starts
        .windows(2)
        .map(|w| (w[0], w[1] - w[0]))
        .chain(wrap)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
