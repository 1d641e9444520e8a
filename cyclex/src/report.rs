/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Human- and machine-readable renderings of a [`Plan`].

use std::fmt;

use serde::Serialize;

use crate::packer::feasibility::max_gap;
use crate::packer::Frame;
use crate::planner::Plan;
use crate::task::Task;

// ── Text ──────────────────────────────────────────────────────────────────────

/// Plain-text report: cycle lengths, the frame table and a utilisation
/// summary.
pub struct TextReport<'a, 't> {
    plan: &'a Plan<'t>,
    tasks: &'a [Task],
}

impl<'a, 't> TextReport<'a, 't> {
    pub fn new(plan: &'a Plan<'t>, tasks: &'a [Task]) -> Self {
        Self { plan, tasks }
    }
}

impl fmt::Display for TextReport<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cycles = self.plan.cycles;
        let schedule = &self.plan.schedule;

        writeln!(f, "Cyclic executive plan")?;
        writeln!(f, "=====================")?;
        writeln!(f, "Primary cycle:   {} time units", cycles.primary_cycle)?;
        writeln!(f, "Secondary cycle: {} time units", cycles.secondary_cycle)?;
        writeln!(f)?;

        writeln!(f, "Frame table")?;
        writeln!(f, "-----------")?;
        for (i, frame) in schedule.frames().iter().enumerate() {
            let start = cycles.frame_start(i);
            let end = start + cycles.secondary_cycle;
            if frame.is_empty() {
                writeln!(f, "Frame {} [{}, {}): idle", i + 1, start, end)?;
                continue;
            }
            writeln!(f, "Frame {} [{}, {}):", i + 1, start, end)?;
            for task in frame.tasks() {
                writeln!(
                    f,
                    "  - {}: execution_time = {}, period = {}, priority = {}",
                    task.id, task.execution_time, task.period, task.priority
                )?;
            }
        }
        writeln!(f)?;

        writeln!(f, "Summary")?;
        writeln!(f, "-------")?;
        writeln!(f, "Total frames:         {}", schedule.len())?;
        writeln!(
            f,
            "Total execution time: {}",
            schedule.total_execution_time()
        )?;
        writeln!(f, "CPU utilization:      {:.0}%", self.plan.utilization() * 100.0)?;

        if !self.tasks.is_empty() {
            writeln!(f)?;
            writeln!(f, "Per task")?;
            writeln!(f, "--------")?;
            for task in self.tasks {
                let starts = schedule.placements(&task.id);
                match max_gap(&starts, cycles.primary_cycle) {
                    Some(gap) => writeln!(
                        f,
                        "  {}: {} run(s), max gap {} (period {})",
                        task.id,
                        starts.len(),
                        gap,
                        task.period
                    )?,
                    None => writeln!(f, "  {}: never runs", task.id)?,
                }
            }
        }
        Ok(())
    }
}

/// Render the plan as a text report.
pub fn render_text(plan: &Plan<'_>, tasks: &[Task]) -> String {
    TextReport::new(plan, tasks).to_string()
}

// ── JSON ──────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct JsonReport<'a, 't> {
    primary_cycle: u64,
    secondary_cycle: u64,
    frame_count: usize,
    total_execution_time: u64,
    utilization: f64,
    frames: &'a [Frame<'t>],
}

/// Render the plan as pretty-printed JSON.
pub fn render_json(plan: &Plan<'_>) -> serde_json::Result<String> {
    let report = JsonReport {
        primary_cycle: plan.cycles.primary_cycle,
        secondary_cycle: plan.cycles.secondary_cycle,
        frame_count: plan.schedule.len(),
        total_execution_time: plan.schedule.total_execution_time(),
        utilization: plan.utilization(),
        frames: plan.schedule.frames(),
    };
    serde_json::to_string_pretty(&report)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
