/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing::{error, info};

use cyclex::config::load_task_set;
use cyclex::cycles::{FrameStart, DEFAULT_PRIMARY_CYCLE_LIMIT};
use cyclex::error::PlanError;
use cyclex::packer::AdmissionOrder;
use cyclex::planner::{plan, PlanOptions};
use cyclex::report::{render_json, render_text};

// ── CLI argument definition ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    /// Priority descending, then period descending.
    Priority,
    /// Execution time ascending.
    ShortestFirst,
}

impl From<OrderArg> for AdmissionOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Priority => AdmissionOrder::PriorityThenPeriod,
            OrderArg::ShortestFirst => AdmissionOrder::ShortestExecutionFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FrameStartArg {
    /// Start from the GCD of the periods.
    BaseUnit,
    /// Start from the longest execution time.
    FrameFloor,
}

impl From<FrameStartArg> for FrameStart {
    fn from(arg: FrameStartArg) -> Self {
        match arg {
            FrameStartArg::BaseUnit => FrameStart::BaseUnit,
            FrameStartArg::FrameFloor => FrameStart::FrameFloor,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

/// Cyclic-executive planner.
///
/// Example:
///   cyclex tasks.json --order priority --format text
#[derive(Debug, Parser)]
#[command(
    name = "cyclex",
    about = "Derive a cyclic-executive frame table for periodic tasks",
    long_about = None,
)]
struct Cli {
    /// Task file (JSON, or YAML with a .yaml/.yml extension).
    tasks: PathBuf,

    /// Order in which tasks are considered for each frame.
    #[arg(short = 'o', long = "order", value_enum, default_value_t = OrderArg::Priority)]
    order: OrderArg,

    /// Where the frame-length search starts.
    #[arg(short = 's', long = "frame-start", value_enum, default_value_t = FrameStartArg::BaseUnit)]
    frame_start: FrameStartArg,

    /// Reject task sets whose major cycle exceeds this many time units.
    #[arg(short = 'm', long = "max-cycle", default_value_t = DEFAULT_PRIMARY_CYCLE_LIMIT)]
    max_cycle: u64,

    /// Report format.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,
}

/// Exit code for a failed load: a task with invalid values is reported like
/// any other invalid input, everything else (missing file, bad syntax) is 1.
fn load_exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<PlanError>() {
        Some(PlanError::InvalidInput(_)) => 2,
        _ => 1,
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Logs go to stderr so the report on stdout stays clean.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(
        tasks       = %cli.tasks.display(),
        order       = ?cli.order,
        frame_start = ?cli.frame_start,
        max_cycle   = cli.max_cycle,
        "Configuration"
    );

    // ── Load ──────────────────────────────────────────────────────────────────
    let tasks = match load_task_set(&cli.tasks) {
        Ok(tasks) => tasks,
        Err(e) => {
            error!("Failed to load task set: {:#}", e);
            process::exit(load_exit_code(&e));
        }
    };

    // ── Plan ──────────────────────────────────────────────────────────────────
    let options = PlanOptions {
        order: cli.order.into(),
        frame_start: cli.frame_start.into(),
        primary_cycle_limit: cli.max_cycle,
    };

    let plan = match plan(&tasks, &options) {
        Ok(plan) => plan,
        Err(e) => {
            error!("{}", e);
            process::exit(match e {
                PlanError::InvalidInput(_) => 2,
                PlanError::Infeasible(_) => 3,
            });
        }
    };

    // ── Report ────────────────────────────────────────────────────────────────
    match cli.format {
        FormatArg::Text => print!("{}", render_text(&plan, &tasks)),
        FormatArg::Json => match render_json(&plan) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialise plan: {}", e);
                process::exit(1);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclex::config::{parse_task_set, TaskFileFormat};

    #[test]
    fn negative_period_in_file_exits_as_invalid_input() {
        let json = r#"{"tasks": [{"id": "a", "period": -4, "execution_time": 1}]}"#;
        let err = parse_task_set(json, TaskFileFormat::Json).unwrap_err();
        assert_eq!(load_exit_code(&err), 2);
    }

    #[test]
    fn zero_execution_time_in_yaml_file_exits_as_invalid_input() {
        use std::io::Write;

        let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        f.write_all(b"tasks:\n  - id: a\n    period: 4\n    execution_time: 0\n")
            .unwrap();
        let err = load_task_set(f.path()).unwrap_err();
        assert_eq!(load_exit_code(&err), 2);
    }

    #[test]
    fn missing_file_exits_as_load_error() {
        let err = load_task_set(std::path::Path::new("/nonexistent/tasks.json")).unwrap_err();
        assert_eq!(load_exit_code(&err), 1);
    }

    #[test]
    fn malformed_document_exits_as_load_error() {
        let err = parse_task_set("{ not json", TaskFileFormat::Json).unwrap_err();
        assert_eq!(load_exit_code(&err), 1);
    }
}
