/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Cyclex – static cyclic-executive planner
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── task        – Task model and task-set validation
//! ├── config/     – JSON / YAML task-set loader
//! ├── cycles/     – major/minor cycle derivation (LCM / GCD helpers)
//! ├── packer/     – greedy frame packing + spacing checks
//! ├── planner     – load → cycles → pack → verify pipeline
//! ├── report      – text and JSON rendering
//! └── error       – structured planner errors
//! ```

pub mod config;
pub mod cycles;
pub mod error;
pub mod packer;
pub mod planner;
pub mod report;
pub mod task;
