/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! dagsched – non-preemptive list schedulers for precedence-constrained tasks
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── model/          – serde input types (tasks, messages, nodes)
//! ├── graph/          – validated task DAG, ready sets, topological order
//! ├── platform/       – validated node set, speed factors, comm cost
//! ├── scheduler/      – EDF / LDF single-node, EDF / LDF / LL multi-node
//! ├── schedule/       – schedule assembly and invariant checks
//! ├── output          – output document shape validation
//! ├── config/         – YAML platform configuration
//! └── batch           – concurrent evaluation of many models
//! ```

pub mod batch;
pub mod config;
pub mod graph;
pub mod model;
pub mod output;
pub mod platform;
pub mod schedule;
pub mod scheduler;

pub use schedule::Schedule;
pub use scheduler::{Algorithm, DeadlinePolicy, Scheduler, SchedulerError};
