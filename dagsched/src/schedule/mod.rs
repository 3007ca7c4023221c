/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedule output types and the schedule builder.
//!
//! Two representations model the two sides of an algorithm run:
//!
//! ```text
//! algorithm ──►  Vec<Placement>  ──(assemble)──►  Schedule  ──(serde)──►  output document
//!                 ↑ indices                         ↑ ids, sorted, validated
//! ```
//!
//! [`assemble`] is the only way a [`Schedule`] leaves the crate's algorithms:
//! it checks every structural invariant (see [`validate`]) before anything is
//! returned, so callers never observe a partial or corrupt schedule.

pub mod validate;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::graph::{TaskGraph, TaskIndex};
use crate::model::{Ident, Time};
use crate::platform::{NodeIndex, Platform};
use crate::scheduler::SchedulerError;

// ── Placement (algorithm output) ──────────────────────────────────────────────

/// One task placed in time, in index form.
///
/// `node` is `None` for single-node algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub task: TaskIndex,
    pub node: Option<NodeIndex>,
    pub start: Time,
    pub end: Time,
}

// ── ScheduleEntry / Schedule (output document) ───────────────────────────────

/// One row of the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub task_id: Ident,
    pub start_time: Time,
    pub end_time: Time,
    /// Present only for multi-node results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<Ident>,
}

/// A task that completes after its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineMiss {
    pub task_id: Ident,
    pub end_time: Time,
    pub deadline: Time,
}

impl DeadlineMiss {
    /// How late the task finishes.
    pub fn lateness(&self) -> Time {
        self.end_time.saturating_sub(self.deadline)
    }
}

impl fmt::Display for DeadlineMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task '{}' ends at {} after its deadline {} (late by {})",
            self.task_id,
            self.end_time,
            self.deadline,
            self.lateness()
        )
    }
}

/// Result of one scheduling call.
///
/// Serialises to exactly the output document:
/// `{ "name": ..., "schedule": [ { "task_id", "start_time", "end_time", "node_id"? } ] }`.
/// Deadline misses are kept alongside but are not part of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub name: String,
    /// Entries ordered by start time, then node, then task id.
    #[serde(rename = "schedule")]
    pub entries: Vec<ScheduleEntry>,
    #[serde(skip)]
    pub deadline_misses: Vec<DeadlineMiss>,
}

impl Schedule {
    /// Replace the run name (e.g. to append the model it was computed for).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// `true` when every task meets its deadline.
    pub fn is_feasible(&self) -> bool {
        self.deadline_misses.is_empty()
    }

    /// Completion time of the last task; `0` for an empty schedule.
    pub fn makespan(&self) -> Time {
        self.entries.iter().map(|e| e.end_time).max().unwrap_or(0)
    }

    pub fn entry_for(&self, task_id: &Ident) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| &e.task_id == task_id)
    }

    /// The output document as a JSON value.
    pub fn to_document(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "schedule": self.entries,
        })
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Validate `placements` and package them as a [`Schedule`].
///
/// `platform` is `Some` for multi-node runs; it supplies node ids and the
/// per-node execution time used by the duration check.
///
/// # Errors
/// `InvariantViolated` if the placements break duration exactness,
/// precedence, single occupancy, or completeness.  Deadline misses are **not**
/// errors here; they are recorded in [`Schedule::deadline_misses`] and logged.
pub fn assemble(
    name: impl Into<String>,
    graph: &TaskGraph,
    platform: Option<&Platform>,
    mut placements: Vec<Placement>,
) -> Result<Schedule, SchedulerError> {
    let name = name.into();

    validate::check_invariants(graph, platform, &placements)
        .map_err(SchedulerError::InvariantViolated)?;

    let deadline_misses = validate::deadline_misses(graph, &placements);
    for miss in &deadline_misses {
        warn!(
            schedule = %name,
            task     = %miss.task_id,
            end      = miss.end_time,
            deadline = miss.deadline,
            "deadline miss"
        );
    }

    placements.sort_by_key(|p| (p.start, p.node, p.task));

    let entries = placements
        .into_iter()
        .map(|p| ScheduleEntry {
            task_id: graph.task(p.task).id.clone(),
            start_time: p.start,
            end_time: p.end,
            node_id: match (p.node, platform) {
                (Some(node), Some(platform)) => Some(platform.node(node).id.clone()),
                _ => None,
            },
        })
        .collect();

    Ok(Schedule {
        name,
        entries,
        deadline_misses,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
