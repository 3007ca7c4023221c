/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the dagsched schedulers.
//!
//! Two error enums model the two failure layers:
//!
//! * [`Violation`] — which invariant a produced schedule breaks (low-level,
//!   carries the exact task, node and time values).
//! * [`SchedulerError`] — top-level failure returned from
//!   [`Scheduler::schedule()`](super::Scheduler::schedule) and from the model
//!   builders.
//!
//! Every fatal variant is raised before any schedule entry is handed back, so
//! a caller never sees a partial schedule.

use thiserror::Error;

use crate::model::{Ident, Time};
use crate::schedule::DeadlineMiss;

// ── Schedule invariant violations ─────────────────────────────────────────────

/// Invariant broken by a set of placements.
///
/// Carried inside [`SchedulerError::InvariantViolated`].  A correct algorithm
/// never produces one of these; seeing one means a scheduler bug, not a bad
/// input model.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// A task of the graph has no schedule entry.
    MissingTask { task: Ident },

    /// A task has more than one schedule entry.
    DuplicateEntry { task: Ident },

    /// `end_time - start_time` differs from the task's execution time on the
    /// node it was placed on.
    WrongDuration {
        task: Ident,
        start: Time,
        end: Time,
        expected: Time,
    },

    /// A receiver starts before its sender's result is available.
    PrecedenceBroken {
        sender: Ident,
        receiver: Ident,
        available_at: Time,
        start: Time,
    },

    /// Two entries share a node and their `[start, end)` intervals intersect.
    Overlap {
        node: Option<Ident>,
        first: Ident,
        second: Ident,
    },

    /// A single-node entry carries a node, or a multi-node entry lacks one.
    NodeMismatch { task: Ident },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::MissingTask { task } => {
                write!(f, "task '{}' has no schedule entry", task)
            }

            Violation::DuplicateEntry { task } => {
                write!(f, "task '{}' is scheduled more than once", task)
            }

            Violation::WrongDuration {
                task,
                start,
                end,
                expected,
            } => write!(
                f,
                "task '{}' runs [{}, {}) but its execution time is {}",
                task, start, end, expected
            ),

            Violation::PrecedenceBroken {
                sender,
                receiver,
                available_at,
                start,
            } => write!(
                f,
                "task '{}' starts at {} but the result of '{}' is only available at {}",
                receiver, start, sender, available_at
            ),

            Violation::Overlap {
                node: Some(node),
                first,
                second,
            } => write!(
                f,
                "tasks '{}' and '{}' overlap on node '{}'",
                first, second, node
            ),

            Violation::Overlap {
                node: None,
                first,
                second,
            } => write!(f, "tasks '{}' and '{}' overlap", first, second),

            Violation::NodeMismatch { task } => write!(
                f,
                "task '{}' has a node assignment inconsistent with the algorithm kind",
                task
            ),
        }
    }
}

// ── Top-level scheduler errors ────────────────────────────────────────────────

/// Top-level error type returned by the model builders and by
/// [`Scheduler::schedule()`](super::Scheduler::schedule).
///
/// | Variant | Raised by |
/// |---|---|
/// | `CyclicGraph` / `DanglingEdge` / `DuplicateTask` / `InvalidTask` | [`TaskGraph::build`](crate::graph::TaskGraph::build) |
/// | `EmptyPlatform` / `DuplicateNode` / `InvalidSpeedFactor` | [`Platform::build`](crate::platform::Platform::build) |
/// | `Stalled` / `TimeOverflow` / `InvariantViolated` | the algorithms and the schedule builder |
/// | `Infeasible` | [`DeadlinePolicy::Reject`](super::DeadlinePolicy::Reject) |
/// | `UnknownAlgorithm` | `Algorithm::from_str` |
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The precedence relation is not a DAG.  `tasks` lists every task that
    /// could not be topologically ordered (the cycle and everything behind it).
    #[error("precedence graph is cyclic — tasks that cannot be ordered: {}", join_idents(.tasks))]
    CyclicGraph { tasks: Vec<Ident> },

    /// A message names a task id that is not part of the application model.
    #[error("message '{sender}' -> '{receiver}' references unknown task '{missing}'")]
    DanglingEdge {
        sender: Ident,
        receiver: Ident,
        missing: Ident,
    },

    /// Two tasks share the same id.
    #[error("task id '{task}' is declared more than once")]
    DuplicateTask { task: Ident },

    /// A task breaks `wcet > 0` or `deadline >= wcet`.
    #[error("task '{task}' is invalid: {reason}")]
    InvalidTask { task: Ident, reason: String },

    /// A multi-node algorithm was called with no nodes (or no platform at all).
    #[error("platform has no nodes — multi-node algorithms need at least one")]
    EmptyPlatform,

    /// Two nodes share the same id.
    #[error("node id '{node}' is declared more than once")]
    DuplicateNode { node: Ident },

    /// A node's speed factor is zero, negative, or not a finite number.
    #[error("node '{node}' has invalid speed factor {factor} (must be finite and > 0)")]
    InvalidSpeedFactor { node: Ident, factor: f64 },

    /// The ready set emptied while tasks were still unscheduled.
    ///
    /// Unreachable for a graph that passed `TaskGraph::build`; kept as an
    /// error instead of a panic so a broken invariant never aborts the caller.
    #[error("scheduling stalled with {remaining} task(s) never becoming ready")]
    Stalled { remaining: usize },

    /// A start or end time of `task` does not fit in [`Time`].
    #[error("time overflow while placing task '{task}'")]
    TimeOverflow { task: Ident },

    /// The produced schedule broke a structural invariant.
    #[error("schedule invariant violated: {0}")]
    InvariantViolated(Violation),

    /// At least one task finishes after its deadline and the caller asked for
    /// [`DeadlinePolicy::Reject`](super::DeadlinePolicy::Reject).
    #[error("schedule '{name}' misses {} deadline(s), first: {}", .misses.len(), first_miss(.misses))]
    Infeasible {
        name: String,
        misses: Vec<DeadlineMiss>,
    },

    /// The algorithm name is not one of the five known variants.
    #[error("unknown scheduling algorithm: '{0}' (valid: edf_single_node, ldf_single_node, edf_multinode, ldf_multinode, ll_multinode)")]
    UnknownAlgorithm(String),
}

fn join_idents(ids: &[Ident]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_miss(misses: &[DeadlineMiss]) -> String {
    misses
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "none".to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_graph_lists_every_task() {
        let err = SchedulerError::CyclicGraph {
            tasks: vec![Ident::Num(1), Ident::Name("b".into())],
        };
        assert_eq!(
            err.to_string(),
            "precedence graph is cyclic — tasks that cannot be ordered: 1, b"
        );
    }

    #[test]
    fn infeasible_reports_first_miss() {
        let err = SchedulerError::Infeasible {
            name: "ldf_single_node".into(),
            misses: vec![DeadlineMiss {
                task_id: Ident::Name("B".into()),
                end_time: 5,
                deadline: 2,
            }],
        };
        let msg = err.to_string();
        assert!(msg.contains("misses 1 deadline(s)"), "{msg}");
        assert!(msg.contains("'B'"), "{msg}");
    }

    #[test]
    fn overlap_without_node_omits_node_name() {
        let v = Violation::Overlap {
            node: None,
            first: Ident::Num(0),
            second: Ident::Num(1),
        };
        assert_eq!(v.to_string(), "tasks '0' and '1' overlap");
    }

    #[test]
    fn wrong_duration_carries_exact_values() {
        let v = Violation::WrongDuration {
            task: Ident::Num(3),
            start: 2,
            end: 4,
            expected: 3,
        };
        assert_eq!(
            v.to_string(),
            "task '3' runs [2, 4) but its execution time is 3"
        );
    }
}
