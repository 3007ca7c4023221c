/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Post-schedule invariant checks.
//!
//! Every produced set of placements must satisfy, simultaneously:
//!
//! | Invariant | Check |
//! |---|---|
//! | Completeness / uniqueness | every task placed exactly once |
//! | Duration exactness | `end - start == exec(task, node)` (`wcet` on a single node) |
//! | Precedence | `start(t) >= end(p) + comm_cost(p, t)` for every edge `p → t` |
//! | Single occupancy | entries sharing a node never overlap in `[start, end)` |
//!
//! Deadlines are checked separately by [`deadline_misses`]: the algorithms are
//! greedy heuristics and a miss is reported, not treated as a bug.

use std::collections::BTreeMap;

use crate::graph::TaskGraph;
use crate::model::Time;
use crate::platform::{NodeIndex, Platform};
use crate::scheduler::Violation;

use super::{DeadlineMiss, Placement};

// ── Public API ────────────────────────────────────────────────────────────────

/// Check the four structural invariants.  Returns the first violation found.
///
/// `platform` must be `Some` exactly when the placements carry nodes.
pub fn check_invariants(
    graph: &TaskGraph,
    platform: Option<&Platform>,
    placements: &[Placement],
) -> Result<(), Violation> {
    let by_task = index_by_task(graph, placements)?;

    for p in placements {
        let task = graph.task(p.task);

        let expected = match (p.node, platform) {
            (None, None) => Some(task.wcet),
            (Some(node), Some(platform)) if node < platform.len() => {
                platform.exec_time(task.wcet, node)
            }
            _ => return Err(Violation::NodeMismatch { task: task.id.clone() }),
        };
        if expected.is_none() || p.end.checked_sub(p.start) != expected {
            return Err(Violation::WrongDuration {
                task: task.id.clone(),
                start: p.start,
                end: p.end,
                expected: expected.unwrap_or(Time::MAX),
            });
        }

        for dep in graph.predecessors_of(p.task) {
            let pred = &by_task[dep.task];
            let delay = match (pred.node, p.node, platform) {
                (Some(from), Some(to), Some(platform)) => {
                    platform.comm_cost(dep.comm_cost, from, to)
                }
                _ => 0,
            };
            let available_at = pred.end.saturating_add(delay);
            if p.start < available_at {
                return Err(Violation::PrecedenceBroken {
                    sender: graph.task(dep.task).id.clone(),
                    receiver: task.id.clone(),
                    available_at,
                    start: p.start,
                });
            }
        }
    }

    check_occupancy(graph, platform, placements)
}

/// Every placement whose end time exceeds its task's deadline, in task-id
/// order.
pub fn deadline_misses(graph: &TaskGraph, placements: &[Placement]) -> Vec<DeadlineMiss> {
    let mut misses: Vec<(usize, DeadlineMiss)> = placements
        .iter()
        .filter_map(|p| {
            let task = graph.task(p.task);
            (p.end > task.deadline).then(|| {
                (
                    p.task,
                    DeadlineMiss {
                        task_id: task.id.clone(),
                        end_time: p.end,
                        deadline: task.deadline,
                    },
                )
            })
        })
        .collect();
    misses.sort_by_key(|(index, _)| *index);
    misses.into_iter().map(|(_, miss)| miss).collect()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// One placement per task, indexed by `TaskIndex`.
fn index_by_task<'a>(
    graph: &TaskGraph,
    placements: &'a [Placement],
) -> Result<Vec<&'a Placement>, Violation> {
    let mut slots: Vec<Option<&Placement>> = vec![None; graph.len()];
    for p in placements {
        let slot = &mut slots[p.task];
        if slot.is_some() {
            return Err(Violation::DuplicateEntry {
                task: graph.task(p.task).id.clone(),
            });
        }
        *slot = Some(p);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.ok_or_else(|| Violation::MissingTask {
                task: graph.task(i).id.clone(),
            })
        })
        .collect()
}

/// Sort each node's placements by start time and compare neighbours.
fn check_occupancy(
    graph: &TaskGraph,
    platform: Option<&Platform>,
    placements: &[Placement],
) -> Result<(), Violation> {
    let mut per_node: BTreeMap<Option<NodeIndex>, Vec<(Time, Time, usize)>> = BTreeMap::new();
    for p in placements {
        per_node
            .entry(p.node)
            .or_default()
            .push((p.start, p.end, p.task));
    }

    for (node, mut intervals) in per_node {
        intervals.sort_unstable();
        for pair in intervals.windows(2) {
            let (_, prev_end, prev_task) = pair[0];
            let (next_start, _, next_task) = pair[1];
            if next_start < prev_end {
                return Err(Violation::Overlap {
                    node: node
                        .zip(platform)
                        .map(|(n, platform)| platform.node(n).id.clone()),
                    first: graph.task(prev_task).id.clone(),
                    second: graph.task(next_task).id.clone(),
                });
            }
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
