/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Single-node list schedulers: EDF and LDF.
//!
//! Both run tasks back to back from `t = 0` on one implicit resource; they
//! differ only in how the execution order is chosen.

use tracing::{debug, info};

use crate::graph::{TaskGraph, TaskIndex};
use crate::model::Time;
use crate::schedule::Placement;

use super::backward::lawler_order;
use super::SchedulerError;

/// Earliest Deadline First on one node.
///
/// At every step the ready task with the smallest deadline (ties: smallest
/// id) starts as soon as the previous one ends.  For a validated DAG the
/// ready set is never empty while tasks remain, so no idle gaps appear.
pub fn edf(graph: &TaskGraph) -> Result<Vec<Placement>, SchedulerError> {
    info!(tasks = graph.len(), "Executing edf_single_node algorithm");

    let n = graph.len();
    let mut completed = vec![false; n];
    let mut placements = Vec::with_capacity(n);
    let mut now: Time = 0;

    while placements.len() < n {
        let next = graph
            .ready_set(&completed)
            .into_iter()
            .min_by_key(|&i| (graph.task(i).deadline, i))
            .ok_or(SchedulerError::Stalled {
                remaining: n - placements.len(),
            })?;

        let placement = run_next(graph, next, now)?;
        now = placement.end;
        completed[next] = true;
        placements.push(placement);
    }

    Ok(placements)
}

/// Latest Deadline First on one node.
///
/// The order comes from [`lawler_order`]; timing is assigned sequentially
/// from `t = 0` exactly as for EDF.
pub fn ldf(graph: &TaskGraph) -> Result<Vec<Placement>, SchedulerError> {
    info!(tasks = graph.len(), "Executing ldf_single_node algorithm");

    let order = lawler_order(graph)?;
    let mut now: Time = 0;
    order
        .into_iter()
        .map(|task| {
            let placement = run_next(graph, task, now)?;
            now = placement.end;
            Ok(placement)
        })
        .collect()
}

fn run_next(graph: &TaskGraph, task: TaskIndex, now: Time) -> Result<Placement, SchedulerError> {
    let t = graph.task(task);
    let end = now
        .checked_add(t.wcet)
        .ok_or_else(|| SchedulerError::TimeOverflow { task: t.id.clone() })?;
    debug!(
        task     = %t.id,
        start    = now,
        end      = end,
        deadline = t.deadline,
        "✓ scheduled"
    );
    Ok(Placement {
        task,
        node: None,
        start: now,
        end,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
