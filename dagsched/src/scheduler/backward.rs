/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Lawler's backward construction, shared by both LDF variants.
//!
//! The order is built from the **end** of the schedule: a task may be placed
//! last once all of its successors are already placed after it.  Among those
//! eligible tasks the one with the latest deadline goes last (ties: largest
//! id).  Reversing the result gives a forward order in which every task
//! follows all of its predecessors.
//!
//! On one processor this order minimises maximum lateness for
//! precedence-constrained instances (Lawler, 1973), which is why it is the
//! classical companion to EDF optimality proofs.

use std::collections::BinaryHeap;

use tracing::debug;

use crate::graph::{TaskGraph, TaskIndex};
use crate::model::Time;

use super::SchedulerError;

/// Forward execution order produced by backward construction.
///
/// # Errors
/// `Stalled` if some task never becomes eligible, which only happens for a
/// cyclic relation (already excluded by `TaskGraph::build`).
pub fn lawler_order(graph: &TaskGraph) -> Result<Vec<TaskIndex>, SchedulerError> {
    let n = graph.len();

    // Successors not yet placed in the reverse sequence, per task
    let mut unplaced_successors: Vec<usize> =
        (0..n).map(|i| graph.successors_of(i).len()).collect();

    // Max-heap on (deadline, index): largest deadline first, then largest id
    let mut eligible: BinaryHeap<(Time, TaskIndex)> = unplaced_successors
        .iter()
        .enumerate()
        .filter(|(_, &count)| count == 0)
        .map(|(i, _)| (graph.task(i).deadline, i))
        .collect();

    let mut reverse = Vec::with_capacity(n);
    while let Some((deadline, task)) = eligible.pop() {
        debug!(task = %graph.task(task).id, deadline, position = n - reverse.len(), "placed from the back");
        reverse.push(task);

        for pred in graph.predecessors_of(task) {
            let count = &mut unplaced_successors[pred.task];
            *count -= 1;
            if *count == 0 {
                eligible.push((graph.task(pred.task).deadline, pred.task));
            }
        }
    }

    if reverse.len() != n {
        return Err(SchedulerError::Stalled {
            remaining: n - reverse.len(),
        });
    }

    reverse.reverse();
    Ok(reverse)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MessageSpec, TaskSpec};

    fn ids(graph: &TaskGraph, order: &[TaskIndex]) -> Vec<String> {
        order.iter().map(|&i| graph.task(i).id.to_string()).collect()
    }

    #[test]
    fn independent_tasks_end_up_in_deadline_order() {
        let g = TaskGraph::build(
            &[
                TaskSpec::new("A", 4, 5),
                TaskSpec::new("B", 1, 2),
                TaskSpec::new("C", 2, 7),
            ],
            &[],
        )
        .unwrap();
        let order = lawler_order(&g).unwrap();
        assert_eq!(ids(&g, &order), vec!["B", "A", "C"]);
    }

    #[test]
    fn precedence_overrides_deadline() {
        // B has the earlier deadline but depends on A
        let g = TaskGraph::build(
            &[TaskSpec::new("A", 2, 10), TaskSpec::new("B", 3, 5)],
            &[MessageSpec::new("A", "B")],
        )
        .unwrap();
        let order = lawler_order(&g).unwrap();
        assert_eq!(ids(&g, &order), vec!["A", "B"]);
    }

    #[test]
    fn equal_deadlines_put_largest_id_last() {
        let g = TaskGraph::build(
            &[TaskSpec::new(0, 1, 9), TaskSpec::new(1, 1, 9), TaskSpec::new(2, 1, 9)],
            &[],
        )
        .unwrap();
        assert_eq!(lawler_order(&g).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn tight_successor_pulls_its_predecessor_forward() {
        // X → Y with Y due at 3; Z is independent, due at 4.
        // Backward: {Y, Z} eligible → Z (4) last, then Y, then X.
        let g = TaskGraph::build(
            &[
                TaskSpec::new("X", 1, 20),
                TaskSpec::new("Y", 2, 3),
                TaskSpec::new("Z", 1, 4),
            ],
            &[MessageSpec::new("X", "Y")],
        )
        .unwrap();
        assert_eq!(ids(&g, &lawler_order(&g).unwrap()), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn every_task_follows_its_predecessors() {
        let g = TaskGraph::build(
            &[
                TaskSpec::new(0, 1, 50),
                TaskSpec::new(1, 1, 3),
                TaskSpec::new(2, 1, 40),
                TaskSpec::new(3, 1, 2),
                TaskSpec::new(4, 1, 10),
            ],
            &[
                MessageSpec::new(0, 1),
                MessageSpec::new(0, 3),
                MessageSpec::new(2, 3),
                MessageSpec::new(3, 4),
            ],
        )
        .unwrap();
        let order = lawler_order(&g).unwrap();
        let position = |task: usize| order.iter().position(|&t| t == task).unwrap();
        for task in 0..g.len() {
            for pred in g.predecessors_of(task) {
                assert!(position(pred.task) < position(task));
            }
        }
    }
}
