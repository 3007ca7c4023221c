/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Multi-node schedulers: EDF, LDF and Least-Laxity-First.
//!
//! All three share one node-assignment rule.  For a task `t` and node `n`:
//!
//! ```text
//! earliest_start(t, n) = max( free_at[n],
//!                             max over p → t of  end(p) + comm_cost(p, t, node(p), n) )
//! ```
//!
//! The task goes to the node with the smallest earliest start (ties: smallest
//! node id) and occupies it for `exec_time(wcet, n)`.  The algorithms differ
//! only in *which* task is placed next:
//!
//! | Algorithm | Next task |
//! |---|---|
//! | EDF | ready task with the smallest deadline |
//! | LDF | next task of the backward-construction order |
//! | LL  | task ready at the simulated clock with the smallest laxity |

use tracing::{debug, info};

use crate::graph::{TaskGraph, TaskIndex};
use crate::model::Time;
use crate::platform::{NodeIndex, Platform};
use crate::schedule::Placement;

use super::backward::lawler_order;
use super::SchedulerError;

// ── Per-call node state ───────────────────────────────────────────────────────

/// Simulated per-node clocks and the placements made so far.
///
/// Owned by one scheduling call and dropped at its end.
struct Timeline<'a> {
    graph: &'a TaskGraph,
    platform: &'a Platform,
    /// node → time at which the node becomes free.
    free_at: Vec<Time>,
    /// task → its placement, once made.
    placed: Vec<Option<Placement>>,
    order: Vec<Placement>,
}

impl<'a> Timeline<'a> {
    fn new(graph: &'a TaskGraph, platform: &'a Platform) -> Self {
        Self {
            graph,
            platform,
            free_at: vec![0; platform.len()],
            placed: vec![None; graph.len()],
            order: Vec::with_capacity(graph.len()),
        }
    }

    fn is_placed(&self, task: TaskIndex) -> bool {
        self.placed[task].is_some()
    }

    fn remaining(&self) -> usize {
        self.graph.len() - self.order.len()
    }

    /// Earliest start of `task` on `node`.  Every predecessor must already be
    /// placed.  `None` if a message arrival time does not fit in [`Time`].
    fn earliest_start(&self, task: TaskIndex, node: NodeIndex) -> Option<Time> {
        self.graph
            .predecessors_of(task)
            .iter()
            .filter_map(|dep| {
                debug_assert!(self.is_placed(dep.task), "predecessor placed first");
                self.placed[dep.task].map(|pred| {
                    let from = pred.node.unwrap_or(node);
                    pred.end
                        .checked_add(self.platform.comm_cost(dep.comm_cost, from, node))
                })
            })
            .try_fold(self.free_at[node], |start, arrival| Some(start.max(arrival?)))
    }

    /// Node with the smallest earliest start for `task`; ties go to the
    /// smallest node id.  Nodes whose start overflows are skipped.
    fn best_node(&self, task: TaskIndex) -> Option<(NodeIndex, Time)> {
        (0..self.platform.len())
            .filter_map(|node| Some((node, self.earliest_start(task, node)?)))
            .min_by_key(|&(node, start)| (start, node))
    }

    /// Place `task` on its best node and advance that node's clock.
    fn place(&mut self, task: TaskIndex) -> Result<Placement, SchedulerError> {
        let t = self.graph.task(task);
        let overflow = || SchedulerError::TimeOverflow { task: t.id.clone() };

        let (node, start) = self.best_node(task).ok_or_else(overflow)?;
        let end = self
            .platform
            .exec_time(t.wcet, node)
            .and_then(|exec| start.checked_add(exec))
            .ok_or_else(overflow)?;

        let placement = Placement {
            task,
            node: Some(node),
            start,
            end,
        };
        self.free_at[node] = end;
        self.placed[task] = Some(placement);
        self.order.push(placement);

        debug!(
            task     = %t.id,
            node     = %self.platform.node(node).id,
            start    = start,
            end      = end,
            deadline = t.deadline,
            "✓ scheduled"
        );
        Ok(placement)
    }

    /// Unplaced tasks whose predecessors have all completed by `now`.
    fn ready_at(&self, now: Time) -> Vec<TaskIndex> {
        let completed: Vec<bool> = self
            .placed
            .iter()
            .map(|p| matches!(p, Some(p) if p.end <= now))
            .collect();
        self.graph
            .ready_set(&completed)
            .into_iter()
            .filter(|&task| !self.is_placed(task))
            .collect()
    }

    /// Smallest node-free or task-completion time strictly after `now`.
    fn next_event_after(&self, now: Time) -> Option<Time> {
        self.free_at
            .iter()
            .copied()
            .chain(self.order.iter().map(|p| p.end))
            .filter(|&t| t > now)
            .min()
    }

    fn into_placements(self) -> Vec<Placement> {
        self.order
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EDF
// ─────────────────────────────────────────────────────────────────────────────

/// Earliest Deadline First across all nodes.
///
/// Priority is global: the ready task with the smallest deadline (ties:
/// smallest id) is placed next, wherever it can start earliest.  A task is
/// ready once all of its predecessors have been placed.
pub fn edf(graph: &TaskGraph, platform: &Platform) -> Result<Vec<Placement>, SchedulerError> {
    info!(
        tasks = graph.len(),
        nodes = platform.len(),
        "Executing edf_multinode algorithm"
    );

    let mut timeline = Timeline::new(graph, platform);
    let mut completed = vec![false; graph.len()];

    while timeline.remaining() > 0 {
        let next = graph
            .ready_set(&completed)
            .into_iter()
            .min_by_key(|&i| (graph.task(i).deadline, i))
            .ok_or(SchedulerError::Stalled {
                remaining: timeline.remaining(),
            })?;

        timeline.place(next)?;
        completed[next] = true;
    }

    Ok(timeline.into_placements())
}

// ─────────────────────────────────────────────────────────────────────────────
// LDF
// ─────────────────────────────────────────────────────────────────────────────

/// Latest Deadline First across all nodes.
///
/// Tasks are placed in the fixed [`lawler_order`]; that order already puts
/// every task after its predecessors, so readiness is not re-derived.
pub fn ldf(graph: &TaskGraph, platform: &Platform) -> Result<Vec<Placement>, SchedulerError> {
    info!(
        tasks = graph.len(),
        nodes = platform.len(),
        "Executing ldf_multinode algorithm"
    );

    let mut timeline = Timeline::new(graph, platform);
    for task in lawler_order(graph)? {
        timeline.place(task)?;
    }
    Ok(timeline.into_placements())
}

// ─────────────────────────────────────────────────────────────────────────────
// LL
// ─────────────────────────────────────────────────────────────────────────────

/// Least Laxity First across all nodes, non-preemptive.
///
/// A simulated clock moves between decision points (time 0, node-free times
/// and task completions).  At each point, while some node is free and some
/// task is ready (all predecessors completed by `now`), the ready task with
/// the smallest `deadline - now - wcet` is placed (ties: smallest id).  The
/// chosen task runs to completion; laxity is never re-evaluated mid-run.
pub fn llf(graph: &TaskGraph, platform: &Platform) -> Result<Vec<Placement>, SchedulerError> {
    info!(
        tasks = graph.len(),
        nodes = platform.len(),
        "Executing ll_multinode algorithm"
    );

    let mut timeline = Timeline::new(graph, platform);
    let mut now: Time = 0;

    while timeline.remaining() > 0 {
        let node_free = timeline.free_at.iter().any(|&t| t <= now);
        let next = if node_free {
            timeline
                .ready_at(now)
                .into_iter()
                .min_by_key(|&i| (graph.task(i).laxity_at(now), i))
        } else {
            None
        };

        match next {
            Some(task) => {
                debug!(
                    task   = %graph.task(task).id,
                    now    = now,
                    laxity = graph.task(task).laxity_at(now) as i64,
                    "least laxity"
                );
                timeline.place(task)?;
            }
            None => {
                now = timeline
                    .next_event_after(now)
                    .ok_or(SchedulerError::Stalled {
                        remaining: timeline.remaining(),
                    })?;
            }
        }
    }

    Ok(timeline.into_placements())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ident, MessageSpec, NodeSpec, TaskSpec};

    type Algo = fn(&TaskGraph, &Platform) -> Result<Vec<Placement>, SchedulerError>;
    const ALL: [(&str, Algo); 3] = [("edf", edf), ("ldf", ldf), ("llf", llf)];

    fn nodes(n: u64) -> Platform {
        let specs: Vec<NodeSpec> = (0..n).map(NodeSpec::new).collect();
        Platform::build(&specs).unwrap()
    }

    /// `(task id, node id, start, end)` sorted by task id.
    fn rows(graph: &TaskGraph, platform: &Platform, ps: &[Placement]) -> Vec<(String, String, Time, Time)> {
        let mut rows: Vec<_> = ps
            .iter()
            .map(|p| {
                (
                    graph.task(p.task).id.to_string(),
                    platform.node(p.node.unwrap()).id.to_string(),
                    p.start,
                    p.end,
                )
            })
            .collect();
        rows.sort();
        rows
    }

    fn row(task: &str, node: &str, start: Time, end: Time) -> (String, String, Time, Time) {
        (task.into(), node.into(), start, end)
    }

    #[test]
    fn independent_tasks_spread_across_nodes() {
        let g = TaskGraph::build(
            &[
                TaskSpec::new("a", 4, 6),
                TaskSpec::new("b", 1, 2),
                TaskSpec::new("c", 2, 7),
            ],
            &[],
        )
        .unwrap();
        let p = nodes(2);
        let expected = vec![row("a", "1", 0, 4), row("b", "0", 0, 1), row("c", "0", 1, 3)];
        for (name, algo) in ALL {
            assert_eq!(rows(&g, &p, &algo(&g, &p).unwrap()), expected, "{name}");
        }
    }

    #[test]
    fn comm_cost_keeps_receiver_on_sender_node() {
        // 0 → 1 costs 5 across nodes; staying on node 0 is earlier.
        let g = TaskGraph::build(
            &[TaskSpec::new(0, 2, 20), TaskSpec::new(1, 2, 20)],
            &[MessageSpec::new(0, 1).with_comm_cost(5)],
        )
        .unwrap();
        let p = nodes(2);
        for (name, algo) in ALL {
            assert_eq!(
                rows(&g, &p, &algo(&g, &p).unwrap()),
                vec![row("0", "0", 0, 2), row("1", "0", 2, 4)],
                "{name}"
            );
        }
    }

    #[test]
    fn busy_node_makes_crossing_worth_the_cost() {
        // 0 → 1 (cost 1) and 0 → 2 (cost 1); one of the children must cross.
        let g = TaskGraph::build(
            &[
                TaskSpec::new(0, 2, 20),
                TaskSpec::new(1, 4, 12),
                TaskSpec::new(2, 3, 10),
            ],
            &[
                MessageSpec::new(0, 1).with_comm_cost(1),
                MessageSpec::new(0, 2).with_comm_cost(1),
            ],
        )
        .unwrap();
        let p = nodes(2);
        let ps = edf(&g, &p).unwrap();
        assert_eq!(
            rows(&g, &p, &ps),
            vec![row("0", "0", 0, 2), row("1", "1", 3, 7), row("2", "0", 2, 5)]
        );
    }

    #[test]
    fn fast_node_shortens_execution() {
        let g = TaskGraph::build(&[TaskSpec::new(0, 8, 20)], &[]).unwrap();
        let p = Platform::build(&[NodeSpec::new(0), NodeSpec::new(1).with_speed_factor(2.0)])
            .unwrap();
        for (name, algo) in ALL {
            // Both nodes are free at 0; the tie goes to node 0 even though
            // node 1 would finish earlier.  The rule minimises start time.
            assert_eq!(
                rows(&g, &p, &algo(&g, &p).unwrap()),
                vec![row("0", "0", 0, 8)],
                "{name}"
            );
        }
    }

    #[test]
    fn speed_factor_applies_once_node_zero_is_busy() {
        let g = TaskGraph::build(&[TaskSpec::new(0, 8, 20), TaskSpec::new(1, 8, 20)], &[])
            .unwrap();
        let p = Platform::build(&[NodeSpec::new(0), NodeSpec::new(1).with_speed_factor(2.0)])
            .unwrap();
        assert_eq!(
            rows(&g, &p, &edf(&g, &p).unwrap()),
            vec![row("0", "0", 0, 8), row("1", "1", 0, 4)]
        );
    }

    #[test]
    fn edf_orders_globally_by_deadline() {
        let g = TaskGraph::build(
            &[
                TaskSpec::new(0, 3, 30),
                TaskSpec::new(1, 3, 4),
                TaskSpec::new(2, 3, 8),
            ],
            &[],
        )
        .unwrap();
        let p = nodes(1);
        let order: Vec<usize> = edf(&g, &p).unwrap().iter().map(|pl| pl.task).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn ll_prefers_smallest_laxity_over_smallest_deadline() {
        // Deadlines: x 10, y 11.  Laxity at 0: x 10-0-1 = 9, y 11-0-8 = 3.
        let g = TaskGraph::build(&[TaskSpec::new("x", 1, 10), TaskSpec::new("y", 8, 11)], &[])
            .unwrap();
        let p = nodes(1);

        let ll: Vec<Ident> = llf(&g, &p)
            .unwrap()
            .iter()
            .map(|pl| g.task(pl.task).id.clone())
            .collect();
        assert_eq!(ll, vec![Ident::from("y"), Ident::from("x")]);

        let edf_order: Vec<Ident> = edf(&g, &p)
            .unwrap()
            .iter()
            .map(|pl| g.task(pl.task).id.clone())
            .collect();
        assert_eq!(edf_order, vec![Ident::from("x"), Ident::from("y")]);
    }

    #[test]
    fn ll_waits_for_completion_before_releasing_successors() {
        // 0 → 2 ; 1 independent and long.  Node 1 idles until 0 completes.
        let g = TaskGraph::build(
            &[
                TaskSpec::new(0, 2, 20),
                TaskSpec::new(1, 6, 20),
                TaskSpec::new(2, 1, 20),
            ],
            &[MessageSpec::new(0, 2).with_comm_cost(3)],
        )
        .unwrap();
        let p = nodes(2);
        assert_eq!(
            rows(&g, &p, &llf(&g, &p).unwrap()),
            vec![row("0", "1", 0, 2), row("1", "0", 0, 6), row("2", "1", 2, 3)]
        );
    }

    #[test]
    fn ldf_places_in_backward_order() {
        let g = TaskGraph::build(
            &[
                TaskSpec::new("A", 1, 10),
                TaskSpec::new("B", 1, 5),
                TaskSpec::new("C", 1, 2),
            ],
            &[MessageSpec::new("A", "C")],
        )
        .unwrap();
        let p = nodes(1);
        let order: Vec<String> = ldf(&g, &p)
            .unwrap()
            .iter()
            .map(|pl| g.task(pl.task).id.to_string())
            .collect();
        assert_eq!(order, vec!["A", "C", "B"]);
    }

    #[test]
    fn equal_priority_ties_go_to_smallest_task_id() {
        // Declared "z" first; equal deadline, wcet and laxity.
        let g = TaskGraph::build(&[TaskSpec::new("z", 2, 10), TaskSpec::new("a", 2, 10)], &[])
            .unwrap();
        let p = nodes(1);
        for (name, algo) in ALL {
            let order: Vec<(String, Time)> = algo(&g, &p)
                .unwrap()
                .iter()
                .map(|pl| (g.task(pl.task).id.to_string(), pl.start))
                .collect();
            assert_eq!(order, vec![("a".to_string(), 0), ("z".to_string(), 2)], "{name}");
        }
    }

    #[test]
    fn unrepresentable_exec_time_is_an_overflow() {
        let g = TaskGraph::build(&[TaskSpec::new(0, 1, 1), TaskSpec::new(1, 1, 1)], &[]).unwrap();
        let p = Platform::build(&[NodeSpec::new(0).with_speed_factor(1e-30)]).unwrap();
        for (name, algo) in ALL {
            let err = algo(&g, &p).unwrap_err();
            assert!(
                matches!(&err, SchedulerError::TimeOverflow { task } if *task == Ident::Num(0)),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn end_time_past_time_range_is_an_overflow() {
        let half = 1u64 << 63;
        let g = TaskGraph::build(&[TaskSpec::new(0, half, half), TaskSpec::new(1, half, half)], &[])
            .unwrap();
        let p = nodes(1);
        for (name, algo) in ALL {
            let err = algo(&g, &p).unwrap_err();
            assert!(
                matches!(&err, SchedulerError::TimeOverflow { task } if *task == Ident::Num(1)),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn empty_graph_yields_no_placements() {
        let g = TaskGraph::build(&[], &[]).unwrap();
        let p = nodes(3);
        for (name, algo) in ALL {
            assert!(algo(&g, &p).unwrap().is_empty(), "{name}");
        }
    }
}
