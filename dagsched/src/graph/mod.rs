/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Normalised task graph shared by all five algorithms.
//!
//! ```text
//! ApplicationModel ──(TaskGraph::build)──►  TaskGraph  ──(algorithm)──►  Vec<Placement>
//!   ids, JSON                                 indices, adjacency lists
//! ```
//!
//! # Representation
//! Tasks are stored in a `Vec` **sorted by id**, so a task's index is also its
//! tie-break rank: "smallest task id" is "smallest index" everywhere.  Edges
//! are index-based adjacency lists (`Vec<Vec<Dependency>>`), kept sorted by
//! peer index.  No pointers and no `Rc`; the graph is immutable after `build`
//! and can be shared across threads by reference.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use tracing::debug;

use crate::model::{Ident, MessageSpec, TaskSpec, Time};
use crate::scheduler::SchedulerError;

/// Position of a task inside a [`TaskGraph`].
pub type TaskIndex = usize;

// ── Task ──────────────────────────────────────────────────────────────────────

/// Validated task: `wcet > 0` and `deadline >= wcet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Ident,
    pub wcet: Time,
    pub deadline: Time,
}

impl Task {
    /// Slack left when started at `now` and run to completion on a unit-speed
    /// node.  Negative once a deadline miss is unavoidable.
    pub fn laxity_at(&self, now: Time) -> i128 {
        self.deadline as i128 - now as i128 - self.wcet as i128
    }
}

/// One end of a precedence edge, seen from the other end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    /// The task at the far end of the edge.
    pub task: TaskIndex,
    /// Delay added when the two tasks run on different nodes.
    pub comm_cost: Time,
}

// ── TaskGraph ─────────────────────────────────────────────────────────────────

/// Immutable, validated DAG of tasks.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    predecessors: Vec<Vec<Dependency>>,
    successors: Vec<Vec<Dependency>>,
}

impl TaskGraph {
    /// Normalise and validate an application model.
    ///
    /// Checks (in order):
    /// 1. Task ids are unique.
    /// 2. Every task has `wcet > 0` and `deadline >= wcet`.
    /// 3. Every message references known tasks.
    /// 4. The precedence relation is acyclic (self-messages included).
    ///
    /// Repeated messages between the same pair collapse into one edge that
    /// keeps the largest communication cost.
    ///
    /// # Errors
    /// `DuplicateTask`, `InvalidTask`, `DanglingEdge` or `CyclicGraph`.
    pub fn build(tasks: &[TaskSpec], messages: &[MessageSpec]) -> Result<Self, SchedulerError> {
        let mut sorted: Vec<Task> = tasks
            .iter()
            .map(|t| Task {
                id: t.id.clone(),
                wcet: t.wcet,
                deadline: t.deadline,
            })
            .collect();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        if let Some(pair) = sorted.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(SchedulerError::DuplicateTask {
                task: pair[0].id.clone(),
            });
        }

        for task in &sorted {
            if task.wcet == 0 {
                return Err(SchedulerError::InvalidTask {
                    task: task.id.clone(),
                    reason: "wcet must be positive".to_string(),
                });
            }
            if task.deadline < task.wcet {
                return Err(SchedulerError::InvalidTask {
                    task: task.id.clone(),
                    reason: format!(
                        "deadline {} is shorter than wcet {}",
                        task.deadline, task.wcet
                    ),
                });
            }
        }

        let n = sorted.len();
        let mut graph = TaskGraph {
            tasks: sorted,
            predecessors: vec![Vec::new(); n],
            successors: vec![Vec::new(); n],
        };

        // (sender, receiver) → cost; BTreeMap keeps adjacency lists sorted
        let mut edges: BTreeMap<(TaskIndex, TaskIndex), Time> = BTreeMap::new();
        for msg in messages {
            let sender = graph.resolve_endpoint(msg, &msg.sender)?;
            let receiver = graph.resolve_endpoint(msg, &msg.receiver)?;
            if sender == receiver {
                return Err(SchedulerError::CyclicGraph {
                    tasks: vec![msg.sender.clone()],
                });
            }
            edges
                .entry((sender, receiver))
                .and_modify(|cost| *cost = (*cost).max(msg.comm_cost))
                .or_insert(msg.comm_cost);
        }

        for ((sender, receiver), comm_cost) in edges {
            graph.successors[sender].push(Dependency {
                task: receiver,
                comm_cost,
            });
            graph.predecessors[receiver].push(Dependency {
                task: sender,
                comm_cost,
            });
        }

        let (_, unordered) = graph.kahn();
        if !unordered.is_empty() {
            return Err(SchedulerError::CyclicGraph {
                tasks: unordered
                    .into_iter()
                    .map(|i| graph.tasks[i].id.clone())
                    .collect(),
            });
        }

        debug!(
            tasks = graph.len(),
            edges = graph.edge_count(),
            "task graph built"
        );

        Ok(graph)
    }

    fn resolve_endpoint(&self, msg: &MessageSpec, id: &Ident) -> Result<TaskIndex, SchedulerError> {
        self.index_of(id)
            .ok_or_else(|| SchedulerError::DanglingEdge {
                sender: msg.sender.clone(),
                receiver: msg.receiver.clone(),
                missing: id.clone(),
            })
    }

    // ── Basic accessors ───────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    /// Task at `index`.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    pub fn task(&self, index: TaskIndex) -> &Task {
        &self.tasks[index]
    }

    /// All tasks in id order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Index of the task with `id`, if present.
    pub fn index_of(&self, id: &Ident) -> Option<TaskIndex> {
        self.tasks.binary_search_by(|t| t.id.cmp(id)).ok()
    }

    // ── Topological queries ───────────────────────────────────────────────────

    /// Incoming edges of `task`, sorted by predecessor index.
    pub fn predecessors_of(&self, task: TaskIndex) -> &[Dependency] {
        &self.predecessors[task]
    }

    /// Outgoing edges of `task`, sorted by successor index.
    pub fn successors_of(&self, task: TaskIndex) -> &[Dependency] {
        &self.successors[task]
    }

    /// Communication cost of the edge `sender → receiver`, or `None` if the
    /// two tasks are not directly connected.
    pub fn comm_cost(&self, sender: TaskIndex, receiver: TaskIndex) -> Option<Time> {
        self.successors[sender]
            .binary_search_by_key(&receiver, |d| d.task)
            .ok()
            .map(|i| self.successors[sender][i].comm_cost)
    }

    /// Tasks not yet `completed` whose every predecessor is `completed`, in
    /// ascending id order.
    ///
    /// `completed` is indexed by [`TaskIndex`] and must have `self.len()`
    /// entries.
    pub fn ready_set(&self, completed: &[bool]) -> Vec<TaskIndex> {
        debug_assert_eq!(completed.len(), self.len());
        (0..self.len())
            .filter(|&i| !completed[i])
            .filter(|&i| self.predecessors[i].iter().all(|p| completed[p.task]))
            .collect()
    }

    /// Deterministic topological order: among the tasks whose predecessors
    /// are all emitted, the smallest id goes first.
    pub fn topological_order(&self) -> Vec<TaskIndex> {
        self.kahn().0
    }

    /// Kahn's algorithm with a min-heap frontier.  Returns the order and the
    /// tasks that were never released (non-empty only for a cyclic relation).
    fn kahn(&self) -> (Vec<TaskIndex>, Vec<TaskIndex>) {
        let mut pending: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();
        let mut frontier: BinaryHeap<Reverse<TaskIndex>> = pending
            .iter()
            .enumerate()
            .filter(|(_, &count)| count == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(Reverse(task)) = frontier.pop() {
            order.push(task);
            for succ in &self.successors[task] {
                pending[succ.task] -= 1;
                if pending[succ.task] == 0 {
                    frontier.push(Reverse(succ.task));
                }
            }
        }

        let unordered = pending
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(i, _)| i)
            .collect();
        (order, unordered)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
