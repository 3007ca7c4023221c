/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Normalised platform: the node set multi-node algorithms place tasks on.
//!
//! Like [`TaskGraph`](crate::graph::TaskGraph), nodes are stored sorted by id
//! so "smallest node id" is "smallest index".

use tracing::debug;

use crate::model::{Ident, NodeSpec, Time};
use crate::scheduler::SchedulerError;

/// Position of a node inside a [`Platform`].
pub type NodeIndex = usize;

/// Speed used when a node does not declare one.
pub const DEFAULT_SPEED_FACTOR: f64 = 1.0;

/// A validated processing node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: Ident,
    /// Relative speed, finite and `> 0`.  `2.0` halves execution times.
    pub speed_factor: f64,
}

/// Immutable, validated node set.
#[derive(Debug, Clone)]
pub struct Platform {
    nodes: Vec<Node>,
}

impl Platform {
    /// Normalise and validate a platform model.
    ///
    /// # Errors
    /// * `EmptyPlatform` — `nodes` is empty.
    /// * `DuplicateNode` — two nodes share an id.
    /// * `InvalidSpeedFactor` — a factor is not finite and positive.
    pub fn build(nodes: &[NodeSpec]) -> Result<Self, SchedulerError> {
        if nodes.is_empty() {
            return Err(SchedulerError::EmptyPlatform);
        }

        let mut sorted = Vec::with_capacity(nodes.len());
        for spec in nodes {
            let speed_factor = spec.speed_factor.unwrap_or(DEFAULT_SPEED_FACTOR);
            if !speed_factor.is_finite() || speed_factor <= 0.0 {
                return Err(SchedulerError::InvalidSpeedFactor {
                    node: spec.id.clone(),
                    factor: speed_factor,
                });
            }
            sorted.push(Node {
                id: spec.id.clone(),
                speed_factor,
            });
        }
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        if let Some(pair) = sorted.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(SchedulerError::DuplicateNode {
                node: pair[0].id.clone(),
            });
        }

        debug!(nodes = sorted.len(), "platform built");
        Ok(Self { nodes: sorted })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false` for a platform produced by [`build`](Self::build).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node at `index`.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    pub fn index_of(&self, id: &Ident) -> Option<NodeIndex> {
        self.nodes.binary_search_by(|n| n.id.cmp(id)).ok()
    }

    /// Time a task with `wcet` occupies `node`: `ceil(wcet / speed_factor)`.
    ///
    /// Exactly `wcet` on a unit-speed node.  Rounded up otherwise, so a fast
    /// node never reports less than the true runtime.  `None` if the scaled
    /// time does not fit in [`Time`].
    pub fn exec_time(&self, wcet: Time, node: NodeIndex) -> Option<Time> {
        let speed = self.nodes[node].speed_factor;
        if speed == DEFAULT_SPEED_FACTOR {
            return Some(wcet);
        }
        let scaled = (wcet as f64 / speed).ceil();
        // Time::MAX as f64 rounds up to 2^64, the first value that does not fit
        (scaled < Time::MAX as f64).then_some(scaled as Time)
    }

    /// Communication delay for an edge with cost `edge_cost` when the sender
    /// ran on `from` and the receiver runs on `to`.  Free on the same node.
    pub fn comm_cost(&self, edge_cost: Time, from: NodeIndex, to: NodeIndex) -> Time {
        if from == to {
            0
        } else {
            edge_cost
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
