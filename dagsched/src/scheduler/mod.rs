//! Scheduler entry point and algorithm dispatch.
//!
//! [`Scheduler`] normalises an [`ApplicationModel`] (and, for multi-node
//! algorithms, a [`PlatformModel`]), runs one of five non-preemptive
//! algorithms over the resulting [`TaskGraph`], and returns a validated
//! [`Schedule`].
//!
//! | Algorithm | Kind | Ordering rule |
//! |---|---|---|
//! | `edf_single_node` | single | ready task with smallest deadline |
//! | `ldf_single_node` | single | Lawler backward construction |
//! | `edf_multinode`   | multi  | global smallest deadline, earliest-start node |
//! | `ldf_multinode`   | multi  | Lawler order, earliest-start node |
//! | `ll_multinode`    | multi  | smallest laxity at each decision point |
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | Selection | Closed [`Algorithm`] enum; each variant maps to a [`Strategy`] whose fn signature states whether a platform is needed |
//! | State | Stateless `schedule()` — graph, platform and node clocks live for one call |
//! | Determinism | Tasks and nodes sorted by id; every tie broken by index |
//! | Deadlines | Reported by default; [`DeadlinePolicy::Reject`] turns a miss into an error |
//! | Thread safety | `Send + Sync`, no interior mutability — independent calls may run in parallel |
//!
//! # Example
//! ```rust
//! use dagsched::model::{ApplicationModel, MessageSpec, TaskSpec};
//! use dagsched::scheduler::{Algorithm, Scheduler};
//!
//! let app = ApplicationModel {
//!     tasks: vec![TaskSpec::new("A", 2, 10), TaskSpec::new("B", 3, 10)],
//!     messages: vec![MessageSpec::new("A", "B")],
//! };
//! let schedule = Scheduler::new()
//!     .schedule(Algorithm::EdfSingleNode, &app, None)
//!     .unwrap();
//! assert_eq!(schedule.makespan(), 5);
//! ```

pub mod backward;
pub mod error;
pub mod multi_node;
pub mod single_node;

pub use error::{SchedulerError, Violation};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::graph::TaskGraph;
use crate::model::{ApplicationModel, PlatformModel};
use crate::platform::Platform;
use crate::schedule::{self, Placement, Schedule};

/// What an algorithm returns: one placement per task, in placement order.
pub type PlacementResult = Result<Vec<Placement>, SchedulerError>;

// ── Algorithm ─────────────────────────────────────────────────────────────────

/// The five supported scheduling algorithms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Earliest Deadline First on one node.
    #[value(name = "edf_single_node")]
    EdfSingleNode,
    /// Latest Deadline First (Lawler) on one node.
    #[value(name = "ldf_single_node")]
    LdfSingleNode,
    /// Earliest Deadline First across the platform.
    #[serde(rename = "edf_multinode")]
    #[value(name = "edf_multinode")]
    EdfMultiNode,
    /// Latest Deadline First (Lawler order) across the platform.
    #[serde(rename = "ldf_multinode")]
    #[value(name = "ldf_multinode")]
    LdfMultiNode,
    /// Least Laxity First across the platform.
    #[serde(rename = "ll_multinode")]
    #[value(name = "ll_multinode")]
    LlMultiNode,
}

/// How an algorithm consumes the models.
///
/// The fn-pointer signature is the contract: a single-node strategy never
/// sees a platform, a multi-node strategy always gets a validated one.
#[derive(Clone, Copy)]
pub enum Strategy {
    SingleNode(fn(&TaskGraph) -> PlacementResult),
    MultiNode(fn(&TaskGraph, &Platform) -> PlacementResult),
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::EdfSingleNode,
        Algorithm::LdfSingleNode,
        Algorithm::EdfMultiNode,
        Algorithm::LdfMultiNode,
        Algorithm::LlMultiNode,
    ];

    /// Stable name, also used as the default schedule name.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::EdfSingleNode => "edf_single_node",
            Algorithm::LdfSingleNode => "ldf_single_node",
            Algorithm::EdfMultiNode => "edf_multinode",
            Algorithm::LdfMultiNode => "ldf_multinode",
            Algorithm::LlMultiNode => "ll_multinode",
        }
    }

    pub fn strategy(self) -> Strategy {
        match self {
            Algorithm::EdfSingleNode => Strategy::SingleNode(single_node::edf),
            Algorithm::LdfSingleNode => Strategy::SingleNode(single_node::ldf),
            Algorithm::EdfMultiNode => Strategy::MultiNode(multi_node::edf),
            Algorithm::LdfMultiNode => Strategy::MultiNode(multi_node::ldf),
            Algorithm::LlMultiNode => Strategy::MultiNode(multi_node::llf),
        }
    }

    pub fn is_multi_node(self) -> bool {
        matches!(self.strategy(), Strategy::MultiNode(_))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| SchedulerError::UnknownAlgorithm(s.to_string()))
    }
}

// ── DeadlinePolicy ────────────────────────────────────────────────────────────

/// What to do when a produced schedule misses a deadline.
///
/// The algorithms are greedy heuristics: none of them guarantees deadline
/// compliance under multi-node contention, and EDF is not optimal for
/// non-preemptive precedence-constrained sets either.  The caller chooses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeadlinePolicy {
    /// Return the schedule; misses are listed in
    /// [`Schedule::deadline_misses`] and logged at `warn`.
    #[default]
    Report,
    /// Fail with [`SchedulerError::Infeasible`].
    Reject,
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// Stateless scheduling front end.
///
/// All per-run state (graph, platform, node clocks) is allocated inside
/// [`schedule()`](Self::schedule) and dropped at the end of the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler {
    deadline_policy: DeadlinePolicy,
}

impl Scheduler {
    /// Scheduler with [`DeadlinePolicy::Report`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline_policy(mut self, policy: DeadlinePolicy) -> Self {
        self.deadline_policy = policy;
        self
    }

    /// Build the models and run `algorithm`.
    ///
    /// `platform` is ignored by single-node algorithms.  Multi-node
    /// algorithms treat `None` like an empty node set.
    ///
    /// # Errors
    /// Model errors from [`TaskGraph::build`] / [`Platform::build`], algorithm
    /// errors, and [`SchedulerError::Infeasible`] under
    /// [`DeadlinePolicy::Reject`].  No schedule is returned on error.
    pub fn schedule(
        &self,
        algorithm: Algorithm,
        app: &ApplicationModel,
        platform: Option<&PlatformModel>,
    ) -> Result<Schedule, SchedulerError> {
        let graph = TaskGraph::build(&app.tasks, &app.messages)?;
        let platform = if algorithm.is_multi_node() {
            let nodes = platform.map(|p| p.nodes.as_slice()).unwrap_or_default();
            Some(Platform::build(nodes)?)
        } else {
            None
        };
        self.schedule_graph(algorithm, &graph, platform.as_ref())
    }

    /// Run `algorithm` over already-built models.
    ///
    /// # Errors
    /// As [`schedule`](Self::schedule); `EmptyPlatform` if a multi-node
    /// algorithm gets no platform.
    pub fn schedule_graph(
        &self,
        algorithm: Algorithm,
        graph: &TaskGraph,
        platform: Option<&Platform>,
    ) -> Result<Schedule, SchedulerError> {
        info!(
            algorithm  = %algorithm,
            task_count = graph.len(),
            node_count = platform.map(Platform::len).unwrap_or(1),
            "=== Scheduler::schedule() ==="
        );

        let (placements, platform) = match algorithm.strategy() {
            Strategy::SingleNode(run) => (run(graph)?, None),
            Strategy::MultiNode(run) => {
                let platform = platform.ok_or(SchedulerError::EmptyPlatform)?;
                (run(graph, platform)?, Some(platform))
            }
        };

        let schedule = schedule::assemble(algorithm.name(), graph, platform, placements)?;

        info!(
            algorithm = %algorithm,
            makespan  = schedule.makespan(),
            misses    = schedule.deadline_misses.len(),
            "=== Scheduling complete ==="
        );

        match self.deadline_policy {
            DeadlinePolicy::Reject if !schedule.is_feasible() => Err(SchedulerError::Infeasible {
                name: schedule.name,
                misses: schedule.deadline_misses,
            }),
            _ => Ok(schedule),
        }
    }
}

// ── Free-function entry points ────────────────────────────────────────────────

/// EDF on one node with [`DeadlinePolicy::Report`].
pub fn edf_single_node(app: &ApplicationModel) -> Result<Schedule, SchedulerError> {
    Scheduler::new().schedule(Algorithm::EdfSingleNode, app, None)
}

/// LDF on one node with [`DeadlinePolicy::Report`].
pub fn ldf_single_node(app: &ApplicationModel) -> Result<Schedule, SchedulerError> {
    Scheduler::new().schedule(Algorithm::LdfSingleNode, app, None)
}

/// EDF across `platform` with [`DeadlinePolicy::Report`].
pub fn edf_multinode(
    app: &ApplicationModel,
    platform: &PlatformModel,
) -> Result<Schedule, SchedulerError> {
    Scheduler::new().schedule(Algorithm::EdfMultiNode, app, Some(platform))
}

/// LDF across `platform` with [`DeadlinePolicy::Report`].
pub fn ldf_multinode(
    app: &ApplicationModel,
    platform: &PlatformModel,
) -> Result<Schedule, SchedulerError> {
    Scheduler::new().schedule(Algorithm::LdfMultiNode, app, Some(platform))
}

/// LL across `platform` with [`DeadlinePolicy::Report`].
pub fn ll_multinode(
    app: &ApplicationModel,
    platform: &PlatformModel,
) -> Result<Schedule, SchedulerError> {
    Scheduler::new().schedule(Algorithm::LlMultiNode, app, Some(platform))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ident, MessageSpec, NodeSpec, TaskSpec};

    fn independent_pair() -> ApplicationModel {
        ApplicationModel {
            tasks: vec![TaskSpec::new("A", 4, 5), TaskSpec::new("B", 1, 2)],
            messages: vec![],
        }
    }

    fn two_nodes() -> PlatformModel {
        PlatformModel {
            nodes: vec![NodeSpec::new("n0"), NodeSpec::new("n1")],
        }
    }

    // ── Algorithm ─────────────────────────────────────────────────────────────

    #[test]
    fn algorithm_names_round_trip() {
        for algo in Algorithm::ALL {
            assert_eq!(algo.name().parse::<Algorithm>().unwrap(), algo);
            assert_eq!(algo.to_string(), algo.name());
        }
    }

    #[test]
    fn unknown_algorithm_returns_error() {
        let err = "round_robin_nonsense".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, SchedulerError::UnknownAlgorithm(_)));
    }

    #[test]
    fn algorithm_serde_names_match_display_names() {
        for algo in Algorithm::ALL {
            let json = serde_json::to_string(&algo).unwrap();
            assert_eq!(json, format!("\"{}\"", algo.name()));
        }
    }

    #[test]
    fn only_multinode_variants_need_a_platform() {
        let multi: Vec<Algorithm> = Algorithm::ALL
            .into_iter()
            .filter(|a| a.is_multi_node())
            .collect();
        assert_eq!(
            multi,
            vec![
                Algorithm::EdfMultiNode,
                Algorithm::LdfMultiNode,
                Algorithm::LlMultiNode
            ]
        );
    }

    // ── Scheduler ─────────────────────────────────────────────────────────────

    #[test]
    fn single_node_schedule_has_no_node_ids() {
        let s = edf_single_node(&independent_pair()).unwrap();
        assert_eq!(s.name, "edf_single_node");
        assert!(s.entries.iter().all(|e| e.node_id.is_none()));
        assert_eq!(s.entry_for(&Ident::from("B")).unwrap().start_time, 0);
        assert_eq!(s.entry_for(&Ident::from("A")).unwrap().end_time, 5);
    }

    #[test]
    fn single_node_ignores_platform() {
        let s = Scheduler::new()
            .schedule(Algorithm::LdfSingleNode, &independent_pair(), Some(&two_nodes()))
            .unwrap();
        assert!(s.entries.iter().all(|e| e.node_id.is_none()));
    }

    #[test]
    fn multi_node_schedule_names_nodes() {
        let s = edf_multinode(&independent_pair(), &two_nodes()).unwrap();
        assert_eq!(s.name, "edf_multinode");
        assert_eq!(
            s.entry_for(&Ident::from("B")).unwrap().node_id,
            Some(Ident::from("n0"))
        );
        assert_eq!(
            s.entry_for(&Ident::from("A")).unwrap().node_id,
            Some(Ident::from("n1"))
        );
        assert!(s.is_feasible());
    }

    #[test]
    fn multi_node_without_platform_is_empty_platform() {
        for algo in [Algorithm::EdfMultiNode, Algorithm::LdfMultiNode, Algorithm::LlMultiNode] {
            let err = Scheduler::new()
                .schedule(algo, &independent_pair(), None)
                .unwrap_err();
            assert!(matches!(err, SchedulerError::EmptyPlatform), "{algo}");
        }
    }

    #[test]
    fn model_errors_surface_before_scheduling() {
        let app = ApplicationModel {
            tasks: vec![TaskSpec::new(0, 1, 5)],
            messages: vec![MessageSpec::new(0, 7)],
        };
        for algo in Algorithm::ALL {
            let err = Scheduler::new()
                .schedule(algo, &app, Some(&two_nodes()))
                .unwrap_err();
            assert!(matches!(err, SchedulerError::DanglingEdge { .. }), "{algo}");
        }
    }

    #[test]
    fn reject_policy_turns_misses_into_errors() {
        // Two tasks each due at their own wcet on one node: one must miss.
        let app = ApplicationModel {
            tasks: vec![TaskSpec::new(0, 3, 3), TaskSpec::new(1, 3, 3)],
            messages: vec![],
        };

        let reported = Scheduler::new()
            .schedule(Algorithm::EdfSingleNode, &app, None)
            .unwrap();
        assert_eq!(reported.deadline_misses.len(), 1);

        let err = Scheduler::new()
            .with_deadline_policy(DeadlinePolicy::Reject)
            .schedule(Algorithm::EdfSingleNode, &app, None)
            .unwrap_err();
        match err {
            SchedulerError::Infeasible { name, misses } => {
                assert_eq!(name, "edf_single_node");
                assert_eq!(misses[0].task_id, Ident::Num(1));
            }
            other => panic!("expected Infeasible, got {other}"),
        }
    }

    #[test]
    fn reject_policy_passes_feasible_schedules() {
        let s = Scheduler::new()
            .with_deadline_policy(DeadlinePolicy::Reject)
            .schedule(Algorithm::LlMultiNode, &independent_pair(), Some(&two_nodes()))
            .unwrap();
        assert!(s.is_feasible());
    }

    #[test]
    fn oversized_times_fail_as_overflow_not_invariant() {
        let app = ApplicationModel {
            tasks: vec![TaskSpec::new(0, 1, 1), TaskSpec::new(1, 1, 1)],
            messages: vec![],
        };
        let slow = PlatformModel {
            nodes: vec![NodeSpec::new(0).with_speed_factor(1e-30)],
        };
        for algo in [Algorithm::EdfMultiNode, Algorithm::LdfMultiNode, Algorithm::LlMultiNode] {
            let err = Scheduler::new().schedule(algo, &app, Some(&slow)).unwrap_err();
            assert!(matches!(err, SchedulerError::TimeOverflow { .. }), "{algo}: {err}");
        }
    }

    #[test]
    fn scheduler_is_deterministic() {
        // Same input 50 times must produce identical schedules
        let app = ApplicationModel {
            tasks: vec![
                TaskSpec::new(0, 2, 20),
                TaskSpec::new(1, 4, 12),
                TaskSpec::new(2, 3, 10),
                TaskSpec::new(3, 2, 20),
            ],
            messages: vec![
                MessageSpec::new(0, 1).with_comm_cost(1),
                MessageSpec::new(0, 2).with_comm_cost(1),
                MessageSpec::new(1, 3).with_comm_cost(1),
                MessageSpec::new(2, 3).with_comm_cost(1),
            ],
        };
        let platform = two_nodes();
        for algo in Algorithm::ALL {
            let reference = Scheduler::new().schedule(algo, &app, Some(&platform)).unwrap();
            for _ in 0..49 {
                let again = Scheduler::new().schedule(algo, &app, Some(&platform)).unwrap();
                assert_eq!(again, reference, "{algo} produced different output");
            }
        }
    }
}
