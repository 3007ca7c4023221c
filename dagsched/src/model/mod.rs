/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Input document types: the application model and the platform model.
//!
//! These mirror the JSON layout handed over by the caller one-to-one and carry
//! no behaviour.  They are normalised into a [`TaskGraph`] and a [`Platform`]
//! before any algorithm runs.
//!
//! ```json
//! {
//!   "application": {
//!     "tasks":    [{ "id": 0, "wcet": 2, "deadline": 10 }],
//!     "messages": [{ "sender": 0, "receiver": 1, "comm_cost": 1 }]
//!   },
//!   "platform": {
//!     "nodes": [{ "id": 0 }, { "id": 1, "speedFactor": 2.0 }]
//!   }
//! }
//! ```
//!
//! [`TaskGraph`]: crate::graph::TaskGraph
//! [`Platform`]: crate::platform::Platform

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Simulated time and durations, in ticks from the schedule origin.
pub type Time = u64;

// ── Identifier ────────────────────────────────────────────────────────────────

/// Task or node identifier.
///
/// Models in the wild use either integers or strings for ids, so both are
/// accepted.  The derived ordering is the tie-break order used by every
/// algorithm: integers compare numerically, strings lexicographically, and
/// every integer sorts before every string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ident {
    Num(u64),
    Name(String),
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ident::Num(n) => write!(f, "{n}"),
            Ident::Name(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Ident {
    fn from(n: u64) -> Self {
        Ident::Num(n)
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Ident::Name(s.to_string())
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Ident::Name(s)
    }
}

// ── Application model ─────────────────────────────────────────────────────────

/// One task as declared in the application model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: Ident,
    /// Worst-case execution time on a unit-speed node.
    pub wcet: Time,
    /// Absolute deadline, measured from the schedule origin.
    pub deadline: Time,
}

impl TaskSpec {
    pub fn new(id: impl Into<Ident>, wcet: Time, deadline: Time) -> Self {
        Self {
            id: id.into(),
            wcet,
            deadline,
        }
    }
}

/// Precedence edge: `sender` must complete before `receiver` may start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSpec {
    pub sender: Ident,
    pub receiver: Ident,
    /// Delay paid only when sender and receiver run on different nodes.
    #[serde(default, alias = "commCost")]
    pub comm_cost: Time,
}

impl MessageSpec {
    pub fn new(sender: impl Into<Ident>, receiver: impl Into<Ident>) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            comm_cost: 0,
        }
    }

    pub fn with_comm_cost(mut self, comm_cost: Time) -> Self {
        self.comm_cost = comm_cost;
        self
    }
}

/// Task graph as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationModel {
    pub tasks: Vec<TaskSpec>,
    #[serde(default)]
    pub messages: Vec<MessageSpec>,
}

// ── Platform model ────────────────────────────────────────────────────────────

/// One processing node as declared in the platform model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: Ident,
    /// Relative speed; `None` means 1.0.
    #[serde(
        default,
        alias = "speedFactor",
        skip_serializing_if = "Option::is_none"
    )]
    pub speed_factor: Option<f64>,
}

impl NodeSpec {
    pub fn new(id: impl Into<Ident>) -> Self {
        Self {
            id: id.into(),
            speed_factor: None,
        }
    }

    pub fn with_speed_factor(mut self, factor: f64) -> Self {
        self.speed_factor = Some(factor);
        self
    }
}

/// Node set as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformModel {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

// ── Model file ────────────────────────────────────────────────────────────────

/// A model file bundles the application and (optionally) the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub application: ApplicationModel,
    #[serde(default)]
    pub platform: Option<PlatformModel>,
}

impl ModelFile {
    /// Reads and parses a JSON model file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a structurally
    /// valid model document.  Graph-level checks (cycles, dangling messages)
    /// happen later in [`TaskGraph::build`](crate::graph::TaskGraph::build).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open model file: {}", path.display()))?;

        let model: ModelFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse model file: {}", path.display()))?;

        info!(
            path = %path.display(),
            tasks = model.application.tasks.len(),
            messages = model.application.messages.len(),
            nodes = model.platform.as_ref().map(|p| p.nodes.len()).unwrap_or(0),
            "model loaded"
        );

        Ok(model)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn json_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    // ── Ident ─────────────────────────────────────────────────────────────────

    #[test]
    fn ident_accepts_numbers_and_strings() {
        let ids: Vec<Ident> = serde_json::from_str(r#"[3, "a", 0]"#).unwrap();
        assert_eq!(
            ids,
            vec![Ident::Num(3), Ident::Name("a".into()), Ident::Num(0)]
        );
    }

    #[test]
    fn ident_numbers_order_before_strings() {
        let mut ids = vec![
            Ident::from("b"),
            Ident::from(10),
            Ident::from("a"),
            Ident::from(2),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                Ident::from(2),
                Ident::from(10),
                Ident::from("a"),
                Ident::from("b")
            ]
        );
    }

    #[test]
    fn ident_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Ident::Num(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&Ident::from("t1")).unwrap(),
            "\"t1\""
        );
    }

    // ── Documents ─────────────────────────────────────────────────────────────

    #[test]
    fn messages_default_to_empty_and_zero_cost() {
        let app: ApplicationModel = serde_json::from_str(
            r#"{ "tasks": [{ "id": 0, "wcet": 1, "deadline": 4 }] }"#,
        )
        .unwrap();
        assert!(app.messages.is_empty());

        let msg: MessageSpec = serde_json::from_str(r#"{ "sender": 0, "receiver": 1 }"#).unwrap();
        assert_eq!(msg.comm_cost, 0);
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let node: NodeSpec = serde_json::from_str(r#"{ "id": "n0", "speedFactor": 0.5 }"#).unwrap();
        assert_eq!(node.speed_factor, Some(0.5));

        let msg: MessageSpec =
            serde_json::from_str(r#"{ "sender": 0, "receiver": 1, "commCost": 4 }"#).unwrap();
        assert_eq!(msg.comm_cost, 4);
    }

    #[test]
    fn unknown_task_fields_are_ignored() {
        let task: TaskSpec =
            serde_json::from_str(r#"{ "id": 1, "wcet": 2, "deadline": 9, "type": "ctrl" }"#)
                .unwrap();
        assert_eq!(task, TaskSpec::new(1, 2, 9));
    }

    // ── ModelFile::load ───────────────────────────────────────────────────────

    #[test]
    fn load_model_with_platform() {
        let f = json_tempfile(
            r#"{
                "application": {
                    "tasks": [
                        { "id": 0, "wcet": 2, "deadline": 10 },
                        { "id": 1, "wcet": 3, "deadline": 10 }
                    ],
                    "messages": [{ "sender": 0, "receiver": 1 }]
                },
                "platform": { "nodes": [{ "id": 0 }, { "id": 1, "speed_factor": 2.0 }] }
            }"#,
        );
        let model = ModelFile::load(f.path()).unwrap();
        assert_eq!(model.application.tasks.len(), 2);
        assert_eq!(model.application.messages, vec![MessageSpec::new(0, 1)]);
        let platform = model.platform.unwrap();
        assert_eq!(platform.nodes[1].speed_factor, Some(2.0));
    }

    #[test]
    fn load_model_without_platform() {
        let f = json_tempfile(r#"{ "application": { "tasks": [] } }"#);
        let model = ModelFile::load(f.path()).unwrap();
        assert!(model.platform.is_none());
    }

    #[test]
    fn missing_model_file_returns_error() {
        let result = ModelFile::load(Path::new("/nonexistent/model.json"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_model_returns_error() {
        let f = json_tempfile(r#"{ "application": { "tasks": [{ "id": 0 }] } }"#);
        let err = ModelFile::load(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse model file"));
    }
}
