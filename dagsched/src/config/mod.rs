//! Platform configuration loaded from YAML.
//!
//! Lets a platform be described once, outside the model files, and reused
//! across runs.  The expected YAML structure is:
//! ```yaml
//! nodes:
//!   ecu_front:
//!     speed_factor: 1.0
//!     description: "Perception node"
//!   ecu_rear:
//!     speed_factor: 2.0
//!   7: {}
//! ```
//!
//! Keys are node ids (integers or strings); every per-node field is optional.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::model::{Ident, NodeSpec, PlatformModel};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct PlatformFile {
    #[serde(default)]
    nodes: BTreeMap<Ident, NodeEntry>,
}

/// Per-node fields as they appear in the YAML file.
#[derive(Debug, Default, Deserialize)]
struct NodeEntry {
    #[serde(default, alias = "speedFactor")]
    speed_factor: Option<f64>,
    description: Option<String>,
}

// ── Public data structures ────────────────────────────────────────────────────

/// One configured node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    pub id: Ident,
    pub speed_factor: Option<f64>,
    pub description: String,
}

/// Node table read from a YAML file.
#[derive(Debug, Default)]
pub struct PlatformConfig {
    /// Sorted by id (the YAML map is read into a `BTreeMap`).
    nodes: Vec<NodeConfig>,
}

impl PlatformConfig {
    /// Reads `path` and parses it with [`from_yaml_str`](Self::from_yaml_str).
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or if the YAML is
    /// structurally invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading platform configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))
    }

    /// Parses a YAML node table.
    ///
    /// An empty table is accepted with a warning; multi-node algorithms will
    /// then fail with `EmptyPlatform`.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: PlatformFile = serde_yaml::from_str(content)?;

        let nodes: Vec<NodeConfig> = file
            .nodes
            .into_iter()
            .map(|(id, entry)| {
                debug!(
                    "  Node: {} | speed: {} | {}",
                    id,
                    entry.speed_factor.unwrap_or(1.0),
                    entry.description.as_deref().unwrap_or(""),
                );
                NodeConfig {
                    id,
                    speed_factor: entry.speed_factor,
                    description: entry.description.unwrap_or_default(),
                }
            })
            .collect();

        if nodes.is_empty() {
            warn!("No nodes found in platform configuration");
        } else {
            info!(
                "Successfully loaded {} node configuration(s)",
                nodes.len()
            );
        }

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[NodeConfig] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The platform model the schedulers consume.
    pub fn to_platform_model(&self) -> PlatformModel {
        PlatformModel {
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeSpec {
                    id: n.id.clone(),
                    speed_factor: n.speed_factor,
                })
                .collect(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
