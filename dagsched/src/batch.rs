/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Parallel evaluation of many (model, algorithm) pairs.
//!
//! Every pair runs on tokio's blocking pool; a semaphore caps how many run
//! at once.  Outcomes come back in input order (models outer, algorithms
//! inner) regardless of completion order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::model::ModelFile;
use crate::schedule::Schedule;
use crate::scheduler::{Algorithm, DeadlinePolicy, Scheduler};

/// Knobs for [`evaluate`].
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Maximum number of concurrent runs (at least 1).
    pub jobs: usize,
    pub deadline_policy: DeadlinePolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            jobs: std::thread::available_parallelism().map_or(1, |n| n.get()),
            deadline_policy: DeadlinePolicy::Report,
        }
    }
}

/// Result of one (model, algorithm) run.
#[derive(Debug)]
pub struct BatchOutcome {
    pub model: PathBuf,
    pub algorithm: Algorithm,
    pub result: Result<Schedule>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// All `*.json` files directly inside `dir`, sorted by path.
pub fn discover_models(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Cannot read model directory: {}", dir.display()))?;

    let mut models = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Cannot read model directory: {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            models.push(path);
        }
    }
    models.sort();

    info!(dir = %dir.display(), count = models.len(), "discovered model files");
    Ok(models)
}

/// Run every algorithm in `algorithms` against every model in `models`.
///
/// Per-pair failures (unreadable file, model error, infeasible schedule under
/// [`DeadlinePolicy::Reject`]) are reported in the outcome; only a worker
/// panic aborts the whole batch.
pub async fn evaluate(
    models: &[PathBuf],
    algorithms: &[Algorithm],
    options: BatchOptions,
) -> Result<Vec<BatchOutcome>> {
    let scheduler = Scheduler::new().with_deadline_policy(options.deadline_policy);
    let semaphore = Arc::new(Semaphore::new(options.jobs.max(1)));
    let mut set = JoinSet::new();

    let pairs = models
        .iter()
        .flat_map(|m| algorithms.iter().map(move |&a| (m.clone(), a)));
    let mut total = 0;

    for (index, (model, algorithm)) in pairs.enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .context("batch semaphore closed")?;
        total += 1;

        set.spawn_blocking(move || {
            let _permit = permit;
            let result = run_one(&scheduler, &model, algorithm);
            (index, BatchOutcome { model, algorithm, result })
        });
    }

    let mut outcomes: Vec<Option<BatchOutcome>> = (0..total).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        let (index, outcome) = joined.context("batch worker panicked")?;
        match &outcome.result {
            Ok(s) => debug!(
                model = %outcome.model.display(),
                algorithm = %outcome.algorithm,
                makespan = s.makespan(),
                "run finished"
            ),
            Err(e) => warn!(
                model = %outcome.model.display(),
                algorithm = %outcome.algorithm,
                "run failed: {:#}", e
            ),
        }
        outcomes[index] = Some(outcome);
    }

    let outcomes: Vec<BatchOutcome> = outcomes.into_iter().flatten().collect();
    info!(
        runs = outcomes.len(),
        failed = outcomes.iter().filter(|o| !o.is_ok()).count(),
        "batch complete"
    );
    Ok(outcomes)
}

fn run_one(scheduler: &Scheduler, path: &Path, algorithm: Algorithm) -> Result<Schedule> {
    let model = ModelFile::load(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let schedule = scheduler
        .schedule(algorithm, &model.application, model.platform.as_ref())
        .with_context(|| format!("{algorithm} failed on {}", path.display()))?;

    Ok(schedule.with_name(format!("{algorithm}:{stem}")))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
