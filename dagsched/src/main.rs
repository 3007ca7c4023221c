/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use dagsched::batch::{self, BatchOptions};
use dagsched::config::PlatformConfig;
use dagsched::model::ModelFile;
use dagsched::output;
use dagsched::{Algorithm, DeadlinePolicy, Scheduler};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Non-preemptive list schedulers for precedence-constrained task graphs.
///
/// Example:
///   dagsched run --model tests/input_models/fork_join.json \
///                --algorithm edf_multinode --pretty
#[derive(Debug, Parser)]
#[command(
    name = "dagsched",
    about = "EDF / LDF / LL schedulers over task DAGs",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Schedule one model and print the output document.
    Run {
        /// JSON model file (`application` + optional `platform`).
        #[arg(short = 'm', long = "model")]
        model: PathBuf,

        #[arg(short = 'a', long = "algorithm", value_enum)]
        algorithm: Algorithm,

        /// YAML node table; replaces the platform in the model file.
        #[arg(short = 'p', long = "platform")]
        platform: Option<PathBuf>,

        /// Fail when any deadline is missed.
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Pretty-print the JSON document.
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Run every `*.json` model in a directory against the selected algorithms.
    Batch {
        #[arg(short = 'd', long = "models")]
        models: PathBuf,

        /// Algorithms to run (repeatable); all five when omitted.
        #[arg(short = 'a', long = "algorithm", value_enum)]
        algorithms: Vec<Algorithm>,

        /// Maximum concurrent runs; defaults to the available parallelism.
        #[arg(short = 'j', long = "jobs")]
        jobs: Option<usize>,

        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Check an output document against the output shape.
    Validate {
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
}

fn deadline_policy(strict: bool) -> DeadlinePolicy {
    if strict {
        DeadlinePolicy::Reject
    } else {
        DeadlinePolicy::Report
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialise structured logging on stderr; stdout carries documents.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Run {
            model,
            algorithm,
            platform,
            strict,
            pretty,
        } => run(&model, algorithm, platform.as_deref(), strict, pretty),
        Command::Batch {
            models,
            algorithms,
            jobs,
            strict,
        } => run_batch(&models, algorithms, jobs, strict).await,
        Command::Validate { output } => validate(&output),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn run(
    model_path: &Path,
    algorithm: Algorithm,
    platform_path: Option<&Path>,
    strict: bool,
    pretty: bool,
) -> Result<bool> {
    info!(
        model     = %model_path.display(),
        algorithm = %algorithm,
        platform  = ?platform_path,
        strict,
        "Configuration"
    );

    let model = ModelFile::load(model_path)?;

    let platform = match platform_path {
        Some(path) => {
            let config = PlatformConfig::load_from_file(path)?;
            if config.is_empty() && algorithm.is_multi_node() {
                warn!("Platform file {} defines no nodes", path.display());
            }
            Some(config.to_platform_model())
        }
        None => {
            if algorithm.is_multi_node() && model.platform.is_none() {
                warn!("No platform in model file and none given with --platform");
            }
            model.platform
        }
    };

    let schedule = Scheduler::new()
        .with_deadline_policy(deadline_policy(strict))
        .schedule(algorithm, &model.application, platform.as_ref())
        .with_context(|| format!("{algorithm} failed on {}", model_path.display()))?;

    for miss in &schedule.deadline_misses {
        warn!("{}", miss);
    }

    let doc = schedule.to_document();
    let text = if pretty {
        serde_json::to_string_pretty(&doc)?
    } else {
        serde_json::to_string(&doc)?
    };
    println!("{text}");
    Ok(true)
}

async fn run_batch(
    dir: &Path,
    mut algorithms: Vec<Algorithm>,
    jobs: Option<usize>,
    strict: bool,
) -> Result<bool> {
    if algorithms.is_empty() {
        algorithms = Algorithm::ALL.to_vec();
    }
    let models = batch::discover_models(dir)?;
    if models.is_empty() {
        warn!("No model files found in {}", dir.display());
    }

    let mut options = BatchOptions {
        deadline_policy: deadline_policy(strict),
        ..Default::default()
    };
    if let Some(jobs) = jobs {
        options.jobs = jobs;
    }

    let outcomes = batch::evaluate(&models, &algorithms, options).await?;

    let mut all_ok = true;
    for outcome in &outcomes {
        let model = outcome.model.display();
        match &outcome.result {
            Ok(s) => println!(
                "ok    {model}  {:<16} makespan={} misses={}",
                outcome.algorithm.name(),
                s.makespan(),
                s.deadline_misses.len()
            ),
            Err(e) => {
                all_ok = false;
                println!("FAIL  {model}  {:<16} {:#}", outcome.algorithm.name(), e);
            }
        }
    }
    Ok(all_ok)
}

fn validate(path: &Path) -> Result<bool> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open output file: {}", path.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse output file: {}", path.display()))?;

    match output::validate_document(&doc) {
        Ok(()) => {
            info!(path = %path.display(), "✓ output document is valid");
            Ok(true)
        }
        Err(e) => {
            error!(path = %path.display(), "{}", e);
            Ok(false)
        }
    }
}
