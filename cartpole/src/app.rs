//! # Cart-pole application
//!
//! Wires the pieces of a training run together: the cart-pole environment
//! behind an [`EnvDevice`], the selected agent, an optional evaluation
//! environment, and the sinks that receive the recorded documents.

use std::path::Path;

use anyhow::{Context, Result};
use rl::{build_agent, CartPoleEnv};
use runtime::{DocumentCollector, LoggingSink};
use serde_json::json;
use tracing::info;
use training::{train_agent, EnvDevice, EvaluationRunner, TrainingReport};

use crate::config::ExperimentConfig;

/// Name of the recorded device; prefixes every recorded key.
pub const DEVICE_NAME: &str = "cartpole";

/// Outcome of [`run`]: the report and every document the run produced.
#[derive(Debug)]
pub struct RunOutput {
    pub report: TrainingReport,
    pub documents: DocumentCollector,
}

/// Train the configured agent on cart-pole inside one recorded run.
///
/// The configuration is validated and the agent built before any
/// environment exists, so a bad configuration never touches the simulation.
///
/// # Errors
///
/// Returns configuration errors, and any error that aborted the run.
pub fn run(config: &ExperimentConfig) -> Result<RunOutput> {
    config.validate().context("invalid experiment configuration")?;

    let mut agent = build_agent(&config.agent, physics::STATE_DIM, config.seed)
        .context("failed to build agent")?;
    info!(agent = %config.agent.kind, seed = config.seed, "agent ready");

    let env = CartPoleEnv::new(config.environment.clone(), config.seed)
        .context("failed to create training environment")?;
    let mut device = EnvDevice::new(DEVICE_NAME, env);

    let mut evaluator = match config.training.evaluation.every_episodes {
        Some(every) => {
            let env = CartPoleEnv::new(config.environment.clone(), config.evaluation_seed())
                .context("failed to create evaluation environment")?;
            info!(
                every,
                rollouts = config.training.evaluation.rollouts,
                "evaluation enabled"
            );
            Some(
                EvaluationRunner::new(env, config.training.evaluation)
                    .context("invalid evaluation settings")?,
            )
        }
        None => None,
    };

    let mut training = config.training.clone();
    if let serde_json::Value::Object(metadata) = &mut training.metadata {
        metadata
            .entry("agent")
            .or_insert_with(|| json!(config.agent.kind.name()));
        metadata.entry("seed").or_insert_with(|| json!(config.seed));
    }

    let mut logging = LoggingSink::new();
    let mut documents = DocumentCollector::new();
    let report = train_agent(
        &mut device,
        &mut agent,
        evaluator.as_mut(),
        &training,
        &mut [&mut logging, &mut documents],
    )
    .context("training run failed")?;

    summarize(&report);
    Ok(RunOutput { report, documents })
}

/// Write `report` to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Fails if the report cannot be serialised or the file cannot be written.
pub fn write_report(report: &TrainingReport, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(report).context("failed to serialise report")?;
    std::fs::write(path, text)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

fn summarize(report: &TrainingReport) {
    let best = report
        .episodes
        .iter()
        .map(|episode| episode.total_reward)
        .fold(0.0_f32, f32::max);
    let last = report.evaluations.last().map(|e| e.average_reward);
    info!(
        run = %report.run_uid,
        steps = report.event_uids.len(),
        episodes = report.episodes.len(),
        best_episode_reward = best,
        last_evaluation = ?last,
        "run complete"
    );
}
