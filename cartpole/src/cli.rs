use std::path::PathBuf;

use clap::Parser;
use rl::AgentKind;
use training::TerminalPolicy;

use crate::config::{ExperimentConfig, Overrides};

/// Train a cart-pole balancing agent and record every step.
#[derive(Parser, Debug)]
#[command(name = "cartpole", version, about)]
pub struct Cli {
    /// JSON experiment configuration (defaults are used if omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Agent to train: random, reinforce or a2c
    #[arg(long)]
    pub agent: Option<AgentKind>,

    /// Number of training episodes
    #[arg(long)]
    pub episodes: Option<usize>,

    /// Evaluate before every Nth episode, 0 disables evaluation
    #[arg(long)]
    pub eval_every: Option<usize>,

    /// Rollouts averaged per evaluation
    #[arg(long)]
    pub eval_rollouts: Option<usize>,

    #[arg(long)]
    pub max_episode_timesteps: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Which terminal codes end an episode: any or failure-only
    #[arg(long)]
    pub terminal_policy: Option<TerminalPolicy>,

    /// Write the training report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Log every recorded event
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            agent: self.agent,
            episodes: self.episodes,
            eval_every: self.eval_every,
            eval_rollouts: self.eval_rollouts,
            max_episode_timesteps: self.max_episode_timesteps,
            seed: self.seed,
            terminal_policy: self.terminal_policy,
        }
    }

    /// The configuration file, if any, with command-line overrides applied.
    ///
    /// # Errors
    ///
    /// Fails if the configuration file cannot be loaded.
    pub fn experiment(&self) -> anyhow::Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::load(path)?,
            None => ExperimentConfig::default(),
        };
        self.overrides().apply(&mut config);
        Ok(config)
    }
}
