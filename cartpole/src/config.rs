//! Experiment configuration: a JSON file plus command-line overrides.

use std::path::Path;

use anyhow::{Context, Result};
use rl::{AgentConfig, AgentKind, CartPoleEnvConfig, ConfigError};
use serde::{Deserialize, Serialize};
use training::{TerminalPolicy, TrainingConfig};

/// Added to the experiment seed for the evaluation environment so its
/// episodes never replay the training episodes.
const EVALUATION_SEED_OFFSET: u64 = 0x9E37_79B9;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub agent: AgentConfig,
    pub environment: CartPoleEnvConfig,
    pub training: TrainingConfig,
    pub seed: u64,
}

impl ExperimentConfig {
    /// Read a configuration file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid configuration,
    /// including an unknown agent name.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config from {}", path.display()))
    }

    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        self.agent.validate()?;
        self.environment
            .physics
            .validate()
            .context("invalid environment.physics")?;
        if self.environment.max_episode_timesteps == 0 {
            return Err(ConfigError::Invalid {
                field: "environment.max_episode_timesteps",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        self.training.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn evaluation_seed(&self) -> u64 {
        self.seed.wrapping_add(EVALUATION_SEED_OFFSET)
    }
}

/// Individual settings given on the command line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    pub agent: Option<AgentKind>,
    pub episodes: Option<usize>,
    pub eval_every: Option<usize>,
    pub eval_rollouts: Option<usize>,
    pub max_episode_timesteps: Option<usize>,
    pub seed: Option<u64>,
    pub terminal_policy: Option<TerminalPolicy>,
}

impl Overrides {
    pub fn apply(&self, config: &mut ExperimentConfig) {
        if let Some(kind) = self.agent {
            config.agent.kind = kind;
        }
        if let Some(episodes) = self.episodes {
            config.training.episode_count = episodes;
        }
        if let Some(every) = self.eval_every {
            // 0 turns evaluation off
            config.training.evaluation.every_episodes = (every > 0).then_some(every);
        }
        if let Some(rollouts) = self.eval_rollouts {
            config.training.evaluation.rollouts = rollouts;
        }
        if let Some(limit) = self.max_episode_timesteps {
            config.environment.max_episode_timesteps = limit;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(policy) = self.terminal_policy {
            config.training.terminal_policy = policy;
        }
    }
}
