//! Deterministic evaluation rollouts.

use rl::{Agent, ConfigError, Env};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{EpisodeState, TrainingError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Evaluate at the start of every episode whose index is a multiple of
    /// this value. `None` disables evaluation.
    pub every_episodes: Option<usize>,
    /// Rollouts averaged per evaluation
    pub rollouts: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            every_episodes: None,
            rollouts: 100,
        }
    }
}

impl EvaluationConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero cadence, or for zero
    /// rollouts while evaluation is enabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(every) = self.every_episodes {
            if every == 0 {
                return Err(ConfigError::Invalid {
                    field: "training.evaluation.every_episodes",
                    reason: "must be at least 1, omit it to disable evaluation".to_string(),
                });
            }
            Self::check_rollouts(self.rollouts)?;
        }
        Ok(())
    }

    fn check_rollouts(rollouts: usize) -> Result<(), ConfigError> {
        if rollouts == 0 {
            return Err(ConfigError::Invalid {
                field: "training.evaluation.rollouts",
                reason: "must be at least 1 when evaluation is enabled".to_string(),
            });
        }
        Ok(())
    }
}

/// Average reward of one evaluation, tagged with the episode it preceded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub episode_index: usize,
    pub average_reward: f32,
}

/// Runs greedy, non-learning rollouts on its own environment instance.
///
/// The runner never touches the training environment, and it only borrows
/// the agent immutably, so neither the training trajectory nor the agent's
/// parameters can change because of an evaluation.
pub struct EvaluationRunner<E: Env> {
    env: E,
    config: EvaluationConfig,
    evaluations: usize,
}

impl<E: Env> EvaluationRunner<E> {
    /// # Errors
    ///
    /// Rejects an invalid `config`, and zero rollouts even when the cadence
    /// is disabled, since [`run`](Self::run) can still be called directly.
    pub fn new(env: E, config: EvaluationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        EvaluationConfig::check_rollouts(config.rollouts)?;
        Ok(Self {
            env,
            config,
            evaluations: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Number of evaluations run so far.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Whether an evaluation should run before the next training step.
    #[must_use]
    pub fn is_due(&self, episode: &EpisodeState) -> bool {
        match self.config.every_episodes {
            Some(every) => episode.at_episode_start() && episode.episode_index % every == 0,
            None => false,
        }
    }

    /// Average total reward over the configured number of rollouts.
    ///
    /// # Errors
    ///
    /// Agent and environment errors abort the evaluation and are returned as is.
    pub fn run<A>(&mut self, agent: &A) -> Result<f32, TrainingError>
    where
        A: Agent<Action = E::Action>,
    {
        let rollouts = self.config.rollouts;
        let mut sum = 0.0_f32;
        for _ in 0..rollouts {
            sum += self.rollout(agent)?;
        }
        // Leave the evaluation environment in a fresh episode.
        self.env.reset()?;
        self.evaluations += 1;

        #[allow(clippy::cast_precision_loss)]
        let average = sum / rollouts as f32;
        info!(rollouts, average_reward = average, "evaluation finished");
        Ok(average)
    }

    fn rollout<A>(&mut self, agent: &A) -> Result<f32, TrainingError>
    where
        A: Agent<Action = E::Action>,
    {
        let mut states = self.env.reset()?;
        let mut internals = agent.initial_internals();
        let mut total = 0.0;
        loop {
            let (action, next_internals) = agent.act_independent(&states, internals, true)?;
            internals = next_internals;
            let step = self.env.execute(&action)?;
            total += step.reward;
            if step.terminal.is_terminal() {
                return Ok(total);
            }
            states = step.next_state;
        }
    }
}
