//! Episode bookkeeping.

use std::fmt;
use std::str::FromStr;

use rl::{ConfigError, Terminal};
use serde::{Deserialize, Serialize};

/// Which terminal codes end an episode for bookkeeping purposes.
///
/// The environment resets on every non-zero terminal code regardless; this
/// only decides whether a horizon-reached step closes the episode in the
/// tracker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalPolicy {
    /// Failure (1) and horizon (2) both end the episode.
    #[default]
    Any,
    /// Only failure (1) ends the episode.
    FailureOnly,
}

impl TerminalPolicy {
    #[must_use]
    pub fn ends_episode(self, terminal: Terminal) -> bool {
        match self {
            TerminalPolicy::Any => terminal.is_terminal(),
            TerminalPolicy::FailureOnly => terminal == Terminal::Failure,
        }
    }
}

impl fmt::Display for TerminalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TerminalPolicy::Any => "any",
            TerminalPolicy::FailureOnly => "failure-only",
        })
    }
}

impl FromStr for TerminalPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(TerminalPolicy::Any),
            "failure-only" => Ok(TerminalPolicy::FailureOnly),
            other => Err(ConfigError::UnknownTerminalPolicy(other.to_string())),
        }
    }
}

/// Position within the training trajectory.
///
/// Episodes are numbered from 1; `step_index` counts steps already taken in
/// the current episode.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EpisodeState {
    pub episode_index: usize,
    pub step_index: usize,
    pub total_reward: f32,
}

impl Default for EpisodeState {
    fn default() -> Self {
        Self {
            episode_index: 1,
            step_index: 0,
            total_reward: 0.0,
        }
    }
}

/// A finished episode.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub episode_index: usize,
    pub steps: usize,
    pub total_reward: f32,
    pub terminal: Terminal,
}

impl EpisodeState {
    /// Account for one step.
    ///
    /// Returns the next state and, if the step ended the episode, its summary.
    #[must_use]
    pub fn observe(
        self,
        reward: f32,
        terminal: Terminal,
        policy: TerminalPolicy,
    ) -> (Self, Option<EpisodeSummary>) {
        let total_reward = self.total_reward + reward;
        if policy.ends_episode(terminal) {
            let summary = EpisodeSummary {
                episode_index: self.episode_index,
                steps: self.step_index + 1,
                total_reward,
                terminal,
            };
            let next = Self {
                episode_index: self.episode_index + 1,
                step_index: 0,
                total_reward: 0.0,
            };
            (next, Some(summary))
        } else {
            let next = Self {
                episode_index: self.episode_index,
                step_index: self.step_index + 1,
                total_reward,
            };
            (next, None)
        }
    }

    /// `true` once more than `episode_count` episodes have started.
    #[must_use]
    pub fn exhausted(&self, episode_count: usize) -> bool {
        self.episode_index > episode_count
    }

    /// `true` before the first step of an episode.
    #[must_use]
    pub fn at_episode_start(&self) -> bool {
        self.step_index == 0
    }
}
