//! Concrete agents and selection by name.

mod a2c;
mod linear;
mod random;
mod reinforce;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use a2c::A2cAgent;
pub use random::RandomAgent;
pub use reinforce::ReinforceAgent;

use crate::{Agent, AgentError, CartPoleAction, ConfigError, Terminal};

/// Agent selector accepted on the command line and in config files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AgentKind {
    Random,
    Reinforce,
    #[default]
    A2c,
}

impl AgentKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AgentKind::Random => "random",
            AgentKind::Reinforce => "reinforce",
            AgentKind::A2c => "a2c",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AgentKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(AgentKind::Random),
            "reinforce" => Ok(AgentKind::Reinforce),
            "a2c" => Ok(AgentKind::A2c),
            other => Err(ConfigError::UnknownAgent(other.to_string())),
        }
    }
}

impl TryFrom<String> for AgentKind {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AgentKind> for String {
    fn from(kind: AgentKind) -> Self {
        kind.name().to_string()
    }
}

/// Hyperparameters shared by the learning agents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub kind: AgentKind,
    pub learning_rate: f32,
    pub discount: f32,
    /// Steps between a2c updates
    pub horizon: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            kind: AgentKind::default(),
            learning_rate: 0.01,
            discount: 0.99,
            horizon: 10,
        }
    }
}

impl AgentConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a non-positive learning rate, a
    /// discount outside `[0, 1]`, or a zero horizon.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::Invalid {
                field: "agent.learning_rate",
                reason: format!("must be positive, got {}", self.learning_rate),
            });
        }
        if !(0.0..=1.0).contains(&self.discount) {
            return Err(ConfigError::Invalid {
                field: "agent.discount",
                reason: format!("must lie in [0, 1], got {}", self.discount),
            });
        }
        if self.horizon == 0 {
            return Err(ConfigError::Invalid {
                field: "agent.horizon",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Any of the built-in agents, chosen at runtime.
pub enum AnyAgent {
    Random(RandomAgent),
    Reinforce(ReinforceAgent),
    A2c(A2cAgent),
}

impl AnyAgent {
    #[must_use]
    pub fn kind(&self) -> AgentKind {
        match self {
            AnyAgent::Random(_) => AgentKind::Random,
            AnyAgent::Reinforce(_) => AgentKind::Reinforce,
            AnyAgent::A2c(_) => AgentKind::A2c,
        }
    }
}

/// Build a new agent for an environment with `state_dim`-dimensional states.
///
/// # Errors
///
/// Returns an error if `config` fails [`AgentConfig::validate`].
pub fn build_agent(config: &AgentConfig, state_dim: usize, seed: u64) -> Result<AnyAgent, ConfigError> {
    config.validate()?;
    let agent = match config.kind {
        AgentKind::Random => AnyAgent::Random(RandomAgent::new(state_dim, seed)),
        AgentKind::Reinforce => AnyAgent::Reinforce(ReinforceAgent::new(
            state_dim,
            config.learning_rate,
            config.discount,
            seed,
        )),
        AgentKind::A2c => AnyAgent::A2c(A2cAgent::new(
            state_dim,
            config.learning_rate,
            config.discount,
            config.horizon,
            seed,
        )),
    };
    tracing::info!(agent = %config.kind, state_dim, "built agent");
    Ok(agent)
}

impl Agent for AnyAgent {
    type Action = CartPoleAction;
    type Internals = ();

    fn act(&mut self, states: &[f32]) -> Result<CartPoleAction, AgentError> {
        match self {
            AnyAgent::Random(agent) => agent.act(states),
            AnyAgent::Reinforce(agent) => agent.act(states),
            AnyAgent::A2c(agent) => agent.act(states),
        }
    }

    fn act_independent(
        &self,
        states: &[f32],
        internals: (),
        deterministic: bool,
    ) -> Result<(CartPoleAction, ()), AgentError> {
        match self {
            AnyAgent::Random(agent) => agent.act_independent(states, internals, deterministic),
            AnyAgent::Reinforce(agent) => agent.act_independent(states, internals, deterministic),
            AnyAgent::A2c(agent) => agent.act_independent(states, internals, deterministic),
        }
    }

    fn observe(&mut self, reward: f32, terminal: Terminal) -> Result<(), AgentError> {
        match self {
            AnyAgent::Random(agent) => agent.observe(reward, terminal),
            AnyAgent::Reinforce(agent) => agent.observe(reward, terminal),
            AnyAgent::A2c(agent) => agent.observe(reward, terminal),
        }
    }

    fn initial_internals(&self) -> Self::Internals {}
}
