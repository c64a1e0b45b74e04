use physics::PhysicsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvError {
    #[error("execute called before the first reset")]
    NotReset,
    #[error("execute called after a terminal step without an intervening reset")]
    EpisodeOver,
    #[error("invalid action code {0}")]
    InvalidAction(i64),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("state has {got} components, expected {expected}")]
    StateDim { expected: usize, got: usize },
    #[error("state contains a non-finite component at index {0}")]
    NonFiniteState(usize),
    #[error("observe called without a preceding act")]
    ObserveWithoutAct,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("agent name '{0}' is not recognized, expected one of: random, reinforce, a2c")]
    UnknownAgent(String),
    #[error("terminal policy '{0}' is not recognized, expected one of: any, failure-only")]
    UnknownTerminalPolicy(String),
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
