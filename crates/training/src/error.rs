use rl::{AgentError, ConfigError, EnvError};
use runtime::{RunError, SinkError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("trigger called before stage")]
    NotStaged,
    #[error("trigger called without an action")]
    NoAction,
    #[error("record is missing field '{0}'")]
    MissingField(String),
    #[error("record field '{key}' is not {expected}")]
    WrongType { key: String, expected: &'static str },
    #[error("record field '{key}' has invalid terminal code {code}")]
    InvalidTerminal { key: String, code: i64 },
    #[error("terminal record carries no reset state")]
    MissingResetState,
    #[error("non-terminal record carries a reset state")]
    UnexpectedResetState,
    #[error("tell_many received {0} observations, expected exactly one")]
    BatchedTell(usize),
}

/// Everything that can end a training run.
///
/// Agent and environment errors are carried unchanged.
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("adapter protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("run protocol violation: {0}")]
    Run(#[from] RunError),
    #[error("subscriber failed: {0}")]
    Sink(SinkError),
}

impl From<SinkError> for TrainingError {
    /// Unwraps errors that a training component raised from inside a sink.
    fn from(err: SinkError) -> Self {
        match err.into_inner().downcast::<TrainingError>() {
            Ok(inner) => *inner,
            Err(other) => TrainingError::Sink(SinkError::new(other)),
        }
    }
}
