use std::error::Error as StdError;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("a run is already open")]
    RunAlreadyOpen,
    #[error("no run is open")]
    NoOpenRun,
    #[error("event emitted before the event descriptor")]
    NoDescriptor,
    #[error("the run already has an event descriptor")]
    DescriptorExists,
    #[error("event keys {got:?} do not match described keys {expected:?}")]
    KeyMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },
}

/// A subscriber failed while handling a document.
///
/// The subscriber's own error is kept intact; [`SinkError::into_inner`] hands
/// it back so callers can recover the original type.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct SinkError(Box<dyn StdError + Send + Sync>);

impl SinkError {
    pub fn new(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(err.into())
    }

    #[must_use]
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.0
    }
}
