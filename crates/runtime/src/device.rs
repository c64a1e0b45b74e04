use std::collections::BTreeMap;
use std::error::Error as StdError;

use crate::{DataKey, Reading};

/// Completion signal returned by [`Device::trigger`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    done: bool,
    success: bool,
}

impl Status {
    /// A status that completed successfully before it was returned.
    #[must_use]
    pub fn finished() -> Self {
        Self {
            done: true,
            success: true,
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }
}

/// Something that can be staged, triggered, read and unstaged within a run.
///
/// Field names returned by [`read`] and [`describe`] are prefixed with the
/// device name and must form the same key set on every call.
///
/// [`read`]: Device::read
/// [`describe`]: Device::describe
pub trait Device {
    type Error: StdError + Send + Sync + 'static;

    fn name(&self) -> &str;

    /// Prepare the device for acquisition and return it for chaining.
    ///
    /// # Errors
    ///
    /// Implementations report failures of the underlying hardware or simulation.
    fn stage(&mut self) -> Result<&mut Self, Self::Error>
    where
        Self: Sized;

    /// Acquire one reading.
    ///
    /// # Errors
    ///
    /// Implementations report protocol violations and acquisition failures.
    fn trigger(&mut self) -> Result<Status, Self::Error>;

    /// # Errors
    ///
    /// Implementations report failures while releasing resources.
    fn unstage(&mut self) -> Result<(), Self::Error>;

    fn read(&self) -> BTreeMap<String, Reading>;

    fn describe(&self) -> BTreeMap<String, DataKey>;
}
