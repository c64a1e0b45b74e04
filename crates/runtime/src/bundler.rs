//! Document composition for a single run.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    DataKey, Document, Event, EventDescriptor, ExitStatus, Reading, RunError, RunStart, RunStop,
};

struct OpenRun {
    start_uid: String,
    descriptor: Option<(String, Vec<String>)>,
    num_events: u64,
}

/// Builds the documents of one run in protocol order.
///
/// Every document gets a fresh uid and a wall-clock time; events are numbered
/// from 1 and must carry exactly the keys the descriptor announced.
pub struct RunBundler {
    rng: fastrand::Rng,
    run: Option<OpenRun>,
}

impl Default for RunBundler {
    fn default() -> Self {
        Self::new()
    }
}

impl RunBundler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
            run: None,
        }
    }

    /// Bundler whose uids are reproducible.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            run: None,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.run.is_some()
    }

    #[must_use]
    pub fn run_uid(&self) -> Option<&str> {
        self.run.as_ref().map(|run| run.start_uid.as_str())
    }

    /// # Errors
    ///
    /// Returns [`RunError::RunAlreadyOpen`] if the previous run was not closed.
    pub fn open_run(&mut self, metadata: serde_json::Value) -> Result<Document, RunError> {
        if self.run.is_some() {
            return Err(RunError::RunAlreadyOpen);
        }
        let uid = self.new_uid();
        self.run = Some(OpenRun {
            start_uid: uid.clone(),
            descriptor: None,
            num_events: 0,
        });
        debug!(%uid, "opened run");
        Ok(Document::Start(RunStart {
            uid,
            time: now(),
            metadata,
        }))
    }

    /// # Errors
    ///
    /// Fails without an open run or if the run was already described.
    pub fn describe(
        &mut self,
        stream: &str,
        data_keys: BTreeMap<String, DataKey>,
    ) -> Result<Document, RunError> {
        let uid = self.new_uid();
        let run = self.run.as_mut().ok_or(RunError::NoOpenRun)?;
        if run.descriptor.is_some() {
            return Err(RunError::DescriptorExists);
        }
        run.descriptor = Some((uid.clone(), data_keys.keys().cloned().collect()));
        Ok(Document::Descriptor(EventDescriptor {
            uid,
            run_start: run.start_uid.clone(),
            time: now(),
            name: stream.to_string(),
            data_keys,
        }))
    }

    /// # Errors
    ///
    /// Fails without an open, described run, or when the readings' keys differ
    /// from the described keys.
    pub fn event(&mut self, readings: BTreeMap<String, Reading>) -> Result<Document, RunError> {
        let uid = self.new_uid();
        let run = self.run.as_mut().ok_or(RunError::NoOpenRun)?;
        let (descriptor_uid, keys) = run.descriptor.as_ref().ok_or(RunError::NoDescriptor)?;
        if !readings.keys().eq(keys.iter()) {
            return Err(RunError::KeyMismatch {
                expected: keys.clone(),
                got: readings.keys().cloned().collect(),
            });
        }

        run.num_events += 1;
        let mut data = BTreeMap::new();
        let mut timestamps = BTreeMap::new();
        for (key, reading) in readings {
            timestamps.insert(key.clone(), reading.timestamp);
            data.insert(key, reading.value);
        }
        Ok(Document::Event(Event {
            uid,
            descriptor: descriptor_uid.clone(),
            seq_num: run.num_events,
            time: now(),
            data,
            timestamps,
        }))
    }

    /// Close the open run.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::NoOpenRun`] if there is nothing to close.
    pub fn close_run(
        &mut self,
        exit_status: ExitStatus,
        reason: impl Into<String>,
    ) -> Result<Document, RunError> {
        let run = self.run.take().ok_or(RunError::NoOpenRun)?;
        debug!(uid = %run.start_uid, ?exit_status, "closed run");
        Ok(Document::Stop(RunStop {
            uid: self.new_uid(),
            run_start: run.start_uid,
            time: now(),
            exit_status,
            reason: reason.into(),
            num_events: run.num_events,
        }))
    }

    fn new_uid(&self) -> String {
        format!("{:016x}{:016x}", self.rng.u64(..), self.rng.u64(..))
    }
}

/// Seconds since the Unix epoch.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn now() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1e6
}
