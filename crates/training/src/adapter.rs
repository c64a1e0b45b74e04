//! Environment adapter exposing an [`Env`] as a recordable [`Device`].

use std::collections::BTreeMap;

use rl::{Env, Terminal};
use runtime::bundler::now;
use runtime::{DataKey, Device, Reading, Status, Value};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{ObservationKeys, ProtocolError, TrainingError};

/// State vector meaning "not applicable": every component is NaN.
#[must_use]
pub fn sentinel(dim: usize) -> Vec<f32> {
    vec![f32::NAN; dim]
}

#[must_use]
pub fn is_sentinel(states: &[f32]) -> bool {
    states.iter().all(|v| v.is_nan())
}

/// Wraps an environment behind the stage/trigger/read/unstage lifecycle.
///
/// After every trigger the device holds the applied action, the resulting
/// state, reward and terminal flag, and, when the step ended the episode, the
/// state of the freshly reset environment. The evaluation metric is set by the
/// driver ahead of a trigger and cleared once it has been read.
pub struct EnvDevice<E: Env> {
    name: String,
    keys: ObservationKeys,
    env: E,
    staged: bool,
    action: Option<E::Action>,
    action_value: Value,
    next_state: Vec<f32>,
    reward: f32,
    terminal: Terminal,
    state_after_reset: Vec<f32>,
    evaluation_metric: f32,
    timestamp: f64,
}

impl<E> EnvDevice<E>
where
    E: Env,
    E::Action: Serialize,
{
    #[must_use]
    pub fn new(name: impl Into<String>, env: E) -> Self {
        let name = name.into();
        let dim = env.state_dim();
        Self {
            keys: ObservationKeys::for_device(&name),
            name,
            env,
            staged: false,
            action: None,
            action_value: Value::Json(serde_json::Value::Null),
            next_state: sentinel(dim),
            reward: 0.0,
            terminal: Terminal::Ongoing,
            state_after_reset: sentinel(dim),
            evaluation_metric: 0.0,
            timestamp: now(),
        }
    }

    #[must_use]
    pub fn keys(&self) -> &ObservationKeys {
        &self.keys
    }

    #[must_use]
    pub fn env(&self) -> &E {
        &self.env
    }

    #[must_use]
    pub fn is_staged(&self) -> bool {
        self.staged
    }

    /// Set the action the next [`Device::trigger`] applies.
    pub fn set_action(&mut self, action: E::Action) {
        self.action_value = match serde_json::to_value(&action) {
            Ok(json) => match json.as_i64() {
                Some(code) => Value::Integer(code),
                None => Value::Json(json),
            },
            Err(err) => {
                warn!(device = %self.name, %err, "action is not representable, recording null");
                Value::Json(serde_json::Value::Null)
            }
        };
        self.action = Some(action);
    }

    #[must_use]
    pub fn action(&self) -> Option<&E::Action> {
        self.action.as_ref()
    }

    #[must_use]
    pub fn next_state(&self) -> &[f32] {
        &self.next_state
    }

    #[must_use]
    pub fn reward(&self) -> f32 {
        self.reward
    }

    #[must_use]
    pub fn terminal(&self) -> Terminal {
        self.terminal
    }

    /// Post-reset state, or `None` while it holds the sentinel.
    #[must_use]
    pub fn state_after_reset(&self) -> Option<&[f32]> {
        if is_sentinel(&self.state_after_reset) {
            None
        } else {
            Some(&self.state_after_reset)
        }
    }

    #[must_use]
    pub fn evaluation_metric(&self) -> f32 {
        self.evaluation_metric
    }

    pub fn set_evaluation_metric(&mut self, value: f32) {
        self.evaluation_metric = value;
    }

    pub fn clear_evaluation_metric(&mut self) {
        self.evaluation_metric = 0.0;
    }
}

impl<E> Device for EnvDevice<E>
where
    E: Env,
    E::Action: Serialize,
{
    type Error = TrainingError;

    fn name(&self) -> &str {
        &self.name
    }

    /// Reset the environment and publish its state as the post-reset state.
    fn stage(&mut self) -> Result<&mut Self, TrainingError> {
        self.state_after_reset = self.env.reset()?;
        self.next_state = sentinel(self.env.state_dim());
        self.terminal = Terminal::Ongoing;
        self.reward = 0.0;
        self.staged = true;
        self.timestamp = now();
        debug!(device = %self.name, "staged");
        Ok(self)
    }

    fn trigger(&mut self) -> Result<Status, TrainingError> {
        if !self.staged {
            return Err(ProtocolError::NotStaged.into());
        }
        let action = self.action.as_ref().ok_or(ProtocolError::NoAction)?;
        let step = self.env.execute(action)?;

        self.next_state = step.next_state;
        self.terminal = step.terminal;
        self.reward = step.reward;
        // The environment reports two endings: 1 when the pole fell,
        // 2 when the episode horizon was reached. Both need a reset.
        self.state_after_reset = if step.terminal.is_terminal() {
            self.env.reset()?
        } else {
            sentinel(self.env.state_dim())
        };
        self.timestamp = now();
        Ok(Status::finished())
    }

    fn unstage(&mut self) -> Result<(), TrainingError> {
        self.staged = false;
        debug!(device = %self.name, "unstaged");
        Ok(())
    }

    fn read(&self) -> BTreeMap<String, Reading> {
        let reading = |value: Value| Reading {
            value,
            timestamp: self.timestamp,
        };
        let mut readings = BTreeMap::new();
        readings.insert(self.keys.action.clone(), reading(self.action_value.clone()));
        readings.insert(
            self.keys.next_state.clone(),
            reading(Value::from(self.next_state.as_slice())),
        );
        readings.insert(self.keys.reward.clone(), reading(Value::from(self.reward)));
        readings.insert(
            self.keys.terminal.clone(),
            reading(Value::Integer(self.terminal.code())),
        );
        readings.insert(
            self.keys.state_after_reset.clone(),
            reading(Value::from(self.state_after_reset.as_slice())),
        );
        readings.insert(
            self.keys.evaluation_metric.clone(),
            reading(Value::from(self.evaluation_metric)),
        );
        readings
    }

    fn describe(&self) -> BTreeMap<String, DataKey> {
        self.read()
            .into_iter()
            .map(|(key, reading)| {
                let data_key = DataKey {
                    dtype: reading.value.dtype(),
                    shape: reading.value.shape(),
                    source: format!("sim://{}/{}", self.name, key),
                };
                (key, data_key)
            })
            .collect()
    }
}
