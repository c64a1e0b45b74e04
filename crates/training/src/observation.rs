//! Decoding recorded events back into observations.

use runtime::{Event, Value};
use rl::Terminal;

use crate::adapter::is_sentinel;
use crate::ProtocolError;

/// Record keys for one device, `<device>_<field>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservationKeys {
    pub action: String,
    pub next_state: String,
    pub reward: String,
    pub terminal: String,
    pub state_after_reset: String,
    pub evaluation_metric: String,
}

impl ObservationKeys {
    #[must_use]
    pub fn for_device(name: &str) -> Self {
        Self {
            action: format!("{name}_action"),
            next_state: format!("{name}_next_state"),
            reward: format!("{name}_reward"),
            terminal: format!("{name}_terminal"),
            state_after_reset: format!("{name}_state_after_reset"),
            evaluation_metric: format!("{name}_evaluation_metric"),
        }
    }

    /// Dependent keys in the order [`Observation::from_values`] expects.
    #[must_use]
    pub fn dependent(&self) -> [&str; 4] {
        [
            &self.next_state,
            &self.reward,
            &self.terminal,
            &self.state_after_reset,
        ]
    }
}

/// The outcome of one training step as seen by the policy.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub next_state: Vec<f32>,
    pub reward: f32,
    pub terminal: Terminal,
    /// `None` exactly when the record carried the not-applicable sentinel.
    pub state_after_reset: Option<Vec<f32>>,
}

impl Observation {
    /// Decode the four observables of an event.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] if a field is missing or malformed.
    pub fn from_event(event: &Event, keys: &ObservationKeys) -> Result<Self, ProtocolError> {
        Self::decode(keys, keys.dependent().map(|key| event.data.get(key)))
    }

    /// Decode `[next_state, reward, terminal, state_after_reset]` values.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] if a value is missing or malformed.
    pub fn from_values(values: &[Value], keys: &ObservationKeys) -> Result<Self, ProtocolError> {
        Self::decode(keys, [0, 1, 2, 3].map(|index| values.get(index)))
    }

    /// States the agent should act on next: the post-reset state after an
    /// episode ended, otherwise the state the step produced.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingResetState`] for a terminal record
    /// without a reset state.
    pub fn next_states(&self) -> Result<&[f32], ProtocolError> {
        if self.terminal.is_terminal() {
            self.state_after_reset
                .as_deref()
                .ok_or(ProtocolError::MissingResetState)
        } else {
            Ok(&self.next_state)
        }
    }

    fn decode(keys: &ObservationKeys, values: [Option<&Value>; 4]) -> Result<Self, ProtocolError> {
        let [next_state, reward, terminal, state_after_reset] = values;

        let next_state = array(&keys.next_state, next_state)?;
        let reward = number(&keys.reward, reward)?;
        let code = field(&keys.terminal, terminal)?
            .as_i64()
            .ok_or_else(|| wrong_type(&keys.terminal, "an integer"))?;
        let terminal = Terminal::try_from(code).map_err(|_| ProtocolError::InvalidTerminal {
            key: keys.terminal.clone(),
            code,
        })?;

        let reset = array(&keys.state_after_reset, state_after_reset)?;
        let state_after_reset = match (terminal.is_terminal(), is_sentinel(&reset)) {
            (true, false) => Some(reset),
            (true, true) => return Err(ProtocolError::MissingResetState),
            (false, true) => None,
            (false, false) => return Err(ProtocolError::UnexpectedResetState),
        };

        Ok(Self {
            next_state,
            reward,
            terminal,
            state_after_reset,
        })
    }
}

fn field<'v>(key: &str, value: Option<&'v Value>) -> Result<&'v Value, ProtocolError> {
    value.ok_or_else(|| ProtocolError::MissingField(key.to_string()))
}

fn wrong_type(key: &str, expected: &'static str) -> ProtocolError {
    ProtocolError::WrongType {
        key: key.to_string(),
        expected,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn number(key: &str, value: Option<&Value>) -> Result<f32, ProtocolError> {
    field(key, value)?
        .as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| wrong_type(key, "a number"))
}

#[allow(clippy::cast_possible_truncation)]
fn array(key: &str, value: Option<&Value>) -> Result<Vec<f32>, ProtocolError> {
    field(key, value)?
        .as_array()
        .map(|values| values.iter().map(|v| *v as f32).collect())
        .ok_or_else(|| wrong_type(key, "an array"))
}
