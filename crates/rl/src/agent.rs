use crate::{AgentError, Terminal};

/// A decision-making policy that learns from observed rewards.
///
/// Training interleaves [`act`] and [`observe`]: every action returned by
/// `act` is followed by exactly one `observe` carrying the reward and terminal
/// flag that action produced. [`act_independent`] answers queries outside that
/// interleaving, for example evaluation rollouts, and borrows the agent
/// immutably so it can never change what the agent has learned.
///
/// [`act`]: Agent::act
/// [`observe`]: Agent::observe
/// [`act_independent`]: Agent::act_independent
pub trait Agent {
    type Action;
    /// Per-rollout state threaded through independent queries.
    type Internals: Clone;

    /// Choose the next training action for `states`.
    ///
    /// # Errors
    ///
    /// Returns an error if `states` has the wrong length or a non-finite component.
    fn act(&mut self, states: &[f32]) -> Result<Self::Action, AgentError>;

    /// Choose an action without recording it for learning.
    ///
    /// # Errors
    ///
    /// Returns an error if `states` has the wrong length or a non-finite component.
    fn act_independent(
        &self,
        states: &[f32],
        internals: Self::Internals,
        deterministic: bool,
    ) -> Result<(Self::Action, Self::Internals), AgentError>;

    /// Feed back the outcome of the most recent [`Agent::act`].
    ///
    /// # Errors
    ///
    /// Learning agents return [`AgentError::ObserveWithoutAct`] when there is
    /// no pending action to attribute the reward to.
    fn observe(&mut self, reward: f32, terminal: Terminal) -> Result<(), AgentError>;

    fn initial_internals(&self) -> Self::Internals;
}

/// Reject states of the wrong length or containing NaN/infinite values.
///
/// # Errors
///
/// See [`AgentError::StateDim`] and [`AgentError::NonFiniteState`].
pub fn validate_states(states: &[f32], expected: usize) -> Result<(), AgentError> {
    if states.len() != expected {
        return Err(AgentError::StateDim {
            expected,
            got: states.len(),
        });
    }
    match states.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(AgentError::NonFiniteState(index)),
        None => Ok(()),
    }
}
