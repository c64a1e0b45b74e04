use crate::agent::validate_states;
use crate::{Agent, AgentError, CartPoleAction, Terminal};

/// Picks uniformly among the cart-pole actions and ignores feedback.
pub struct RandomAgent {
    state_dim: usize,
    rng: fastrand::Rng,
}

impl RandomAgent {
    #[must_use]
    pub fn new(state_dim: usize, seed: u64) -> Self {
        Self {
            state_dim,
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Agent for RandomAgent {
    type Action = CartPoleAction;
    type Internals = ();

    fn act(&mut self, states: &[f32]) -> Result<CartPoleAction, AgentError> {
        validate_states(states, self.state_dim)?;
        Ok(CartPoleAction::ALL[self.rng.usize(..CartPoleAction::ALL.len())])
    }

    fn act_independent(
        &self,
        states: &[f32],
        internals: (),
        deterministic: bool,
    ) -> Result<(CartPoleAction, ()), AgentError> {
        validate_states(states, self.state_dim)?;
        let index = if deterministic {
            // Frozen pseudo-random choice: same states, same action.
            let bits = states
                .iter()
                .fold(0u32, |acc, v| acc.rotate_left(5) ^ v.to_bits());
            (bits & 1) as usize
        } else {
            fastrand::Rng::new().usize(..CartPoleAction::ALL.len())
        };
        Ok((CartPoleAction::ALL[index], internals))
    }

    fn observe(&mut self, _reward: f32, _terminal: Terminal) -> Result<(), AgentError> {
        Ok(())
    }

    fn initial_internals(&self) -> Self::Internals {}
}
