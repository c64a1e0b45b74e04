use tracing::debug;

use super::linear::{dot, features, LinearSoftmax};
use crate::agent::validate_states;
use crate::{Agent, AgentError, CartPoleAction, Terminal};

struct Transition {
    features: Vec<f32>,
    action: usize,
    reward: f32,
}

/// Advantage actor-critic with a linear policy and a linear value baseline.
///
/// Updates run every `horizon` observed steps, bootstrapping from the value of
/// the state the next `act` is asked about, or at episode end with a zero
/// bootstrap.
pub struct A2cAgent {
    policy: LinearSoftmax,
    value: Vec<f32>,
    state_dim: usize,
    learning_rate: f32,
    discount: f32,
    horizon: usize,
    rng: fastrand::Rng,
    pending: Option<(Vec<f32>, usize)>,
    buffer: Vec<Transition>,
    updates: usize,
}

impl A2cAgent {
    #[must_use]
    pub fn new(state_dim: usize, learning_rate: f32, discount: f32, horizon: usize, seed: u64) -> Self {
        Self {
            policy: LinearSoftmax::zeros(state_dim),
            value: vec![0.0; state_dim + 1],
            state_dim,
            learning_rate,
            discount,
            horizon: horizon.max(1),
            rng: fastrand::Rng::with_seed(seed),
            pending: None,
            buffer: Vec::new(),
            updates: 0,
        }
    }

    /// Number of completed actor-critic updates.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates
    }

    fn update(&mut self, bootstrap: f32) {
        let buffer = std::mem::take(&mut self.buffer);
        let mut running = bootstrap;
        for transition in buffer.iter().rev() {
            running = transition.reward + self.discount * running;
            let advantage = running - dot(&self.value, &transition.features);
            for (w, x) in self.value.iter_mut().zip(&transition.features) {
                *w += self.learning_rate * advantage * x;
            }
            self.policy
                .ascend(&transition.features, transition.action, self.learning_rate * advantage);
        }
        self.updates += 1;
        debug!(steps = buffer.len(), bootstrap, "a2c update");
    }
}

impl Agent for A2cAgent {
    type Action = CartPoleAction;
    type Internals = ();

    fn act(&mut self, states: &[f32]) -> Result<CartPoleAction, AgentError> {
        validate_states(states, self.state_dim)?;
        let x = features(states);
        if self.buffer.len() >= self.horizon {
            let bootstrap = dot(&self.value, &x);
            self.update(bootstrap);
        }
        let action = self.policy.sample(&x, &self.rng);
        self.pending = Some((x, action));
        Ok(CartPoleAction::ALL[action])
    }

    fn act_independent(
        &self,
        states: &[f32],
        internals: (),
        deterministic: bool,
    ) -> Result<(CartPoleAction, ()), AgentError> {
        validate_states(states, self.state_dim)?;
        let x = features(states);
        let action = if deterministic {
            self.policy.greedy(&x)
        } else {
            self.policy.sample(&x, &fastrand::Rng::new())
        };
        Ok((CartPoleAction::ALL[action], internals))
    }

    fn observe(&mut self, reward: f32, terminal: Terminal) -> Result<(), AgentError> {
        let (features, action) = self.pending.take().ok_or(AgentError::ObserveWithoutAct)?;
        self.buffer.push(Transition {
            features,
            action,
            reward,
        });
        if terminal.is_terminal() {
            self.update(0.0);
        }
        Ok(())
    }

    fn initial_internals(&self) -> Self::Internals {}
}
