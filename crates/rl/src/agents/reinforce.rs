use tracing::debug;

use super::linear::{features, LinearSoftmax};
use crate::agent::validate_states;
use crate::{Agent, AgentError, CartPoleAction, Terminal};

struct Transition {
    features: Vec<f32>,
    action: usize,
    reward: f32,
}

/// Monte-Carlo policy gradient over a linear softmax policy.
///
/// Transitions are buffered for the whole episode and the policy is updated
/// once the episode ends, using normalised discounted returns.
pub struct ReinforceAgent {
    policy: LinearSoftmax,
    state_dim: usize,
    learning_rate: f32,
    discount: f32,
    rng: fastrand::Rng,
    pending: Option<(Vec<f32>, usize)>,
    episode: Vec<Transition>,
    updates: usize,
}

impl ReinforceAgent {
    #[must_use]
    pub fn new(state_dim: usize, learning_rate: f32, discount: f32, seed: u64) -> Self {
        Self {
            policy: LinearSoftmax::zeros(state_dim),
            state_dim,
            learning_rate,
            discount,
            rng: fastrand::Rng::with_seed(seed),
            pending: None,
            episode: Vec::new(),
            updates: 0,
        }
    }

    /// Number of completed policy updates.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates
    }

    fn update(&mut self) {
        let episode = std::mem::take(&mut self.episode);
        if episode.is_empty() {
            return;
        }

        let mut returns = vec![0.0_f32; episode.len()];
        let mut running = 0.0;
        for (t, transition) in episode.iter().enumerate().rev() {
            running = transition.reward + self.discount * running;
            returns[t] = running;
        }

        #[allow(clippy::cast_precision_loss)]
        let n = returns.len() as f32;
        let mean = returns.iter().sum::<f32>() / n;
        let std = (returns.iter().map(|g| (g - mean).powi(2)).sum::<f32>() / n).sqrt();
        for (transition, g) in episode.iter().zip(&returns) {
            let advantage = if returns.len() > 1 {
                (g - mean) / (std + 1e-8)
            } else {
                *g
            };
            self.policy
                .ascend(&transition.features, transition.action, self.learning_rate * advantage);
        }
        self.updates += 1;
        debug!(steps = episode.len(), mean_return = mean, "reinforce update");
    }
}

impl Agent for ReinforceAgent {
    type Action = CartPoleAction;
    type Internals = ();

    fn act(&mut self, states: &[f32]) -> Result<CartPoleAction, AgentError> {
        validate_states(states, self.state_dim)?;
        let x = features(states);
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
        self.episode.push(Transition {
            features,
            action,
            reward,
        });
        if terminal.is_terminal() {
            self.update();
        }
        Ok(())
    }

    fn initial_internals(&self) -> Self::Internals {}
}
