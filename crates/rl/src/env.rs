use physics::{CartPole, CartPoleConfig, Push, STATE_DIM};
use serde::{Deserialize, Serialize};

use crate::EnvError;

/// Why an episode ended, if it did.
///
/// The integer codes are part of the recorded data: `0` while the episode is
/// running, `1` when the controlled system failed (the pole fell), and `2`
/// when the episode horizon was reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Terminal {
    #[default]
    Ongoing,
    Failure,
    Horizon,
}

impl Terminal {
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Terminal::Ongoing => 0,
            Terminal::Failure => 1,
            Terminal::Horizon => 2,
        }
    }

    /// `true` for both failure and horizon.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self != Terminal::Ongoing
    }
}

impl From<Terminal> for i64 {
    fn from(terminal: Terminal) -> Self {
        terminal.code()
    }
}

impl TryFrom<i64> for Terminal {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Terminal::Ongoing),
            1 => Ok(Terminal::Failure),
            2 => Ok(Terminal::Horizon),
            other => Err(format!("unknown terminal code {other}")),
        }
    }
}

/// Outcome of a single [`Env::execute`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub next_state: Vec<f32>,
    pub terminal: Terminal,
    pub reward: f32,
}

/// Reinforcement learning environment trait.
///
/// Inspired by classic frameworks like OpenAI Gym, this trait defines the core
/// interface an environment must provide. [`reset`] starts a new episode and
/// returns its first state; [`execute`] applies one action and reports the new
/// state, whether the episode ended and why, and the reward.
///
/// [`reset`]: Env::reset
/// [`execute`]: Env::execute
pub trait Env {
    /// Environment-defined action type. Callers pass it through untouched.
    type Action;

    /// Reset the environment to a starting state and return that state.
    ///
    /// # Errors
    ///
    /// Implementations report failures of the underlying simulation.
    fn reset(&mut self) -> Result<Vec<f32>, EnvError>;

    /// Advance the environment by one action.
    ///
    /// # Errors
    ///
    /// Implementations reject calls made outside a running episode.
    fn execute(&mut self, action: &Self::Action) -> Result<Step, EnvError>;

    /// Length of every state vector this environment produces.
    fn state_dim(&self) -> usize;
}

/// The two discrete cart-pole actions, recorded as `0` and `1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum CartPoleAction {
    PushLeft,
    PushRight,
}

impl CartPoleAction {
    pub const ALL: [CartPoleAction; 2] = [CartPoleAction::PushLeft, CartPoleAction::PushRight];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            CartPoleAction::PushLeft => 0,
            CartPoleAction::PushRight => 1,
        }
    }
}

impl From<CartPoleAction> for i64 {
    fn from(action: CartPoleAction) -> Self {
        match action {
            CartPoleAction::PushLeft => 0,
            CartPoleAction::PushRight => 1,
        }
    }
}

impl TryFrom<i64> for CartPoleAction {
    type Error = EnvError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CartPoleAction::PushLeft),
            1 => Ok(CartPoleAction::PushRight),
            other => Err(EnvError::InvalidAction(other)),
        }
    }
}

impl From<CartPoleAction> for Push {
    fn from(action: CartPoleAction) -> Self {
        match action {
            CartPoleAction::PushLeft => Push::Left,
            CartPoleAction::PushRight => Push::Right,
        }
    }
}

/// Settings for [`CartPoleEnv`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartPoleEnvConfig {
    #[serde(flatten)]
    pub physics: CartPoleConfig,
    /// Steps after which a still-balanced episode ends with [`Terminal::Horizon`]
    pub max_episode_timesteps: usize,
}

impl Default for CartPoleEnvConfig {
    fn default() -> Self {
        Self {
            physics: CartPoleConfig::default(),
            max_episode_timesteps: 500,
        }
    }
}

/// Cart-pole balancing task with an episode horizon.
///
/// Every step yields a reward of `1.0`, including the step on which the pole
/// falls.
pub struct CartPoleEnv {
    cartpole: CartPole,
    max_episode_timesteps: usize,
    timestep: usize,
    phase: Phase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Fresh,
    Running,
    Done,
}

impl CartPoleEnv {
    /// # Errors
    ///
    /// Returns an error if the physics configuration is invalid.
    pub fn new(config: CartPoleEnvConfig, seed: u64) -> Result<Self, EnvError> {
        Ok(Self {
            cartpole: CartPole::new(config.physics, seed)?,
            max_episode_timesteps: config.max_episode_timesteps,
            timestep: 0,
            phase: Phase::Fresh,
        })
    }

    #[must_use]
    pub fn timestep(&self) -> usize {
        self.timestep
    }

    #[must_use]
    pub fn max_episode_timesteps(&self) -> usize {
        self.max_episode_timesteps
    }
}

impl Env for CartPoleEnv {
    type Action = CartPoleAction;

    fn reset(&mut self) -> Result<Vec<f32>, EnvError> {
        self.timestep = 0;
        self.phase = Phase::Running;
        Ok(self.cartpole.reset().to_vec())
    }

    fn execute(&mut self, action: &CartPoleAction) -> Result<Step, EnvError> {
        match self.phase {
            Phase::Fresh => return Err(EnvError::NotReset),
            Phase::Done => return Err(EnvError::EpisodeOver),
            Phase::Running => {}
        }

        self.cartpole.apply_force((*action).into());
        self.timestep += 1;

        let terminal = if self.cartpole.check_failure() {
            Terminal::Failure
        } else if self.timestep >= self.max_episode_timesteps {
            Terminal::Horizon
        } else {
            Terminal::Ongoing
        };
        if terminal.is_terminal() {
            self.phase = Phase::Done;
        }

        Ok(Step {
            next_state: self.cartpole.state().to_array().to_vec(),
            terminal,
            reward: 1.0,
        })
    }

    fn state_dim(&self) -> usize {
        STATE_DIM
    }
}
