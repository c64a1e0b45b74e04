#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Reinforcement Learning Boundaries
//!
//! The two collaborators a training run talks to:
//!
//! -   [`Env`]: a simulated system exposing `reset` and `execute`. The
//!     [`CartPoleEnv`] implementation wraps the [`physics`] cart-pole with an
//!     episode horizon.
//! -   [`Agent`]: a policy that proposes actions with `act`, learns from
//!     `observe`, and can be queried without side effects through
//!     `act_independent` for evaluation rollouts.
//!
//! Concrete agents live in [`agents`] and are selected by name through
//! [`AgentKind`].

pub mod agent;
pub mod agents;
pub mod env;
pub mod error;

pub use agent::Agent;
pub use agents::{build_agent, A2cAgent, AgentConfig, AgentKind, AnyAgent, RandomAgent, ReinforceAgent};
pub use env::{CartPoleAction, CartPoleEnv, CartPoleEnvConfig, Env, Step, Terminal};
pub use error::{AgentError, ConfigError, EnvError};
