#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Cart-Pole Physics
//!
//! A minimal simulation of the classic cart-pole balancing task.
//!
//! A pole is hinged on top of a cart that moves along a frictionless track.
//! Every step a fixed-magnitude force pushes the cart left or right and the
//! equations of motion are advanced with an explicit Euler step. The pole is
//! considered fallen once its angle from vertical or the cart's distance from
//! the centre of the track crosses the configured limits.
//!
//! ## Usage
//!
//! ```rust
//! use physics::{CartPole, CartPoleConfig, Push};
//!
//! let mut cartpole = CartPole::new(CartPoleConfig::default(), 7).unwrap();
//! let state = cartpole.reset();
//! assert_eq!(state.len(), 4);
//! cartpole.apply_force(Push::Right);
//! assert!(!cartpole.check_failure());
//! ```

pub mod cartpole;
pub mod error;

pub use cartpole::{CartPole, CartPoleConfig, CartPoleState, Push, STATE_DIM};
pub use error::PhysicsError;
