#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Recorded Training Loop
//!
//! Couples an [`rl::Agent`] to an [`rl::Env`] through a recordable device and
//! drives training one recorded event at a time.
//!
//! ## Control flow
//!
//! 1.  [`train_agent`] stages the [`EnvDevice`], asks the agent for a first
//!     action from the post-reset state, and pushes it onto the action queue.
//! 2.  Each loop iteration pops an action, optionally runs the
//!     [`EvaluationRunner`] at the start of an episode, triggers the device,
//!     and emits the resulting event.
//! 3.  Emission synchronously calls every sink, ending with the
//!     [`PolicyCallback`], which feeds the reward to the agent, advances the
//!     [`EpisodeState`], and enqueues the next action.
//! 4.  Once the episode budget is spent the callback stops enqueueing, the
//!     queue drains, and the run is closed.
//!
//! The [`Recommender`] restates step 3 as a tell/ask mailbox; both paths share
//! [`policy_step`].

pub mod adapter;
pub mod callback;
pub mod driver;
pub mod episode;
pub mod error;
pub mod evaluation;
pub mod observation;
pub mod policy;
pub mod recommender;

pub use adapter::{is_sentinel, sentinel, EnvDevice};
pub use callback::PolicyCallback;
pub use driver::{train_agent, TrainingConfig, TrainingReport, PLAN_NAME};
pub use episode::{EpisodeState, EpisodeSummary, TerminalPolicy};
pub use error::{ProtocolError, TrainingError};
pub use evaluation::{EvaluationConfig, EvaluationResult, EvaluationRunner};
pub use observation::{Observation, ObservationKeys};
pub use policy::{policy_step, PolicyOutcome};
pub use recommender::{adaptive_plan, Recommender};
