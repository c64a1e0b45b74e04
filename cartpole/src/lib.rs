#![deny(clippy::all, clippy::pedantic)]
//! # Cart-pole training application
//!
//! Library half of the `cartpole` binary: configuration loading, command-line
//! parsing and run wiring live here so they can be tested without spawning
//! the executable.

pub mod app;
pub mod cli;
pub mod config;

pub use app::{run, write_report, RunOutput, DEVICE_NAME};
pub use cli::Cli;
pub use config::{ExperimentConfig, Overrides};
