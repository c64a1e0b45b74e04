#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Run Recording
//!
//! The document model a training run is recorded into.
//!
//! A run produces an ordered stream of [`Document`]s: one run start, one event
//! descriptor naming every recorded field, one event per acquisition, and one
//! run stop. Documents are handed synchronously to every [`RecordSink`] in an
//! explicit list; there is no global subscriber registry.
//!
//! Hardware-like components expose their state through the [`Device`] trait
//! (stage, trigger, read, unstage), and [`RunBundler`] turns device readings
//! into correctly ordered, uniquely identified documents.

pub mod bundler;
pub mod device;
pub mod document;
pub mod error;
pub mod sink;

pub use bundler::RunBundler;
pub use device::{Device, Status};
pub use document::{
    DataKey, Document, DocumentKind, Dtype, Event, EventDescriptor, ExitStatus, Reading, RunStart,
    RunStop, Value,
};
pub use error::{RunError, SinkError};
pub use sink::{emit, DocumentCollector, LoggingSink, RecordSink};
