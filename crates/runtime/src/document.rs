//! Documents and the values they carry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A recorded value.
///
/// NaN survives in memory; JSON serialisation writes it as `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Number(f64),
    Array(Vec<f64>),
    Json(serde_json::Value),
}

impl Value {
    #[must_use]
    pub fn dtype(&self) -> Dtype {
        match self {
            Value::Integer(_) => Dtype::Integer,
            Value::Number(_) => Dtype::Number,
            Value::Array(_) => Dtype::Array,
            Value::Json(_) => Dtype::Json,
        }
    }

    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Value::Array(values) => vec![values.len()],
            _ => Vec::new(),
        }
    }

    /// Numeric view of integers and numbers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&[f32]> for Value {
    fn from(values: &[f32]) -> Self {
        Value::Array(values.iter().copied().map(f64::from).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Integer,
    Number,
    Array,
    Json,
}

/// Description of one recorded field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataKey {
    pub dtype: Dtype,
    pub shape: Vec<usize>,
    pub source: String,
}

/// One device field as read at a point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: Value,
    pub timestamp: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunStart {
    pub uid: String,
    pub time: f64,
    pub metadata: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventDescriptor {
    pub uid: String,
    pub run_start: String,
    pub time: f64,
    pub name: String,
    pub data_keys: BTreeMap<String, DataKey>,
}

/// One acquisition: a value for every described key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub uid: String,
    pub descriptor: String,
    /// 1-based position of the event within its stream
    pub seq_num: u64,
    pub time: f64,
    pub data: BTreeMap<String, Value>,
    pub timestamps: BTreeMap<String, f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitStatus {
    Success,
    Fail,
    Abort,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunStop {
    pub uid: String,
    pub run_start: String,
    pub time: f64,
    pub exit_status: ExitStatus,
    pub reason: String,
    pub num_events: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "doc", rename_all = "snake_case")]
pub enum Document {
    Start(RunStart),
    Descriptor(EventDescriptor),
    Event(Event),
    Stop(RunStop),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    RunStart,
    Descriptor,
    Event,
    RunStop,
}

impl Document {
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Start(_) => DocumentKind::RunStart,
            Document::Descriptor(_) => DocumentKind::Descriptor,
            Document::Event(_) => DocumentKind::Event,
            Document::Stop(_) => DocumentKind::RunStop,
        }
    }

    #[must_use]
    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Document::Event(event) => Some(event),
            _ => None,
        }
    }
}
