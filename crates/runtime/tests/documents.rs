use std::collections::BTreeMap;

use runtime::{
    emit, DataKey, Document, DocumentCollector, DocumentKind, Dtype, ExitStatus, Reading,
    RecordSink, RunBundler, SinkError, Value,
};

struct FailingSink;

impl RecordSink for FailingSink {
    fn on_document(&mut self, _doc: &Document) -> Result<(), SinkError> {
        Err(SinkError::new("disk full"))
    }
}

fn one_key_run(bundler: &mut RunBundler) -> Vec<Document> {
    let mut keys = BTreeMap::new();
    keys.insert(
        "det_state".to_string(),
        DataKey {
            dtype: Dtype::Array,
            shape: vec![2],
            source: "det".to_string(),
        },
    );
    let mut readings = BTreeMap::new();
    readings.insert(
        "det_state".to_string(),
        Reading {
            value: Value::Array(vec![f64::NAN, f64::NAN]),
            timestamp: 0.0,
        },
    );
    vec![
        bundler.open_run(serde_json::json!({"plan_name": "test"})).unwrap(),
        bundler.describe("primary", keys).unwrap(),
        bundler.event(readings).unwrap(),
        bundler.close_run(ExitStatus::Success, "").unwrap(),
    ]
}

#[test]
fn sinks_receive_documents_in_order() {
    let mut bundler = RunBundler::with_seed(3);
    let mut first = DocumentCollector::new();
    let mut second = DocumentCollector::new();
    for doc in one_key_run(&mut bundler) {
        emit(&doc, &mut [&mut first, &mut second]).unwrap();
    }
    let kinds: Vec<DocumentKind> = first.documents.iter().map(Document::kind).collect();
    assert_eq!(
        kinds,
        vec![
            DocumentKind::RunStart,
            DocumentKind::Descriptor,
            DocumentKind::Event,
            DocumentKind::RunStop
        ]
    );
    assert_eq!(second.documents.len(), 4);
    let start = first.starts().next().unwrap();
    let stop = first.stops().next().unwrap();
    assert_eq!(stop.run_start, start.uid);
    assert_eq!(first.descriptors().count(), 1);
}

#[test]
fn failing_sink_stops_the_fan_out() {
    let mut bundler = RunBundler::with_seed(3);
    let docs = one_key_run(&mut bundler);
    let mut before = DocumentCollector::new();
    let mut after = DocumentCollector::new();
    let err = emit(&docs[0], &mut [&mut before, &mut FailingSink, &mut after]).unwrap_err();
    assert_eq!(err.to_string(), "disk full");
    assert_eq!(before.documents.len(), 1);
    assert!(after.documents.is_empty());
}

#[test]
fn nan_entries_serialize_as_null() {
    let mut bundler = RunBundler::with_seed(5);
    let docs = one_key_run(&mut bundler);
    let json = serde_json::to_value(&docs[2]).unwrap();
    assert_eq!(json["name"], "event");
    assert_eq!(
        json["doc"]["data"]["det_state"],
        serde_json::json!([null, null])
    );
}

#[test]
fn value_accessors() {
    assert_eq!(Value::from(3_i64).as_i64(), Some(3));
    assert_eq!(Value::from(0.5_f32).as_f64(), Some(0.5));
    assert_eq!(Value::from(&[1.0_f32, 2.0][..]).as_array(), Some(&[1.0, 2.0][..]));
    assert_eq!(Value::from(&[1.0_f32][..]).shape(), vec![1]);
    assert_eq!(Value::Integer(1).dtype(), Dtype::Integer);
}
