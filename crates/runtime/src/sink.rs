//! Synchronous document fan-out.

use tracing::{debug, info};

use crate::{Document, Event, EventDescriptor, RunStart, RunStop, SinkError};

/// A subscriber to the document stream of a run.
pub trait RecordSink {
    /// Handle one document. Returning an error aborts the emission.
    ///
    /// # Errors
    ///
    /// Implementations decide what counts as a failure.
    fn on_document(&mut self, doc: &Document) -> Result<(), SinkError>;
}

/// Hand `doc` to every sink in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first error any sink reports.
pub fn emit(doc: &Document, sinks: &mut [&mut dyn RecordSink]) -> Result<(), SinkError> {
    for sink in sinks.iter_mut() {
        sink.on_document(doc)?;
    }
    Ok(())
}

/// Keeps every document it receives, in order.
#[derive(Default, Debug)]
pub struct DocumentCollector {
    pub documents: Vec<Document>,
}

impl DocumentCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts(&self) -> impl Iterator<Item = &RunStart> {
        self.documents.iter().filter_map(|doc| match doc {
            Document::Start(start) => Some(start),
            _ => None,
        })
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &EventDescriptor> {
        self.documents.iter().filter_map(|doc| match doc {
            Document::Descriptor(descriptor) => Some(descriptor),
            _ => None,
        })
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.documents.iter().filter_map(Document::as_event)
    }

    pub fn stops(&self) -> impl Iterator<Item = &RunStop> {
        self.documents.iter().filter_map(|doc| match doc {
            Document::Stop(stop) => Some(stop),
            _ => None,
        })
    }
}

impl RecordSink for DocumentCollector {
    fn on_document(&mut self, doc: &Document) -> Result<(), SinkError> {
        self.documents.push(doc.clone());
        Ok(())
    }
}

/// Logs run boundaries at INFO and every event at DEBUG.
#[derive(Default, Debug)]
pub struct LoggingSink {
    events: u64,
}

impl LoggingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for LoggingSink {
    fn on_document(&mut self, doc: &Document) -> Result<(), SinkError> {
        match doc {
            Document::Start(start) => {
                self.events = 0;
                info!(uid = %start.uid, metadata = %start.metadata, "run started");
            }
            Document::Descriptor(descriptor) => {
                let keys: Vec<&str> = descriptor.data_keys.keys().map(String::as_str).collect();
                debug!(stream = %descriptor.name, ?keys, "stream described");
            }
            Document::Event(event) => {
                self.events += 1;
                let data = serde_json::to_string(&event.data).unwrap_or_default();
                debug!(seq_num = event.seq_num, %data, "event");
            }
            Document::Stop(stop) => {
                info!(
                    uid = %stop.run_start,
                    exit_status = ?stop.exit_status,
                    num_events = stop.num_events,
                    seen = self.events,
                    reason = %stop.reason,
                    "run stopped"
                );
            }
        }
        Ok(())
    }
}
