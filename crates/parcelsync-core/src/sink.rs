use thiserror::Error;

use crate::domain::{Tracking, UtcDateTime};

/// Failure reported by the runtime collaborator while consuming output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("record sink failed: {message}")]
pub struct SinkError {
    message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outbound seam to the stream-execution runtime.
///
/// The engine emits one normalized record per tracking (primary key `id`,
/// replication key `updated_at`) and notifies the sink of the current
/// bookmark after each completed page so partial progress survives a crash.
/// Schema validation, serialization, and bookmark persistence belong to the
/// implementer.
pub trait RecordSink: Send {
    fn emit(&mut self, stream: &str, record: &Tracking) -> Result<(), SinkError>;

    fn bookmark(&mut self, stream: &str, value: UtcDateTime) -> Result<(), SinkError> {
        let _ = (stream, value);
        Ok(())
    }
}

/// In-memory sink for deterministic offline runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<Tracking>,
    pub bookmarks: Vec<UtcDateTime>,
}

impl RecordSink for MemorySink {
    fn emit(&mut self, _stream: &str, record: &Tracking) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn bookmark(&mut self, _stream: &str, value: UtcDateTime) -> Result<(), SinkError> {
        self.bookmarks.push(value);
        Ok(())
    }
}
