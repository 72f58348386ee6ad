//! Observability sink — where pipeline records go.
//!
//! The pipeline never calls the global logger directly. It is handed a sink,
//! so tests can capture records without touching subscriber configuration.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::pipeline::types::Verdict;

/// One structured record emitted at informational severity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SinkRecord {
    /// Envelope metadata, emitted before any payload parsing.
    EnvelopeReceived {
        topic: String,
        partition: u32,
        offset: i64,
        key: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// Payload decoded as UTF-8, emitted before JSON parsing.
    RawText { text: String },
    /// Final scores and verdict.
    Classified {
        text: String,
        polarity: f64,
        subjectivity: f64,
        verdict: Verdict,
    },
}

impl SinkRecord {
    /// Short label for logging and assertions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EnvelopeReceived { .. } => "envelope_received",
            Self::RawText { .. } => "raw_text",
            Self::Classified { .. } => "classified",
        }
    }
}

/// Destination for pipeline records.
pub trait ObservabilitySink: Send + Sync {
    fn emit(&self, record: SinkRecord);
}

// ── Tracing sink ────────────────────────────────────────────────────

/// Forwards every record to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ObservabilitySink for TracingSink {
    fn emit(&self, record: SinkRecord) {
        match record {
            SinkRecord::EnvelopeReceived {
                topic,
                partition,
                offset,
                key,
                timestamp,
            } => {
                info!(
                    topic = %topic,
                    partition,
                    offset,
                    key = key.as_deref().unwrap_or("<none>"),
                    timestamp = %timestamp.to_rfc3339(),
                    "Envelope received"
                );
            }
            SinkRecord::RawText { text } => {
                info!(text = %text, "Payload decoded");
            }
            SinkRecord::Classified {
                text,
                polarity,
                subjectivity,
                verdict,
            } => {
                info!(
                    text = %text,
                    polarity,
                    subjectivity,
                    verdict = verdict.label(),
                    "Sentiment classified"
                );
            }
        }
    }
}

// ── Memory sink ─────────────────────────────────────────────────────

/// Captures records in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<SinkRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn records(&self) -> Vec<SinkRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Labels of everything emitted so far.
    pub fn labels(&self) -> Vec<&'static str> {
        self.records().iter().map(SinkRecord::label).collect()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObservabilitySink for MemorySink {
    fn emit(&self, record: SinkRecord) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record);
    }
}
