//! Host wire records — one JSON object per line.
//!
//! Field names follow the Kafka trigger event shape (`Topic`, `Partition`,
//! `Offset`, `Timestamp`, `Key`, `Value`); lowercase names are accepted too.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, HostError};
use crate::pipeline::types::{EventRecord, SentimentResult, Verdict};

/// Payload as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostPayload {
    /// UTF-8 text.
    Text(String),
    /// Arbitrary bytes as an array of numbers.
    Bytes(Vec<u8>),
}

impl HostPayload {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }
}

/// One event record as delivered to the host adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    #[serde(alias = "Topic")]
    pub topic: String,
    #[serde(alias = "Partition", default)]
    pub partition: u32,
    #[serde(alias = "Offset")]
    pub offset: i64,
    /// Stamped on arrival when the producer did not set one.
    #[serde(alias = "Timestamp", default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(alias = "Key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(alias = "Value")]
    pub value: HostPayload,
}

impl From<HostRecord> for EventRecord {
    fn from(record: HostRecord) -> Self {
        EventRecord {
            payload: record.value.into_bytes(),
            key: record.key.map(String::into_bytes),
            partition: record.partition,
            offset: record.offset,
            topic: record.topic,
            timestamp: record.timestamp,
        }
    }
}

/// Parse one NDJSON line. `line_no` is 1-based and only used for errors.
pub fn parse_line(line: &str, line_no: usize) -> Result<EventRecord, HostError> {
    let record: HostRecord =
        serde_json::from_str(line).map_err(|e| HostError::InvalidRecord {
            line: line_no,
            reason: e.to_string(),
        })?;
    Ok(record.into())
}

// ── Output line ─────────────────────────────────────────────────────

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutputStatus {
    Ok {
        polarity: f64,
        subjectivity: f64,
        verdict: Verdict,
    },
    Failed {
        error_kind: String,
        error: String,
    },
}

/// One line of host output. Coordinates are absent for unparseable input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(flatten)]
    pub status: OutputStatus,
}

impl OutputLine {
    /// Build from a handled record and its result.
    pub fn from_result(
        topic: String,
        partition: u32,
        offset: i64,
        result: &Result<SentimentResult, CoreError>,
    ) -> Self {
        let status = match result {
            Ok(r) => OutputStatus::Ok {
                polarity: r.polarity,
                subjectivity: r.subjectivity,
                verdict: r.verdict,
            },
            Err(e) => OutputStatus::Failed {
                error_kind: e.kind().to_string(),
                error: e.to_string(),
            },
        };
        Self {
            topic: Some(topic),
            partition: Some(partition),
            offset: Some(offset),
            status,
        }
    }

    /// Build for input that never became an `EventRecord`.
    pub fn invalid(error: &HostError) -> Self {
        Self {
            topic: None,
            partition: None,
            offset: None,
            status: OutputStatus::Failed {
                error_kind: "invalid_record".to_string(),
                error: error.to_string(),
            },
        }
    }

    /// Build for a record whose worker task died before producing a result.
    pub fn task_failed(error: &HostError) -> Self {
        Self {
            topic: None,
            partition: None,
            offset: None,
            status: OutputStatus::Failed {
                error_kind: "task_failed".to_string(),
                error: error.to_string(),
            },
        }
    }

    /// Attach record coordinates.
    pub fn at(mut self, topic: String, partition: u32, offset: i64) -> Self {
        self.topic = Some(topic);
        self.partition = Some(partition);
        self.offset = Some(offset);
        self
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, OutputStatus::Ok { .. })
    }
}
