//! Shared types for the per-message pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Inbound record ──────────────────────────────────────────────────

/// One message as handed over by the host.
///
/// Read-only to the pipeline. Offsets are unique per `(topic, partition)`
/// but delivery may be gapped, repeated or interleaved across partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
    /// Opaque key bytes, if the producer set one.
    pub key: Option<Vec<u8>>,
    /// Source partition.
    pub partition: u32,
    /// Position within the partition.
    pub offset: i64,
    /// Logical stream name.
    pub topic: String,
    /// Producer or broker timestamp.
    pub timestamp: DateTime<Utc>,
}

impl EventRecord {
    /// Create a record stamped with the current time and no key.
    pub fn new(
        topic: impl Into<String>,
        partition: u32,
        offset: i64,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            payload: payload.into(),
            key: None,
            partition,
            offset,
            topic: topic.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Key rendered for logs (invalid UTF-8 replaced, never fails).
    pub fn key_display(&self) -> Option<String> {
        self.key
            .as_ref()
            .map(|k| String::from_utf8_lossy(k).into_owned())
    }
}

// ── Decoded payload ─────────────────────────────────────────────────

/// Text extracted from the `Value` field of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    pub text: String,
}

// ── Classification result ───────────────────────────────────────────

/// Discrete sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Positive,
    Negative,
    /// Only produced under the three-way policy.
    Neutral,
}

impl Verdict {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of classifying one message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// In [-1.0, 1.0]; negative is unfavorable.
    pub polarity: f64,
    /// In [0.0, 1.0]; 0 is fully objective.
    pub subjectivity: f64,
    pub verdict: Verdict,
}

// ── Pipeline state ──────────────────────────────────────────────────

/// Where a single invocation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Initial state: envelope and payload decoding.
    Decoding,
    /// Payload decoded, scoring in progress.
    Classifying,
    /// Verdict produced.
    Completed,
    /// An error halted the message.
    Failed,
}

impl PipelineState {
    /// Check if this state allows transitioning to another state.
    ///
    /// There is no retry edge: redelivery arrives as a fresh invocation.
    pub fn can_transition_to(&self, target: PipelineState) -> bool {
        use PipelineState::*;

        matches!(
            (self, target),
            (Decoding, Classifying) | (Decoding, Failed) |
            (Classifying, Completed) | (Classifying, Failed)
        )
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Decoding => "decoding",
            Self::Classifying => "classifying",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display_handles_missing_and_invalid_keys() {
        let record = EventRecord::new("tweets", 0, 1, b"{}".to_vec());
        assert_eq!(record.key_display(), None);

        let record = record.with_key(vec![b'k', 0xff]);
        assert_eq!(record.key_display().as_deref(), Some("k\u{fffd}"));
    }

    #[test]
    fn with_timestamp_overrides_now() {
        let ts = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = EventRecord::new("tweets", 3, 42, Vec::new()).with_timestamp(ts);
        assert_eq!(record.timestamp, ts);
        assert_eq!(record.partition, 3);
        assert_eq!(record.offset, 42);
    }

    #[test]
    fn verdict_labels_and_serde() {
        assert_eq!(Verdict::Positive.label(), "positive");
        assert_eq!(Verdict::Negative.to_string(), "negative");
        assert_eq!(
            serde_json::to_value(Verdict::Neutral).unwrap(),
            serde_json::json!("neutral")
        );
    }

    #[test]
    fn state_machine_has_no_retry_edge() {
        use PipelineState::*;

        assert!(Decoding.can_transition_to(Classifying));
        assert!(Decoding.can_transition_to(Failed));
        assert!(Classifying.can_transition_to(Completed));
        assert!(Classifying.can_transition_to(Failed));

        assert!(!Decoding.can_transition_to(Completed));
        assert!(!Failed.can_transition_to(Decoding));
        assert!(!Classifying.can_transition_to(Decoding));
        assert!(!Completed.can_transition_to(Failed));
    }

    #[test]
    fn terminal_states() {
        assert!(PipelineState::Completed.is_terminal());
        assert!(PipelineState::Failed.is_terminal());
        assert!(!PipelineState::Decoding.is_terminal());
        assert!(!PipelineState::Classifying.is_terminal());
    }
}
