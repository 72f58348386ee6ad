//! Envelope decoder — event record to extracted text.
//!
//! Order matters: envelope metadata goes to the sink first, then the raw
//! UTF-8 text, and only then is the payload parsed as JSON. A message that
//! fails later still leaves its metadata (and text, when decodable) behind.
//!
//! Pure string parsing, no I/O besides the sink.

use serde_json::Value;
use tracing::debug;

use crate::error::CoreError;
use crate::pipeline::sink::{ObservabilitySink, SinkRecord};
use crate::pipeline::types::{DecodedMessage, EventRecord};

/// Name of the JSON field carrying the text to classify.
pub const VALUE_FIELD: &str = "Value";

/// Why a payload could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFailureKind {
    /// Bytes are not valid UTF-8.
    TextEncoding,
    /// Text is not valid JSON.
    MalformedPayload,
    /// JSON lacks a string `Value` field.
    SchemaMismatch,
}

/// A named decode failure with a human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    pub kind: DecodeFailureKind,
    pub detail: String,
}

impl DecodeFailure {
    fn new(kind: DecodeFailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl From<DecodeFailure> for CoreError {
    fn from(failure: DecodeFailure) -> Self {
        match failure.kind {
            DecodeFailureKind::TextEncoding => CoreError::TextEncoding(failure.detail),
            DecodeFailureKind::MalformedPayload => CoreError::MalformedPayload(failure.detail),
            DecodeFailureKind::SchemaMismatch => CoreError::SchemaMismatch(failure.detail),
        }
    }
}

/// Tagged decode result: typed message or a named failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    Decoded(DecodedMessage),
    Failed(DecodeFailure),
}

impl DecodeOutcome {
    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }

    pub fn into_result(self) -> Result<DecodedMessage, CoreError> {
        match self {
            Self::Decoded(message) => Ok(message),
            Self::Failed(failure) => Err(failure.into()),
        }
    }
}

/// Decode one record. Decoding happens exactly once; there is no retry.
pub fn decode(record: &EventRecord, sink: &dyn ObservabilitySink) -> DecodeOutcome {
    sink.emit(SinkRecord::EnvelopeReceived {
        topic: record.topic.clone(),
        partition: record.partition,
        offset: record.offset,
        key: record.key_display(),
        timestamp: record.timestamp,
    });

    let text = match std::str::from_utf8(&record.payload) {
        Ok(text) => text,
        Err(e) => {
            debug!(
                topic = %record.topic,
                offset = record.offset,
                valid_up_to = e.valid_up_to(),
                "Payload is not UTF-8"
            );
            return DecodeOutcome::Failed(DecodeFailure::new(
                DecodeFailureKind::TextEncoding,
                format!("invalid byte sequence at offset {}", e.valid_up_to()),
            ));
        }
    };

    sink.emit(SinkRecord::RawText {
        text: text.to_string(),
    });

    let json: Value = match serde_json::from_str(text) {
        Ok(json) => json,
        Err(e) => {
            return DecodeOutcome::Failed(DecodeFailure::new(
                DecodeFailureKind::MalformedPayload,
                e.to_string(),
            ));
        }
    };

    match extract_value(&json) {
        Ok(text) => DecodeOutcome::Decoded(DecodedMessage { text }),
        Err(failure) => DecodeOutcome::Failed(failure),
    }
}

/// Pull the `Value` string out of a parsed payload. Other fields are ignored.
fn extract_value(json: &Value) -> Result<String, DecodeFailure> {
    let Some(object) = json.as_object() else {
        return Err(DecodeFailure::new(
            DecodeFailureKind::SchemaMismatch,
            format!("expected a JSON object, got {}", json_type_name(json)),
        ));
    };

    match object.get(VALUE_FIELD) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(DecodeFailure::new(
            DecodeFailureKind::SchemaMismatch,
            format!(
                "field `{VALUE_FIELD}` must be a string, got {}",
                json_type_name(other)
            ),
        )),
        None => Err(DecodeFailure::new(
            DecodeFailureKind::SchemaMismatch,
            format!("missing field `{VALUE_FIELD}`"),
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
