//! Per-message ingestion and classification pipeline.
//!
//! Every record handed over by the host flows through:
//! 1. `decoder::decode()` — envelope metadata, UTF-8, JSON `Value` field
//! 2. `SentimentClassifier::classify()` — polarity, subjectivity, verdict
//!
//! Records go to an injected `ObservabilitySink` along the way. Nothing is
//! kept between invocations.

pub mod classifier;
pub mod decoder;
pub mod handler;
pub mod sink;
pub mod types;

pub use classifier::{SentimentClassifier, ThresholdPolicy};
pub use decoder::{DecodeFailure, DecodeFailureKind, DecodeOutcome, decode};
pub use handler::EventHandler;
pub use sink::{MemorySink, ObservabilitySink, SinkRecord, TracingSink};
pub use types::{DecodedMessage, EventRecord, PipelineState, SentimentResult, Verdict};
