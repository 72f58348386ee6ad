//! Kafka Sentiment — per-message sentiment classification for a partitioned log.

pub mod config;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod scorer;
