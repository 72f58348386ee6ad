//! Error types for the sentiment handler.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Core(#[from] CoreError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Scorer error: {0}")]
    Scorer(#[from] ScorerError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Per-message pipeline errors.
///
/// The first one encountered halts processing of that message. Nothing is
/// recovered locally; redelivery is the host's decision.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Payload is not valid UTF-8: {0}")]
    TextEncoding(String),

    #[error("Payload is not valid JSON: {0}")]
    MalformedPayload(String),

    #[error("Payload does not match schema: {0}")]
    SchemaMismatch(String),

    #[error("Classification failed: {0}")]
    Classification(String),
}

impl CoreError {
    /// Stable snake_case label for logs and host output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TextEncoding(_) => "text_encoding",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::SchemaMismatch(_) => "schema_mismatch",
            Self::Classification(_) => "classification",
        }
    }
}

/// Polarity scorer errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScorerError {
    #[error("Scorer {name} failed: {reason}")]
    Failed { name: String, reason: String },

    #[error("Scorer {name} produced a non-finite score")]
    NonFinite { name: String },

    #[error(
        "Scorer {name} produced an out-of-range score \
         (polarity {polarity}, subjectivity {subjectivity})"
    )]
    OutOfRange {
        name: String,
        polarity: f64,
        subjectivity: f64,
    },
}

/// Host adapter errors (reading and parsing event records).
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid event record on line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    #[error("Worker task failed: {0}")]
    Task(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_error_kinds_are_stable() {
        assert_eq!(CoreError::TextEncoding("x".into()).kind(), "text_encoding");
        assert_eq!(
            CoreError::MalformedPayload("x".into()).kind(),
            "malformed_payload"
        );
        assert_eq!(CoreError::SchemaMismatch("x".into()).kind(), "schema_mismatch");
        assert_eq!(CoreError::Classification("x".into()).kind(), "classification");
    }

    #[test]
    fn core_error_wraps_into_top_level() {
        let err: Error = CoreError::SchemaMismatch("missing `Value`".into()).into();
        assert_eq!(
            err.to_string(),
            "Pipeline error: Payload does not match schema: missing `Value`"
        );
    }
}
