//! Configuration types.
//!
//! Only the host adapter reads configuration. The pipeline itself receives
//! an already-built `ThresholdPolicy` and never touches the environment.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::pipeline::classifier::ThresholdPolicy;

/// Handler configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandlerConfig {
    /// How polarity maps to a verdict.
    pub policy: ThresholdPolicy,
    /// NDJSON file of event records. Stdin when `None`.
    pub input: Option<PathBuf>,
}

impl HandlerConfig {
    /// Build from `SENTIMENT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults; set but invalid keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let neutral_band = match lookup("SENTIMENT_NEUTRAL_BAND") {
            Some(raw) => parse_neutral_band(&raw)?,
            None => 0.0,
        };

        let policy = match lookup("SENTIMENT_POLICY").as_deref().map(str::trim) {
            None | Some("") | Some("two_way") => ThresholdPolicy::TwoWay,
            Some("three_way") => ThresholdPolicy::ThreeWay { neutral_band },
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "SENTIMENT_POLICY".to_string(),
                    message: format!("expected `two_way` or `three_way`, got `{other}`"),
                });
            }
        };

        let input = lookup("SENTIMENT_INPUT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(Self { policy, input })
    }
}

fn parse_neutral_band(raw: &str) -> Result<f64, ConfigError> {
    let band: f64 = raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
        key: "SENTIMENT_NEUTRAL_BAND".to_string(),
        message: format!("{e}"),
    })?;
    if !(0.0..=1.0).contains(&band) {
        return Err(ConfigError::InvalidValue {
            key: "SENTIMENT_NEUTRAL_BAND".to_string(),
            message: format!("must be within [0, 1], got {band}"),
        });
    }
    Ok(band)
}
