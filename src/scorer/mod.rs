//! Polarity scoring.
//!
//! The classifier only orchestrates and thresholds. Scoring itself sits
//! behind `PolarityScorer` so the lexicon can be swapped for another
//! pretrained model without touching the pipeline.

pub mod lexicon;

pub use lexicon::LexiconScorer;

use crate::error::ScorerError;

/// Raw scores for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Score {
    /// In [-1.0, 1.0].
    pub polarity: f64,
    /// In [0.0, 1.0].
    pub subjectivity: f64,
}

impl Score {
    /// Score of text with no opinion-bearing words.
    pub const NEUTRAL: Score = Score {
        polarity: 0.0,
        subjectivity: 0.0,
    };
}

/// A synchronous, CPU-bound sentiment scorer.
///
/// Implementations must be deterministic and hold no mutable state across
/// calls; the handler shares one instance between concurrent invocations.
pub trait PolarityScorer: Send + Sync {
    /// Scorer name (for logs and errors).
    fn name(&self) -> &str;

    /// Score a piece of text. Empty text must score, not fail.
    fn score(&self, text: &str) -> Result<Score, ScorerError>;
}
