//! Sentiment classifier — text to scores to verdict.
//!
//! Scoring is delegated to a `PolarityScorer`. This module owns the threshold
//! policy and the error mapping, nothing else.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{CoreError, ScorerError};
use crate::pipeline::sink::{ObservabilitySink, SinkRecord};
use crate::pipeline::types::{SentimentResult, Verdict};
use crate::scorer::{PolarityScorer, Score};

/// How a polarity score maps to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ThresholdPolicy {
    /// `polarity < 0` is Negative, anything else (including exactly 0.0)
    /// is Positive. Never yields Neutral.
    #[default]
    TwoWay,
    /// `|polarity| <= neutral_band` is Neutral, otherwise by sign.
    ThreeWay { neutral_band: f64 },
}

impl ThresholdPolicy {
    pub fn verdict(&self, polarity: f64) -> Verdict {
        match *self {
            Self::TwoWay => {
                if polarity < 0.0 {
                    Verdict::Negative
                } else {
                    Verdict::Positive
                }
            }
            Self::ThreeWay { neutral_band } => {
                if polarity.abs() <= neutral_band {
                    Verdict::Neutral
                } else if polarity < 0.0 {
                    Verdict::Negative
                } else {
                    Verdict::Positive
                }
            }
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TwoWay => "two_way",
            Self::ThreeWay { .. } => "three_way",
        }
    }
}

/// Scores text and applies the threshold policy.
pub struct SentimentClassifier {
    scorer: Arc<dyn PolarityScorer>,
    policy: ThresholdPolicy,
}

impl SentimentClassifier {
    pub fn new(scorer: Arc<dyn PolarityScorer>, policy: ThresholdPolicy) -> Self {
        Self { scorer, policy }
    }

    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    /// Classify one piece of text. Empty text is valid input.
    ///
    /// Same text in, same result out: the scorer is deterministic and the
    /// policy is fixed at construction.
    pub fn classify(
        &self,
        text: &str,
        sink: &dyn ObservabilitySink,
    ) -> Result<SentimentResult, CoreError> {
        let score = self.scorer.score(text).map_err(|e| {
            warn!(scorer = self.scorer.name(), error = %e, "Scorer failed");
            CoreError::Classification(e.to_string())
        })?;
        let score = self.check_range(score)?;

        let verdict = self.policy.verdict(score.polarity);
        debug!(
            scorer = self.scorer.name(),
            policy = self.policy.label(),
            polarity = score.polarity,
            verdict = verdict.label(),
            "Applied threshold policy"
        );

        let result = SentimentResult {
            polarity: score.polarity,
            subjectivity: score.subjectivity,
            verdict,
        };

        sink.emit(SinkRecord::Classified {
            text: text.to_string(),
            polarity: result.polarity,
            subjectivity: result.subjectivity,
            verdict: result.verdict,
        });

        Ok(result)
    }

    /// Scores must be finite with polarity in [-1, 1] and subjectivity in
    /// [0, 1]. Anything else is rejected, never clamped.
    fn check_range(&self, score: Score) -> Result<Score, CoreError> {
        let name = self.scorer.name().to_string();
        let err = if !(score.polarity.is_finite() && score.subjectivity.is_finite()) {
            ScorerError::NonFinite { name }
        } else if (-1.0..=1.0).contains(&score.polarity)
            && (0.0..=1.0).contains(&score.subjectivity)
        {
            return Ok(score);
        } else {
            ScorerError::OutOfRange {
                name,
                polarity: score.polarity,
                subjectivity: score.subjectivity,
            }
        };
        warn!(error = %err, "Rejecting score");
        Err(CoreError::Classification(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sink::MemorySink;
    use crate::scorer::LexiconScorer;

    /// Scorer that always returns the same polarity.
    struct FixedScorer(f64);

    impl PolarityScorer for FixedScorer {
        fn name(&self) -> &str {
            "fixed"
        }
        fn score(&self, _text: &str) -> Result<Score, ScorerError> {
            Ok(Score {
                polarity: self.0,
                subjectivity: 0.5,
            })
        }
    }

    /// Scorer that returns a raw score unchecked.
    struct RawScorer(Score);

    impl PolarityScorer for RawScorer {
        fn name(&self) -> &str {
            "raw"
        }
        fn score(&self, _text: &str) -> Result<Score, ScorerError> {
            Ok(self.0)
        }
    }

    struct FailingScorer;

    impl PolarityScorer for FailingScorer {
        fn name(&self) -> &str {
            "failing"
        }
        fn score(&self, _text: &str) -> Result<Score, ScorerError> {
            Err(ScorerError::Failed {
                name: "failing".into(),
                reason: "model unavailable".into(),
            })
        }
    }

    fn classify_with(
        scorer: impl PolarityScorer + 'static,
        policy: ThresholdPolicy,
    ) -> Result<SentimentResult, CoreError> {
        let classifier = SentimentClassifier::new(Arc::new(scorer), policy);
        classifier.classify("anything", &MemorySink::new())
    }

    #[test]
    fn two_way_zero_is_positive() {
        assert_eq!(ThresholdPolicy::TwoWay.verdict(0.0), Verdict::Positive);
        assert_eq!(ThresholdPolicy::TwoWay.verdict(-0.0), Verdict::Positive);
    }

    #[test]
    fn two_way_sign_boundaries() {
        let policy = ThresholdPolicy::TwoWay;
        assert_eq!(policy.verdict(-f64::MIN_POSITIVE), Verdict::Negative);
        assert_eq!(policy.verdict(-1.0), Verdict::Negative);
        assert_eq!(policy.verdict(f64::MIN_POSITIVE), Verdict::Positive);
        assert_eq!(policy.verdict(1.0), Verdict::Positive);
    }

    #[test]
    fn two_way_never_neutral() {
        let policy = ThresholdPolicy::TwoWay;
        for p in [-1.0, -0.5, -0.01, 0.0, 0.01, 0.5, 1.0] {
            assert_ne!(policy.verdict(p), Verdict::Neutral);
        }
    }

    #[test]
    fn three_way_band_is_inclusive() {
        let policy = ThresholdPolicy::ThreeWay { neutral_band: 0.1 };
        assert_eq!(policy.verdict(0.0), Verdict::Neutral);
        assert_eq!(policy.verdict(0.1), Verdict::Neutral);
        assert_eq!(policy.verdict(-0.1), Verdict::Neutral);
        assert_eq!(policy.verdict(0.11), Verdict::Positive);
        assert_eq!(policy.verdict(-0.11), Verdict::Negative);
    }

    #[test]
    fn three_way_zero_band_only_exact_zero_is_neutral() {
        let policy = ThresholdPolicy::ThreeWay { neutral_band: 0.0 };
        assert_eq!(policy.verdict(0.0), Verdict::Neutral);
        assert_eq!(policy.verdict(0.001), Verdict::Positive);
        assert_eq!(policy.verdict(-0.001), Verdict::Negative);
    }

    #[test]
    fn fixed_score_maps_through_policy() {
        let result = classify_with(FixedScorer(-0.3), ThresholdPolicy::TwoWay).unwrap();
        assert_eq!(result.verdict, Verdict::Negative);
        assert_eq!(result.polarity, -0.3);
        assert_eq!(result.subjectivity, 0.5);
    }

    #[test]
    fn scorer_failure_is_classification_error() {
        let err = classify_with(FailingScorer, ThresholdPolicy::TwoWay).unwrap_err();
        assert_eq!(err.kind(), "classification");
        assert!(err.to_string().contains("model unavailable"));
    }

    #[test]
    fn non_finite_score_is_classification_error() {
        let err = classify_with(FixedScorer(f64::NAN), ThresholdPolicy::TwoWay).unwrap_err();
        assert!(matches!(err, CoreError::Classification(_)));
    }

    #[test]
    fn out_of_range_score_is_classification_error() {
        let sink = MemorySink::new();
        let classifier = SentimentClassifier::new(
            Arc::new(RawScorer(Score {
                polarity: 2.5,
                subjectivity: -3.0,
            })),
            ThresholdPolicy::TwoWay,
        );
        let err = classifier.classify("x", &sink).unwrap_err();
        assert!(matches!(err, CoreError::Classification(_)));
        assert!(err.to_string().contains("out-of-range"));
        assert!(sink.is_empty());

        for (polarity, subjectivity) in [(1.01, 0.5), (-1.01, 0.5), (0.5, 1.01), (0.5, -0.01)] {
            let err = classify_with(
                RawScorer(Score {
                    polarity,
                    subjectivity,
                }),
                ThresholdPolicy::TwoWay,
            )
            .unwrap_err();
            assert_eq!(err.kind(), "classification", "{polarity}/{subjectivity}");
        }
    }

    #[test]
    fn range_bounds_are_accepted() {
        for (polarity, subjectivity) in [(-1.0, 0.0), (1.0, 1.0), (0.0, 0.0)] {
            let result = classify_with(
                RawScorer(Score {
                    polarity,
                    subjectivity,
                }),
                ThresholdPolicy::TwoWay,
            )
            .unwrap();
            assert_eq!(result.polarity, polarity);
            assert_eq!(result.subjectivity, subjectivity);
        }
    }

    #[test]
    fn failure_emits_nothing() {
        let sink = MemorySink::new();
        let classifier =
            SentimentClassifier::new(Arc::new(FailingScorer), ThresholdPolicy::TwoWay);
        assert!(classifier.classify("text", &sink).is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn empty_text_is_positive_boundary() {
        let sink = MemorySink::new();
        let classifier =
            SentimentClassifier::new(Arc::new(LexiconScorer::new()), ThresholdPolicy::TwoWay);
        let result = classifier.classify("", &sink).unwrap();
        assert_eq!(result.polarity, 0.0);
        assert_eq!(result.subjectivity, 0.0);
        assert_eq!(result.verdict, Verdict::Positive);
    }

    #[test]
    fn emits_classified_record() {
        let sink = MemorySink::new();
        let classifier =
            SentimentClassifier::new(Arc::new(LexiconScorer::new()), ThresholdPolicy::TwoWay);
        let result = classifier.classify("great", &sink).unwrap();

        assert_eq!(
            sink.records(),
            vec![SinkRecord::Classified {
                text: "great".into(),
                polarity: result.polarity,
                subjectivity: result.subjectivity,
                verdict: Verdict::Positive,
            }]
        );
    }

    #[test]
    fn classify_is_deterministic() {
        let classifier =
            SentimentClassifier::new(Arc::new(LexiconScorer::new()), ThresholdPolicy::TwoWay);
        let sink = MemorySink::new();
        let text = "Not bad, but the support was really slow.";
        let first = classifier.classify(text, &sink).unwrap();
        let second = classifier.classify(text, &sink).unwrap();
        assert_eq!(first, second);
    }
}
