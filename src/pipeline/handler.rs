//! Event handler — the per-invocation entry point.
//!
//! Flow:
//! 1. Decoder → envelope metadata to sink, then UTF-8, then JSON `Value`
//! 2. Classifier → scores, verdict, sink record
//!
//! The first error halts the message. No partial verdict, no default
//! sentiment; the host decides whether to redeliver.

use std::sync::Arc;

use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::pipeline::classifier::{SentimentClassifier, ThresholdPolicy};
use crate::pipeline::decoder::{self, DecodeOutcome};
use crate::pipeline::sink::{ObservabilitySink, TracingSink};
use crate::pipeline::types::{EventRecord, PipelineState, SentimentResult};
use crate::scorer::{LexiconScorer, PolarityScorer};

/// Stateless handler shared by every invocation.
///
/// Holds only immutable collaborators, so it is safe to call `handle`
/// from many threads at once.
pub struct EventHandler {
    classifier: SentimentClassifier,
    sink: Arc<dyn ObservabilitySink>,
}

impl EventHandler {
    /// Create a handler from explicit collaborators.
    pub fn new(
        scorer: Arc<dyn PolarityScorer>,
        sink: Arc<dyn ObservabilitySink>,
        policy: ThresholdPolicy,
    ) -> Self {
        Self {
            classifier: SentimentClassifier::new(scorer, policy),
            sink,
        }
    }

    /// Lexicon scorer, tracing sink, given policy.
    pub fn with_defaults(policy: ThresholdPolicy) -> Self {
        Self::new(
            Arc::new(LexiconScorer::new()),
            Arc::new(TracingSink),
            policy,
        )
    }

    pub fn policy(&self) -> ThresholdPolicy {
        self.classifier.policy()
    }

    /// Process one record: decode, then classify.
    pub fn handle(&self, record: &EventRecord) -> Result<SentimentResult, CoreError> {
        let invocation_id = Uuid::new_v4();
        let span = info_span!(
            "handle",
            %invocation_id,
            topic = %record.topic,
            partition = record.partition,
            offset = record.offset
        );
        let _guard = span.enter();

        let mut state = PipelineState::Decoding;

        let message = match decoder::decode(record, self.sink.as_ref()) {
            DecodeOutcome::Decoded(message) => message,
            DecodeOutcome::Failed(failure) => {
                let err = CoreError::from(failure);
                transition(&mut state, PipelineState::Failed);
                warn!(kind = err.kind(), error = %err, "Decode failed");
                return Err(err);
            }
        };

        transition(&mut state, PipelineState::Classifying);

        match self.classifier.classify(&message.text, self.sink.as_ref()) {
            Ok(result) => {
                transition(&mut state, PipelineState::Completed);
                info!(
                    verdict = result.verdict.label(),
                    polarity = result.polarity,
                    "Message handled"
                );
                Ok(result)
            }
            Err(err) => {
                transition(&mut state, PipelineState::Failed);
                warn!(kind = err.kind(), error = %err, "Classification failed");
                Err(err)
            }
        }
    }
}

fn transition(state: &mut PipelineState, target: PipelineState) {
    debug_assert!(
        state.can_transition_to(target),
        "illegal pipeline transition {state} -> {target}"
    );
    debug!(from = %state, to = %target, "Pipeline state transition");
    *state = target;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::ScorerError;
    use crate::pipeline::sink::MemorySink;
    use crate::pipeline::types::Verdict;
    use crate::scorer::Score;

    /// Wraps the lexicon scorer and counts calls.
    struct CountingScorer {
        inner: LexiconScorer,
        calls: AtomicUsize,
    }

    impl CountingScorer {
        fn new() -> Self {
            Self {
                inner: LexiconScorer::new(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PolarityScorer for CountingScorer {
        fn name(&self) -> &str {
            "counting"
        }
        fn score(&self, text: &str) -> Result<Score, ScorerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.score(text)
        }
    }

    fn handler() -> (EventHandler, Arc<MemorySink>, Arc<CountingScorer>) {
        let sink = Arc::new(MemorySink::new());
        let scorer = Arc::new(CountingScorer::new());
        let handler = EventHandler::new(scorer.clone(), sink.clone(), ThresholdPolicy::TwoWay);
        (handler, sink, scorer)
    }

    fn record(payload: &[u8]) -> EventRecord {
        EventRecord::new("tweets", 0, 10, payload.to_vec())
    }

    #[test]
    fn positive_message() {
        let (handler, sink, _) = handler();
        let result = handler
            .handle(&record(br#"{"Value": "I love this product!"}"#))
            .unwrap();
        assert_eq!(result.verdict, Verdict::Positive);
        assert!(result.polarity > 0.0);
        assert_eq!(
            sink.labels(),
            vec!["envelope_received", "raw_text", "classified"]
        );
    }

    #[test]
    fn malformed_payload_never_reaches_scorer() {
        let (handler, sink, scorer) = handler();
        let err = handler.handle(&record(b"{not json")).unwrap_err();
        assert_eq!(err.kind(), "malformed_payload");
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(sink.labels(), vec!["envelope_received", "raw_text"]);
    }

    #[test]
    fn schema_mismatch_never_reaches_scorer() {
        let (handler, _, scorer) = handler();
        let err = handler.handle(&record(br#"{"Other": "hi"}"#)).unwrap_err();
        assert!(matches!(err, CoreError::SchemaMismatch(_)));
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn scorer_called_once_per_message() {
        let (handler, _, scorer) = handler();
        handler.handle(&record(br#"{"Value": "fine"}"#)).unwrap();
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn three_way_policy_is_honored() {
        let sink = Arc::new(MemorySink::new());
        let handler = EventHandler::new(
            Arc::new(LexiconScorer::new()),
            sink,
            ThresholdPolicy::ThreeWay { neutral_band: 0.05 },
        );
        let result = handler.handle(&record(br#"{"Value": ""}"#)).unwrap();
        assert_eq!(result.verdict, Verdict::Neutral);
    }

    #[test]
    fn with_defaults_uses_two_way() {
        let handler = EventHandler::with_defaults(ThresholdPolicy::TwoWay);
        assert_eq!(handler.policy(), ThresholdPolicy::TwoWay);
        let result = handler.handle(&record(br#"{"Value": "terrible"}"#)).unwrap();
        assert_eq!(result.verdict, Verdict::Negative);
    }
}
