//! Lexicon scorer — word-level lookup averaged across the text.
//!
//! Each lexicon word found in the text yields one assessment
//! `(polarity, subjectivity)`. Adverbs like "very" scale the next assessment,
//! negators flip and dampen it. The text score is the mean of all
//! assessments; words outside the lexicon contribute nothing.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ScorerError;
use crate::scorer::{PolarityScorer, Score};

/// Polarity multiplier applied to a negated word.
const NEGATION_FACTOR: f64 = -0.5;

/// How many non-lexicon tokens a negator reaches across ("not at all good").
const NEGATION_WINDOW: usize = 3;

/// Lowercased words (with inner apostrophes) and common emoticons.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[:;=][\-^']?[()\[\]dp]|[\p{L}\p{N}]+(?:['\x{2019}]\p{L}+)?").unwrap()
});

/// Typographic apostrophes folded to `'` before lookup ("don’t" is "don't").
const APOSTROPHES: [char; 2] = ['\u{2019}', '\u{02BC}'];

/// (word, polarity, subjectivity)
const SENTIMENT_WORDS: &[(&str, f64, f64)] = &[
    // positive
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("excellent", 1.0, 1.0),
    ("amazing", 0.6, 0.9),
    ("awesome", 1.0, 1.0),
    ("love", 0.5, 0.6),
    ("loved", 0.7, 0.8),
    ("loves", 0.5, 0.6),
    ("lovely", 0.5, 0.75),
    ("happy", 0.8, 1.0),
    ("wonderful", 1.0, 1.0),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("nice", 0.6, 1.0),
    ("fantastic", 0.4, 0.9),
    ("perfect", 1.0, 1.0),
    ("beautiful", 0.85, 1.0),
    ("fun", 0.3, 0.2),
    ("glad", 0.5, 1.0),
    ("pleased", 0.5, 1.0),
    ("enjoy", 0.4, 0.5),
    ("enjoyed", 0.4, 0.5),
    ("brilliant", 0.9, 1.0),
    ("impressive", 1.0, 1.0),
    ("friendly", 0.375, 0.5),
    ("helpful", 0.5, 0.5),
    ("easy", 0.43, 0.83),
    ("fast", 0.2, 0.6),
    ("cool", 0.35, 0.65),
    ("superb", 1.0, 1.0),
    ("outstanding", 0.5, 0.67),
    ("delightful", 1.0, 1.0),
    ("favorite", 0.5, 1.0),
    ("favourite", 0.5, 1.0),
    ("thanks", 0.2, 0.2),
    ("thank", 0.2, 0.2),
    ("positive", 0.23, 0.55),
    ("reliable", 0.5, 0.5),
    ("smooth", 0.4, 0.6),
    ("satisfied", 0.5, 1.0),
    ("win", 0.8, 0.4),
    ("excited", 0.375, 0.75),
    ("exciting", 0.3, 0.8),
    // negative
    ("bad", -0.7, 0.67),
    ("terrible", -1.0, 1.0),
    ("awful", -1.0, 1.0),
    ("horrible", -1.0, 1.0),
    ("worst", -1.0, 1.0),
    ("worse", -0.4, 0.6),
    ("hate", -0.8, 0.9),
    ("hated", -0.9, 0.7),
    ("hates", -0.8, 0.9),
    ("poor", -0.4, 0.6),
    ("sad", -0.5, 1.0),
    ("angry", -0.5, 1.0),
    ("disappointed", -0.75, 0.75),
    ("disappointing", -0.6, 0.7),
    ("broken", -0.4, 0.4),
    ("useless", -0.5, 0.2),
    ("slow", -0.3, 0.39),
    ("boring", -1.0, 1.0),
    ("ugly", -0.7, 1.0),
    ("stupid", -0.8, 1.0),
    ("annoying", -0.8, 0.9),
    ("wrong", -0.5, 0.9),
    ("failed", -0.5, 0.3),
    ("fail", -0.5, 0.3),
    ("expensive", -0.5, 0.7),
    ("rude", -0.3, 0.6),
    ("dirty", -0.6, 0.8),
    ("unhappy", -0.6, 0.9),
    ("nasty", -1.0, 1.0),
    ("pathetic", -1.0, 1.0),
    ("disgusting", -1.0, 1.0),
    ("mediocre", -0.3, 0.6),
    ("buggy", -0.4, 0.6),
    ("negative", -0.3, 0.4),
    ("lost", -0.2, 0.3),
    ("crap", -0.8, 0.8),
    ("sucks", -0.3, 0.3),
    // emoticons
    (":)", 0.5, 1.0),
    (":-)", 0.5, 1.0),
    ("=)", 0.5, 1.0),
    (":d", 1.0, 1.0),
    (";)", 0.25, 1.0),
    (":(", -0.75, 1.0),
    (":-(", -0.75, 1.0),
    ("=(", -0.75, 1.0),
];

/// (word, multiplier) applied to the next lexicon word.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("absolutely", 1.5),
    ("super", 1.3),
    ("so", 1.3),
    ("totally", 1.3),
    ("quite", 1.1),
    ("somewhat", 0.7),
    ("slightly", 0.5),
    ("barely", 0.5),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "cannot", "don't", "doesn't", "didn't", "isn't",
    "aren't", "wasn't", "weren't", "won't", "wouldn't", "can't", "couldn't", "shouldn't",
    "hardly",
];

/// Lexicon-based polarity and subjectivity scorer.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    words: HashMap<String, (f64, f64)>,
    intensifiers: HashMap<String, f64>,
    negators: Vec<String>,
}

impl LexiconScorer {
    /// Create a scorer with the built-in English lexicon.
    pub fn new() -> Self {
        Self {
            words: SENTIMENT_WORDS
                .iter()
                .map(|(w, p, s)| (w.to_string(), (*p, *s)))
                .collect(),
            intensifiers: INTENSIFIERS
                .iter()
                .map(|(w, m)| (w.to_string(), *m))
                .collect(),
            negators: NEGATORS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Create a scorer with no entries (everything scores neutral).
    pub fn empty() -> Self {
        Self {
            words: HashMap::new(),
            intensifiers: HashMap::new(),
            negators: Vec::new(),
        }
    }

    /// Add or replace a lexicon word. Values are clamped into range.
    pub fn with_word(mut self, word: &str, polarity: f64, subjectivity: f64) -> Self {
        self.words.insert(
            word.to_lowercase(),
            (polarity.clamp(-1.0, 1.0), subjectivity.clamp(0.0, 1.0)),
        );
        self
    }

    /// Add or replace an intensifier.
    pub fn with_intensifier(mut self, word: &str, multiplier: f64) -> Self {
        self.intensifiers.insert(word.to_lowercase(), multiplier);
        self
    }

    /// Add a negator.
    pub fn with_negator(mut self, word: &str) -> Self {
        self.negators.push(word.to_lowercase());
        self
    }

    /// Number of lexicon words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn is_negator(&self, token: &str) -> bool {
        self.negators.iter().any(|n| n == token)
    }

    /// Per-word assessments in text order.
    fn assessments(&self, text: &str) -> Vec<(f64, f64)> {
        let lowered = text.to_lowercase().replace(APOSTROPHES, "'");
        let mut assessments = Vec::new();
        let mut multiplier: Option<f64> = None;
        let mut negation_left = 0usize;

        for token in TOKEN_RE.find_iter(&lowered).map(|m| m.as_str()) {
            if self.is_negator(token) {
                negation_left = NEGATION_WINDOW;
                multiplier = None;
                continue;
            }

            if let Some(m) = self.intensifiers.get(token) {
                multiplier = Some(multiplier.unwrap_or(1.0) * m);
                continue;
            }

            let Some(&(polarity, subjectivity)) = self.words.get(token) else {
                multiplier = None;
                negation_left = negation_left.saturating_sub(1);
                continue;
            };

            let scale = multiplier.take().unwrap_or(1.0);
            let mut polarity = polarity * scale;
            let subjectivity = subjectivity * scale;
            if negation_left > 0 {
                polarity *= NEGATION_FACTOR;
                negation_left = 0;
            }

            assessments.push((polarity.clamp(-1.0, 1.0), subjectivity.clamp(0.0, 1.0)));
        }

        assessments
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for LexiconScorer {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn score(&self, text: &str) -> Result<Score, ScorerError> {
        let assessments = self.assessments(text);
        if assessments.is_empty() {
            return Ok(Score::NEUTRAL);
        }

        let n = assessments.len() as f64;
        let (polarity_sum, subjectivity_sum) = assessments
            .iter()
            .fold((0.0, 0.0), |(p, s), (ap, as_)| (p + ap, s + as_));

        Ok(Score {
            polarity: (polarity_sum / n).clamp(-1.0, 1.0),
            subjectivity: (subjectivity_sum / n).clamp(0.0, 1.0),
        })
    }
}
