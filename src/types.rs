//! Fundamental types used by this crate.

use serde::{Deserialize, Serialize};

/// Text, lemma and part-of-speech tag associated with one token, as returned
/// by an [Analyze][crate::analyze::Analyze] implementation. The token's
/// position is its index in the analyzed sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    pub text: String,
    pub lemma: String,
    pub tag: String,
}

impl TokenData {
    pub fn new<S: Into<String>>(text: S, lemma: S, tag: S) -> Self {
        TokenData {
            text: text.into(),
            lemma: lemma.into(),
            tag: tag.into(),
        }
    }
}

/// The source an edit candidate came from. Kept on hypotheses for
/// diagnostics and to select the per-source acceptance weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditKind {
    Spelling,
    Morphology,
    Determiner,
    Preposition,
}

impl EditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditKind::Spelling => "spelling",
            EditKind::Morphology => "morphology",
            EditKind::Determiner => "determiner",
            EditKind::Preposition => "preposition",
        }
    }
}

/// Acceptance threshold multipliers, one per edit source. A hypothesis
/// produced by source `k` is only eligible if its normalized score exceeds
/// `weights.get(k) * baseline`. All four default to one shared value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditWeights {
    pub spelling: f64,
    pub morphology: f64,
    pub determiner: f64,
    pub preposition: f64,
}

/// The default improvement threshold: scores must be at least 4% higher
/// than the current sentence's.
pub const DEFAULT_THRESHOLD: f64 = 0.96;

impl EditWeights {
    /// The same threshold for all four edit sources.
    pub fn uniform(weight: f64) -> Self {
        EditWeights {
            spelling: weight,
            morphology: weight,
            determiner: weight,
            preposition: weight,
        }
    }

    pub fn get(&self, kind: EditKind) -> f64 {
        match kind {
            EditKind::Spelling => self.spelling,
            EditKind::Morphology => self.morphology,
            EditKind::Determiner => self.determiner,
            EditKind::Preposition => self.preposition,
        }
    }
}

impl Default for EditWeights {
    fn default() -> Self {
        EditWeights::uniform(DEFAULT_THRESHOLD)
    }
}

/// One sentence hypothesis: the token sequence resulting from applying
/// exactly one candidate edit, together with the edit's provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub tokens: Vec<String>,
    pub kind: EditKind,
    pub weight: f64,
}

/// The result of one full sweep over a sentence's token positions.
#[derive(Debug, Clone, PartialEq)]
pub enum Sweep {
    /// The best eligible hypothesis replaced the sentence wholesale.
    Accepted(Vec<String>),
    /// No hypothesis cleared the weighted threshold; the sentence is final.
    Converged,
}

/// How the sweep loop for one sentence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The search reached a fixed point after this many accepted edits.
    Converged { sweeps: usize },
    /// The sweep ceiling was hit before convergence. The sentence returned
    /// alongside this outcome is still valid, just possibly improvable.
    IterationLimitReached,
}
