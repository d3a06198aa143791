//! The iterative edit search and the sentence correction orchestrator.
//!
//! One *sweep* analyzes the current sentence, gathers single-token
//! substitution / deletion candidates from four sources (spellchecker
//! suggestions, inflection forms, determiner and preposition confusion
//! sets), scores every resulting hypothesis with the language model and
//! accepts at most the one best hypothesis that clears the weighted
//! improvement threshold over the current sentence. Sweeps repeat until
//! convergence or the sweep ceiling.

use indexmap::IndexMap;
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analyze::{Analyze, Tagger};
use crate::confusion::ConfusionSet;
use crate::inflect::Inflections;
use crate::lm::{ArpaModel, Score};
use crate::spell::{Spell, Spellcheck};
use crate::types::{EditKind, EditWeights, Hypothesis, Outcome, Sweep};
use crate::utils::{apply_to_first, is_uppercase};
use crate::Error;

/// Options to configure the corrector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectorOptions {
    /// Per-source acceptance threshold multipliers.
    pub weights: EditWeights,
    /// Upper bound on accepted edits per sentence. The search is greedy and
    /// can in principle cycle between two edits with near-equal scores, so
    /// the sweep loop is bounded rather than run to a fixed point.
    pub max_sweeps: usize,
}

impl Default for CorrectorOptions {
    fn default() -> Self {
        CorrectorOptions {
            weights: EditWeights::default(),
            max_sweeps: 50,
        }
    }
}

/// Builds one hypothesis sentence per candidate string by replacing the
/// token at `position` (the empty candidate deletes it). Hypotheses that
/// would leave the sentence empty are discarded. Keys are `(position,
/// candidate)`, so identical proposals from different sources collapse into
/// one hypothesis; like the sources' iteration, the map keeps insertion
/// order.
fn generate<'a, I>(
    position: usize,
    candidates: I,
    tokens: &[String],
    kind: EditKind,
    weight: f64,
) -> IndexMap<(usize, String), Hypothesis>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = IndexMap::new();

    for candidate in candidates {
        let mut new_tokens = tokens.to_vec();
        new_tokens[position] = candidate.to_owned();
        new_tokens.retain(|token| !token.is_empty());

        if new_tokens.is_empty() {
            continue;
        }

        out.insert(
            (position, candidate.to_owned()),
            Hypothesis {
                tokens: new_tokens,
                kind,
                weight,
            },
        );
    }

    out
}

/// Corrects tokenized sentences by iterative, language-model-arbitrated
/// single-token edits. Generic over the scoring oracle, the analyzer and
/// the spellchecker; resources are injected once and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corrector<L, A, S> {
    lm: L,
    analyzer: A,
    spell: S,
    inflections: Inflections,
    determiners: ConfusionSet,
    prepositions: ConfusionSet,
    options: CorrectorOptions,
}

/// The corrector over the default resource backends, as built by the
/// binaries and stored by `compile`.
pub type DefaultCorrector = Corrector<ArpaModel, Tagger, Spell>;

impl crate::Component for DefaultCorrector {
    fn name() -> &'static str {
        "corrector"
    }
}

impl<L, A, S> Corrector<L, A, S>
where
    L: Score,
    A: Analyze,
    S: Spellcheck,
{
    pub fn new(lm: L, analyzer: A, spell: S, inflections: Inflections) -> Self {
        Corrector {
            lm,
            analyzer,
            spell,
            inflections,
            determiners: ConfusionSet::determiners(),
            prepositions: ConfusionSet::prepositions(),
            options: CorrectorOptions::default(),
        }
    }

    /// Replaces the built-in determiner and preposition sets.
    pub fn with_confusion_sets(
        mut self,
        determiners: ConfusionSet,
        prepositions: ConfusionSet,
    ) -> Self {
        self.determiners = determiners;
        self.prepositions = prepositions;
        self
    }

    pub fn options(&self) -> &CorrectorOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: CorrectorOptions) {
        self.options = options;
    }

    /// Runs one sweep over all token positions of `tokens`.
    ///
    /// Returns [Sweep::Accepted] with a wholly new sentence if any
    /// hypothesis scored above `weight * baseline`, where the baseline is
    /// the length-normalized score of `tokens` itself, and
    /// [Sweep::Converged] otherwise. Among eligible hypotheses the strictly
    /// best one wins; on ties the hypothesis found first is kept.
    pub fn sweep(&self, tokens: &[String]) -> Result<Sweep, Error> {
        if tokens.is_empty() {
            return Ok(Sweep::Converged);
        }

        let analysis = self.analyzer.analyze(tokens);
        if analysis.len() != tokens.len() {
            return Err(Error::MisalignedAnalysis {
                tokens: tokens.len(),
                annotations: analysis.len(),
            });
        }

        let weights = &self.options.weights;
        let baseline = self.lm.score(tokens, true) / tokens.len() as f64;

        let mut candidates: IndexMap<(usize, String), Hypothesis> = IndexMap::new();
        for (i, token) in analysis.iter().enumerate() {
            // spellchecking: the token must be purely alphabetic and unknown
            if token.text.chars().all(char::is_alphabetic) && !self.spell.is_known(&token.text) {
                let suggestions = self.spell.suggest(&token.text);
                candidates.extend(generate(
                    i,
                    suggestions.iter().map(|x| x.as_str()),
                    tokens,
                    EditKind::Spelling,
                    weights.spelling,
                ));
            }
            // morphology: all inflection forms of the token's lemma
            if let Some(entry) = self.inflections.forms(&token.lemma) {
                candidates.extend(generate(
                    i,
                    entry.forms.iter().map(|x| x.as_str()),
                    tokens,
                    EditKind::Morphology,
                    weights.morphology,
                ));
            }
            // determiners
            if self.determiners.contains(&token.text) {
                candidates.extend(generate(
                    i,
                    self.determiners.candidates(),
                    tokens,
                    EditKind::Determiner,
                    weights.determiner,
                ));
            }
            // prepositions
            if self.prepositions.contains(&token.text) {
                candidates.extend(generate(
                    i,
                    self.prepositions.candidates(),
                    tokens,
                    EditKind::Preposition,
                    weights.preposition,
                ));
            }
        }

        let mut best: Option<(f64, &Hypothesis)> = None;
        for hypothesis in candidates.values() {
            let score =
                self.lm.score(&hypothesis.tokens, true) / hypothesis.tokens.len() as f64;

            // strictly greater on both counts: ineligible hypotheses never
            // win and later ties never displace an earlier best
            if score > hypothesis.weight * baseline
                && best.map_or(true, |(best_score, _)| score > best_score)
            {
                best = Some((score, hypothesis));
            }
        }

        match best {
            Some((score, hypothesis)) => {
                log::debug!(
                    "accepted {} edit ({:.4} vs baseline {:.4}): {}",
                    hypothesis.kind.as_str(),
                    score,
                    baseline,
                    hypothesis.tokens.iter().join(" ")
                );
                Ok(Sweep::Accepted(hypothesis.tokens.clone()))
            }
            None => Ok(Sweep::Converged),
        }
    }

    /// Sweeps `tokens` to convergence or to the sweep ceiling, whichever
    /// comes first. Each accepted sweep feeds its sentence into the next.
    pub fn correct_tokens(&self, mut tokens: Vec<String>) -> Result<(Vec<String>, Outcome), Error> {
        for sweeps in 0..self.options.max_sweeps {
            match self.sweep(&tokens)? {
                Sweep::Accepted(new_tokens) => tokens = new_tokens,
                Sweep::Converged => return Ok((tokens, Outcome::Converged { sweeps })),
            }
        }

        log::warn!(
            "sweep ceiling of {} reached before convergence: {}",
            self.options.max_sweeps,
            tokens.iter().join(" ")
        );
        Ok((tokens, Outcome::IterationLimitReached))
    }

    /// Corrects one input line.
    ///
    /// All-uppercase lines are lowercased for the model and restored
    /// afterwards; blank lines pass through as empty output. The first
    /// character of non-blank output is capitalized. A per-sentence search
    /// failure degrades to the unchanged sentence instead of propagating.
    pub fn correct_line(&self, line: &str) -> String {
        let upper = is_uppercase(line);
        let lowered;
        let line = if upper {
            lowered = line.to_lowercase();
            lowered.as_str()
        } else {
            line
        };

        let tokens: Vec<String> = line.split_whitespace().map(|x| x.to_owned()).collect();
        if tokens.is_empty() {
            return String::new();
        }

        let tokens = match self.correct_tokens(tokens) {
            Ok((tokens, _)) => tokens,
            Err(err) => {
                log::warn!("leaving sentence unchanged: {}", err);
                line.split_whitespace().map(|x| x.to_owned()).collect()
            }
        };

        let sent = tokens.iter().join(" ");
        let sent = apply_to_first(&sent, |x| x.to_uppercase().collect());
        if upper {
            sent.to_uppercase()
        } else {
            sent
        }
    }
}

impl<L, A, S> Corrector<L, A, S>
where
    L: Score + Sync,
    A: Analyze + Sync,
    S: Spellcheck + Sync,
{
    /// Corrects a batch of lines in parallel. Sentences are independent and
    /// all resources are read-only, so the batch is split over a worker
    /// pool; output order matches input order, one line per input line.
    pub fn correct_batch(&self, lines: &[String]) -> Vec<String> {
        lines
            .par_iter()
            .map(|line| self.correct_line(line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Scores sentences from a fixed table, keyed by the joined tokens.
    struct TableLm(HashMap<String, f64>);

    impl TableLm {
        fn new(entries: &[(&str, f64)]) -> Self {
            TableLm(
                entries
                    .iter()
                    .map(|(sent, score)| ((*sent).to_owned(), *score))
                    .collect(),
            )
        }
    }

    impl Score for TableLm {
        fn score(&self, tokens: &[String], _boundaries: bool) -> f64 {
            self.0[&tokens.iter().join(" ")]
        }
    }

    struct NoopSpell;

    impl Spellcheck for NoopSpell {
        fn is_known(&self, _word: &str) -> bool {
            true
        }

        fn suggest(&self, _word: &str) -> Vec<String> {
            Vec::new()
        }
    }

    /// A corrector whose only edit source is the confusion set
    /// `{"", "x", "y"}`, scored by the given table.
    fn table_corrector(lm: TableLm) -> Corrector<TableLm, Tagger, NoopSpell> {
        Corrector::new(lm, Tagger::default(), NoopSpell, Inflections::default())
            .with_confusion_sets(
                ConfusionSet::new(vec!["", "x", "y"]),
                ConfusionSet::new(Vec::<String>::new()),
            )
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(|x| x.to_owned()).collect()
    }

    #[test]
    fn substitution_replaces_one_token() {
        let sent = tokens("she bought a apple");
        let out = generate(2, vec!["an"], &sent, EditKind::Determiner, 0.96);

        let hypothesis = &out[&(2, "an".to_owned())];
        assert_eq!(hypothesis.tokens, tokens("she bought an apple"));
        assert_eq!(hypothesis.weight, 0.96);
    }

    #[test]
    fn empty_candidate_deletes_the_token() {
        let sent = tokens("she bought a apple");
        let out = generate(2, vec![""], &sent, EditKind::Determiner, 0.96);

        assert_eq!(out[&(2, String::new())].tokens, tokens("she bought apple"));
    }

    #[test]
    fn deleting_the_sole_token_is_discarded() {
        let sent = tokens("the");
        let out = generate(0, vec!["", "a"], &sent, EditKind::Determiner, 0.96);

        assert!(!out.contains_key(&(0, String::new())));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn identical_proposals_collapse() {
        let sent = tokens("a cat");
        let mut out = generate(0, vec!["the", "an"], &sent, EditKind::Determiner, 0.96);
        out.extend(generate(0, vec!["the"], &sent, EditKind::Morphology, 0.9));

        // one hypothesis, the later weight, the original position
        assert_eq!(out.len(), 2);
        let (index, _, hypothesis) = out.get_full(&(0, "the".to_owned())).unwrap();
        assert_eq!(index, 0);
        assert_eq!(hypothesis.weight, 0.9);
        assert_eq!(hypothesis.kind, EditKind::Morphology);
    }

    #[test]
    fn ties_keep_the_first_hypothesis() {
        // normalized: baseline -2.0, deletion and "y b" both -1.5; the
        // deletion is generated first and an equal score never displaces it
        let corrector = table_corrector(TableLm::new(&[
            ("x b", -4.0),
            ("b", -1.5),
            ("y b", -3.0),
        ]));

        assert_eq!(
            corrector.sweep(&tokens("x b")).unwrap(),
            Sweep::Accepted(tokens("b"))
        );
    }

    #[test]
    fn a_strictly_better_late_hypothesis_wins() {
        let corrector = table_corrector(TableLm::new(&[
            ("x b", -4.0),
            ("b", -1.5),
            ("y b", -2.8),
        ]));

        assert_eq!(
            corrector.sweep(&tokens("x b")).unwrap(),
            Sweep::Accepted(tokens("y b"))
        );
    }

    #[test]
    fn improvements_below_the_margin_are_rejected() {
        // both hypotheses beat the baseline of -2.0 but not 0.96 * -2.0
        let corrector = table_corrector(TableLm::new(&[
            ("x b", -4.0),
            ("b", -1.95),
            ("y b", -3.9),
        ]));

        assert_eq!(corrector.sweep(&tokens("x b")).unwrap(), Sweep::Converged);
    }

    #[test]
    fn the_sweep_ceiling_stops_score_cycles() {
        // with a multiplier above 1 the acceptance bar lies below the
        // current score, so the search can keep accepting non-improvements
        let mut corrector = table_corrector(TableLm::new(&[
            ("x b", -4.0),
            ("y b", -3.9),
            ("b", -10.0),
        ]));
        corrector.set_options(CorrectorOptions {
            weights: EditWeights::uniform(1.04),
            max_sweeps: 20,
        });

        let (corrected, outcome) = corrector.correct_tokens(tokens("x b")).unwrap();
        assert_eq!(outcome, Outcome::IterationLimitReached);
        assert_eq!(corrected, tokens("y b"));
    }

    #[test]
    fn generation_is_pure() {
        let sent = tokens("a cat");
        let first = generate(0, vec!["the", ""], &sent, EditKind::Determiner, 0.96);
        let second = generate(0, vec!["the", ""], &sent, EditKind::Determiner, 0.96);

        assert_eq!(first, second);
        assert_eq!(sent, tokens("a cat"));
    }
}
