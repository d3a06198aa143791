//! The language model oracle which arbitrates between correction hypotheses.

use std::cmp;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Assigns a log-probability to a token sequence. `boundaries` controls
/// whether the sequence is scored with explicit begin / end-of-sentence
/// markers: the begin marker only conditions the first word, the end marker
/// is itself scored.
///
/// Implementations must be deterministic and must support arbitrary token
/// sequences; how unseen words are smoothed is the model's concern.
pub trait Score {
    fn score(&self, tokens: &[String], boundaries: bool) -> f64;
}

const BOS: &str = "<s>";
const EOS: &str = "</s>";
const UNK: &str = "<unk>";

/// Sentinel for words outside the model's vocabulary when it has no `<unk>`
/// entry. Never produced by interning, so it matches no n-gram.
const OOV: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ProbBackoff {
    prob: f64,
    backoff: f64,
}

/// A backoff n-gram model read from the ARPA text format emitted by
/// standard LM toolkits (KenLM, SRILM). Words are interned to ids at load
/// time; scoring walks from the longest matching n-gram down to unigrams,
/// accumulating backoff weights for each skipped context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArpaModel {
    vocab: HashMap<String, u32>,
    /// `ngrams[n - 1]` maps n-word id sequences to their (log10) probability
    /// and backoff weight.
    ngrams: Vec<HashMap<Vec<u32>, ProbBackoff>>,
    bos: u32,
    eos: u32,
    unk: Option<u32>,
    /// Log-probability assigned to out-of-vocabulary words when the model
    /// has no `<unk>` entry: the lowest unigram probability in the model.
    oov_log_prob: f64,
}

impl ArpaModel {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_arpa(File::open(path.as_ref())?)
    }

    /// Parses a model from ARPA text. Structural defects (entries outside an
    /// n-grams section, unparseable probabilities, wrong field counts) are
    /// fatal and name the offending line.
    pub fn from_arpa<R: Read>(reader: R) -> Result<Self, Error> {
        let mut vocab: HashMap<String, u32> = HashMap::new();
        let mut ngrams: Vec<HashMap<Vec<u32>, ProbBackoff>> = Vec::new();
        let mut current: Option<usize> = None;

        let intern = |vocab: &mut HashMap<String, u32>, word: &str| -> u32 {
            if let Some(&id) = vocab.get(word) {
                id
            } else {
                let id = vocab.len() as u32;
                vocab.insert(word.to_owned(), id);
                id
            }
        };

        for (lineno, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line == "\\data\\" || line.starts_with("ngram ") {
                // the \data\ counts header is informational only
                continue;
            }
            if line == "\\end\\" {
                break;
            }
            if line.starts_with('\\') && line.ends_with("-grams:") {
                let n: usize = line[1..line.len() - "-grams:".len()]
                    .parse()
                    .map_err(|_| {
                        Error::MalformedResource(format!("bad section header {:?}", line))
                    })?;
                if n == 0 {
                    return Err(Error::MalformedResource("0-grams section".into()));
                }
                while ngrams.len() < n {
                    ngrams.push(HashMap::new());
                }
                current = Some(n);
                continue;
            }

            let n = match current {
                Some(n) => n,
                None => {
                    return Err(Error::MalformedResource(format!(
                        "line {}: entry outside of an n-grams section",
                        lineno + 1
                    )))
                }
            };

            let fields: Vec<&str> = line.split_whitespace().collect();
            // log10 prob, n words, optionally a backoff weight
            if fields.len() != n + 1 && fields.len() != n + 2 {
                return Err(Error::MalformedResource(format!(
                    "line {}: expected {} or {} fields in a {}-gram entry, got {}",
                    lineno + 1,
                    n + 1,
                    n + 2,
                    n,
                    fields.len()
                )));
            }
            let prob: f64 = fields[0].parse().map_err(|_| {
                Error::MalformedResource(format!("line {}: bad probability {:?}", lineno + 1, fields[0]))
            })?;
            let backoff: f64 = if fields.len() == n + 2 {
                fields[n + 1].parse().map_err(|_| {
                    Error::MalformedResource(format!(
                        "line {}: bad backoff weight {:?}",
                        lineno + 1,
                        fields[n + 1]
                    ))
                })?
            } else {
                0.0
            };

            let ids: Vec<u32> = fields[1..=n]
                .iter()
                .map(|word| intern(&mut vocab, word))
                .collect();
            ngrams[n - 1].insert(ids, ProbBackoff { prob, backoff });
        }

        if ngrams.is_empty() || ngrams[0].is_empty() {
            return Err(Error::MalformedResource("model contains no unigrams".into()));
        }

        let bos = intern(&mut vocab, BOS);
        let eos = intern(&mut vocab, EOS);
        let unk = vocab.get(UNK).copied();
        let oov_log_prob = ngrams[0]
            .values()
            .map(|pb| pb.prob)
            .fold(f64::INFINITY, f64::min);

        log::info!(
            "loaded {}-gram model: {} words, {} n-grams",
            ngrams.len(),
            vocab.len(),
            ngrams.iter().map(|map| map.len()).sum::<usize>()
        );

        Ok(ArpaModel {
            vocab,
            ngrams,
            bos,
            eos,
            unk,
            oov_log_prob,
        })
    }

    /// The maximum n-gram order of this model.
    pub fn order(&self) -> usize {
        self.ngrams.len()
    }

    fn id(&self, word: &str) -> u32 {
        self.vocab
            .get(word)
            .copied()
            .or(self.unk)
            .unwrap_or(OOV)
    }

    /// Scores the last id of `seq` given the ids before it, using at most
    /// `order - 1` words of context.
    fn word_score(&self, seq: &[u32]) -> f64 {
        let len = seq.len();
        if seq[len - 1] == OOV {
            return self.oov_log_prob;
        }

        let max_n = cmp::min(self.order(), len);
        let mut backed_off = 0.0;

        for n in (1..=max_n).rev() {
            if let Some(pb) = self.ngrams[n - 1].get(&seq[len - n..]) {
                return pb.prob + backed_off;
            }
            if n >= 2 {
                // the n-gram is absent: charge the backoff weight of its
                // context before trying one order lower
                if let Some(pb) = self.ngrams[n - 2].get(&seq[len - n..len - 1]) {
                    backed_off += pb.backoff;
                }
            }
        }

        // the word is interned but has no unigram entry
        self.oov_log_prob + backed_off
    }
}

impl Score for ArpaModel {
    fn score(&self, tokens: &[String], boundaries: bool) -> f64 {
        let mut ids = Vec::with_capacity(tokens.len() + 2);
        if boundaries {
            ids.push(self.bos);
        }
        ids.extend(tokens.iter().map(|token| self.id(token)));
        if boundaries {
            ids.push(self.eos);
        }

        let first = if boundaries { 1 } else { 0 };
        (first..ids.len())
            .map(|i| self.word_score(&ids[..=i]))
            .sum()
    }
}
