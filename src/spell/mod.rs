//! Structures and implementations related to spellchecking.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use fst::{IntoStreamer, Map, MapBuilder, Streamer};
use serde::{Deserialize, Serialize};

use crate::utils::{apply_to_first, is_title_case};
use crate::Error;

mod levenshtein;

use levenshtein::Levenshtein;

/// Spellchecking as the edit search consumes it: a validity check and an
/// ordered suggestion list (best first, empty if there are none).
pub trait Spellcheck {
    fn is_known(&self, word: &str) -> bool;
    fn suggest(&self, word: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Candidate {
    score: f64,
    distance: usize,
    freq: u64,
    term: String,
}
impl Eq for Candidate {}
impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // higher score => lower order such that sorting puts highest scores first
        other.score.partial_cmp(&self.score)
    }
}
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.partial_cmp(other).expect("scores are never NaN")
    }
}

/// Options to configure the spellchecker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellOptions {
    /// The maximum edit distance to consider for corrections. Currently
    /// Optimal String Alignment distance is used.
    pub max_distance: usize,
    /// A fixed prefix length for which to consider only edits with a
    /// distance of 1. This speeds up the search by pruning the tree early.
    pub prefix_length: usize,
    /// How high to weigh the frequency of a word compared to the edit
    /// distance when ranking correction candidates. Setting this to `x`
    /// makes the frequency make a difference of at most `x` edit distance.
    pub freq_weight: f64,
    /// The maximum number of correction candidates to return.
    pub top_n: usize,
}

impl Default for SpellOptions {
    fn default() -> Self {
        SpellOptions {
            max_distance: 2,
            prefix_length: 2,
            freq_weight: 2.,
            top_n: 10,
        }
    }
}

/// A dictionary spellchecker with suggestions from an error-tolerant search
/// over an FST, ranked by edit distance and word frequency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spell {
    /// An FST mapping valid words (always single tokens) to their frequency.
    fst: Vec<u8>,
    /// The maximum occured word frequency. Used to normalize.
    max_freq: u64,
    options: SpellOptions,
}

impl Spell {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_wordlist(File::open(path.as_ref())?)
    }

    /// Builds the checker from a wordlist with one `word` or
    /// `word<TAB>frequency` entry per line. Duplicate words keep their
    /// highest frequency.
    pub fn from_wordlist<R: Read>(reader: R) -> Result<Self, Error> {
        let mut words: BTreeMap<String, u64> = BTreeMap::new();

        for line in BufReader::new(reader).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (word, freq) = match line.split_once('\t') {
                Some((word, freq)) => {
                    let freq: u64 = freq.parse().map_err(|_| {
                        Error::MalformedResource(format!("bad word frequency {:?}", line))
                    })?;
                    (word, freq)
                }
                None => (line, 1),
            };

            let entry = words.entry(word.to_owned()).or_insert(0);
            *entry = (*entry).max(freq);
        }

        let max_freq = words.values().copied().max().unwrap_or(1).max(1);

        let mut builder = MapBuilder::memory();
        for (word, freq) in &words {
            // BTreeMap iterates in lexicographic order, as the builder requires
            builder.insert(word, *freq)?;
        }

        log::info!("loaded wordlist with {} words", words.len());

        Ok(Spell {
            fst: builder.into_inner()?,
            max_freq,
            options: SpellOptions::default(),
        })
    }

    pub fn options(&self) -> &SpellOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut SpellOptions {
        &mut self.options
    }

    fn map(&self) -> Map<&[u8]> {
        Map::new(self.fst.as_slice()).expect("serialized fst must be valid.")
    }

    /// Checks the validity of one word. If this is true, the token is always
    /// considered correct; purely non-alphabetic tokens are never flagged.
    fn check_word(&self, word: &str, recurse: bool) -> bool {
        word.is_empty()
            || self.map().get(word).is_some()
            || word.chars().all(|x| !x.is_alphabetic())
            || (recurse
                // for title case words, it is enough if the lowercase variant is known
                && is_title_case(word)
                && self.check_word(&apply_to_first(word, |x| x.to_lowercase().collect()), false))
    }

    fn search(&self, word: &str) -> Vec<String> {
        let map = self.map();
        let query = Levenshtein::new(word, self.options.max_distance, self.options.prefix_length);

        let mut out = BinaryHeap::with_capacity(self.options.top_n + 1);

        let mut stream = map.search_with_state(query).into_stream();
        while let Some((k, v, s)) = stream.next() {
            let state = s.expect("matching levenshtein state is always `Some`.");

            let term = String::from_utf8(k.to_vec()).expect("fst keys must be valid utf-8.");
            out.push(Candidate {
                distance: state.dist(),
                freq: v,
                score: (self.options.max_distance - state.dist()) as f64
                    + v as f64 / self.max_freq as f64 * self.options.freq_weight,
                term,
            });
            if out.len() > self.options.top_n {
                out.pop();
            }
        }

        // `into_iter_sorted` is unstable - see https://github.com/rust-lang/rust/issues/59278
        out.into_sorted_vec().into_iter().map(|x| x.term).collect()
    }
}

impl Spellcheck for Spell {
    fn is_known(&self, word: &str) -> bool {
        self.check_word(word, true)
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        self.search(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(wordlist: &str) -> Spell {
        Spell::from_wordlist(wordlist.as_bytes()).unwrap()
    }

    #[test]
    fn known_words_are_known() {
        let spell = checker("cat\nthe\n");

        assert!(spell.is_known("cat"));
        assert!(!spell.is_known("kat"));
    }

    #[test]
    fn title_case_falls_back_to_lowercase() {
        let spell = checker("the\n");

        assert!(spell.is_known("The"));
        assert!(!spell.is_known("THE"));
    }

    #[test]
    fn non_alphabetic_tokens_are_never_flagged() {
        let spell = checker("the\n");

        assert!(spell.is_known("1234"));
        assert!(spell.is_known("..."));
        assert!(spell.is_known(""));
    }

    #[test]
    fn suggestions_are_ranked_by_distance() {
        let spell = checker("received\ndeceived\nthe\n");

        let suggestions = spell.suggest("recieved");
        // transposition: distance 1 beats the two-edit alternative
        assert_eq!(suggestions[0], "received");
    }

    #[test]
    fn frequency_breaks_distance_ties() {
        let spell = checker("bat\t5\nhat\t80\n");

        let suggestions = spell.suggest("mat");
        assert_eq!(suggestions, vec!["hat", "bat"]);
    }

    #[test]
    fn top_n_limits_suggestions() {
        let mut spell = checker("mat\nbat\nhat\nrat\nfat\ncat\n");
        spell.options_mut().top_n = 2;

        assert_eq!(spell.suggest("gat").len(), 2);
    }

    #[test]
    fn bad_frequencies_are_fatal() {
        let err = Spell::from_wordlist("cat\tlots\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedResource(_)));
        // the message names the resource it came from, nothing else
        assert_eq!(
            err.in_resource("wordlist").to_string(),
            "failed to load wordlist: malformed resource: bad word frequency \"cat\\tlots\""
        );
    }
}
