//! Linguistic annotation: lemmas and part-of-speech tags per token.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::inflect::Inflections;
use crate::types::TokenData;
use crate::utils::{apply_to_first, is_title_case};
use crate::Error;

/// Annotates a token sequence with lemma and tag information.
///
/// Implementations must be deterministic and must return exactly one
/// annotation per input token, in input order; the edit search indexes
/// edits by token position and checks this invariant before every sweep.
pub trait Analyze {
    fn analyze(&self, tokens: &[String]) -> Vec<TokenData>;
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
struct LemmaData {
    lemma: String,
    tag: String,
}

/// A lookup lemmatizer / tagger over a word -> (lemma, tag) lexicon.
///
/// Title-case words fall back to their lowercase form's entry; words absent
/// from the lexicon lemmatize to themselves with an empty tag, which keeps
/// the analysis aligned and simply disables morphology candidates for them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tagger {
    tags: HashMap<String, Vec<LemmaData>>,
}

impl Tagger {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_dump(File::open(path.as_ref())?)
    }

    /// Reads a tab-separated `form<TAB>lemma<TAB>tag` dump. Lines starting
    /// with `#` are comments. Lines with fewer than three fields are
    /// malformed and fatal.
    pub fn from_dump<R: Read>(reader: R) -> Result<Self, Error> {
        let mut tags: HashMap<String, Vec<LemmaData>> = HashMap::new();

        for line in BufReader::new(reader).lines() {
            let line = line?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 {
                return Err(Error::MalformedResource(format!(
                    "lexicon entry with {} fields: {:?}",
                    fields.len(),
                    line
                )));
            }

            tags.entry(fields[0].to_owned())
                .or_insert_with(Vec::new)
                .push(LemmaData {
                    lemma: fields[1].to_owned(),
                    tag: fields[2].to_owned(),
                });
        }

        log::info!("loaded lexicon with {} forms", tags.len());
        Ok(Tagger { tags })
    }

    /// Derives a tagger by inverting an inflection dictionary: every surface
    /// form maps back to its lemma, tagged with the entry's word class.
    pub fn from_inflections(inflections: &Inflections) -> Self {
        let mut tags: HashMap<String, Vec<LemmaData>> = HashMap::new();

        for (lemma, entry) in inflections.iter() {
            for form in &entry.forms {
                tags.entry(form.clone())
                    .or_insert_with(Vec::new)
                    .push(LemmaData {
                        lemma: lemma.clone(),
                        tag: entry.tag.clone(),
                    });
            }
        }

        // the dictionary iterates in hash order; sort so that ambiguous
        // forms always resolve to the same lemma
        for data in tags.values_mut() {
            data.sort();
        }

        Tagger { tags }
    }

    fn lookup(&self, word: &str) -> Option<&LemmaData> {
        if let Some(data) = self.tags.get(word).and_then(|data| data.first()) {
            return Some(data);
        }

        if is_title_case(word) {
            let lower = apply_to_first(word, |c| c.to_lowercase().collect());
            return self.tags.get(&lower).and_then(|data| data.first());
        }

        None
    }
}

impl Analyze for Tagger {
    fn analyze(&self, tokens: &[String]) -> Vec<TokenData> {
        tokens
            .iter()
            .map(|token| match self.lookup(token) {
                Some(data) => TokenData {
                    text: token.clone(),
                    lemma: data.lemma.clone(),
                    tag: data.tag.clone(),
                },
                None => TokenData {
                    text: token.clone(),
                    lemma: token.clone(),
                    tag: String::new(),
                },
            })
            .collect()
    }
}
