//! The inflection dictionary: surface-form sets per lemma, parsed from a
//! word-form database in the AGID text format.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;

/// All inflected surface forms of one lemma, plus the word-class tag from
/// the database (`V`, `N`, `A`, possibly with a `?` qualifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSet {
    pub tag: String,
    /// Insertion-ordered and always containing the lemma itself.
    pub forms: IndexSet<String>,
}

/// Maps lemmas to their inflection forms. Entries look like
///
/// ```text
/// abet V: abetted abetting abets
/// ```
///
/// with optional frequency / variant markup in the forms which is stripped
/// on load. Lines that do not fit the format are skipped with a warning;
/// they never abort the load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inflections {
    entries: HashMap<String, FormSet>,
}

impl Inflections {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_dump(File::open(path.as_ref())?)
    }

    pub fn from_dump<R: Read>(reader: R) -> Result<Self, Error> {
        lazy_static! {
            static ref MARKUP: Regex = Regex::new(r"[0-9~<,_!?.|]+").unwrap();
            static ref BRACES: Regex = Regex::new(r"\{.*?\}").unwrap();
        }

        let mut entries = HashMap::new();
        let mut skipped = 0usize;

        for line in BufReader::new(reader).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let (key, forms) = match line.split_once(": ") {
                Some(parts) => parts,
                None => {
                    log::warn!("skipping malformed inflection entry {:?}", line);
                    skipped += 1;
                    continue;
                }
            };

            let mut key_fields = key.split_whitespace();
            let lemma = match key_fields.next() {
                Some(lemma) => lemma,
                None => {
                    log::warn!("skipping inflection entry without a lemma {:?}", line);
                    skipped += 1;
                    continue;
                }
            };
            let tag = key_fields.next().unwrap_or("").to_owned();

            let forms = MARKUP.replace_all(forms, "");
            let forms = BRACES.replace_all(&forms, "");

            let mut set: IndexSet<String> = IndexSet::new();
            set.insert(lemma.to_owned());
            set.extend(forms.split_whitespace().map(|form| form.to_owned()));

            entries.insert(lemma.to_owned(), FormSet { tag, forms: set });
        }

        if skipped > 0 {
            log::warn!("skipped {} malformed inflection entries", skipped);
        }
        log::info!("loaded inflection forms for {} lemmas", entries.len());

        Ok(Inflections { entries })
    }

    /// The form set for a lemma, if the lemma is in the database.
    pub fn forms(&self, lemma: &str) -> Option<&FormSet> {
        self.entries.get(lemma)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FormSet)> {
        self.entries.iter()
    }
}
