//! Grammatical error correction with a language model and minimal resources.
//!
//! # Overview
//!
//! lmgec corrects non-word spelling errors, morphological errors and a small
//! closed set of determiner / preposition errors in pre-tokenized sentences.
//! It proposes single-token substitutions (and deletions) from several
//! independent sources and lets an n-gram language model arbitrate: a
//! proposal is only accepted if the resulting sentence scores at least a
//! configurable margin above the current one. Missing-word errors and
//! anything outside these four edit classes are not corrected.
//!
//! The core abstractions are:
//! - A [Corrector][correct::Corrector] which drives the iterative edit
//!   search over one sentence at a time.
//! - The [Score][lm::Score], [Analyze][analyze::Analyze] and
//!   [Spellcheck][spell::Spellcheck] traits which supply the language model,
//!   the lemmatizer / tagger and the spellchecker. Default backends are
//!   [ArpaModel][lm::ArpaModel], [Tagger][analyze::Tagger] and
//!   [Spell][spell::Spell].
//!
//! # Examples
//!
//! Correct a file of tokenized sentences, one per line:
//!
//! ```no_run
//! use lmgec::{analyze::Tagger, correct::Corrector, inflect::Inflections, lm::ArpaModel, spell::Spell};
//!
//! let lm = ArpaModel::from_path("en.arpa")?;
//! let spell = Spell::from_path("wordlist.txt")?;
//! let inflections = Inflections::from_path("infl.txt")?;
//! let tagger = Tagger::from_inflections(&inflections);
//!
//! let corrector = Corrector::new(lm, tagger, spell, inflections);
//!
//! assert_eq!(
//!     corrector.correct_line("she bought a apple"),
//!     String::from("She bought an apple")
//! );
//! # Ok::<(), lmgec::Error>(())
//! ```

use std::io;

use thiserror::Error;

pub mod analyze;
pub mod confusion;
pub mod correct;
pub mod inflect;
pub mod lm;
pub mod spell;
pub mod types;
pub(crate) mod utils;

mod component;
pub use component::Component;

#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    /// (De)serialization error. Can have occured during deserialization or during serialization.
    #[error(transparent)]
    Serialization(#[from] bincode::Error),
    #[error(transparent)]
    Fst(#[from] fst::Error),
    /// A resource file (language model, wordlist, lexicon) does not conform
    /// to its expected format.
    #[error("malformed resource: {0}")]
    MalformedResource(String),
    /// The analyzer returned a different number of annotations than tokens.
    /// Correcting the sentence would mis-index edits, so it is left unchanged.
    #[error("misaligned analysis: {tokens} tokens but {annotations} annotations")]
    MisalignedAnalysis { tokens: usize, annotations: usize },
    /// A required resource failed to load. Wraps the underlying error and
    /// names the resource so startup failures are attributable.
    #[error("failed to load {name}: {source}")]
    Resource {
        name: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attributes this error to the named resource.
    pub fn in_resource(self, name: &'static str) -> Self {
        Error::Resource {
            name,
            source: Box::new(self),
        }
    }
}
