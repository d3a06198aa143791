//! Closed confusion sets for function-word edits.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A small closed set of mutually confusable function words. The empty
/// string is a member and stands for deleting the token.
///
/// A token that is a member of the set may be replaced by any member,
/// so candidate iteration order is part of the behavior and is kept
/// insertion-ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionSet {
    entries: IndexSet<String>,
}

impl ConfusionSet {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConfusionSet {
            entries: entries.into_iter().map(|entry| entry.into()).collect(),
        }
    }

    /// The common English determiners.
    pub fn determiners() -> Self {
        ConfusionSet::new(vec!["", "the", "a", "an"])
    }

    /// The common English prepositions.
    pub fn prepositions() -> Self {
        ConfusionSet::new(vec![
            "", "about", "at", "by", "for", "from", "in", "of", "on", "to", "with",
        ])
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains(word)
    }

    /// All members in insertion order, including the deletion candidate.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletion_is_a_candidate() {
        let set = ConfusionSet::determiners();
        assert!(set.contains(""));
        assert!(set.candidates().any(|candidate| candidate.is_empty()));
    }

    #[test]
    fn membership_is_exact() {
        let set = ConfusionSet::prepositions();
        assert!(set.contains("with"));
        assert!(!set.contains("With"));
        assert!(!set.contains("beneath"));
    }

    #[test]
    fn order_is_stable() {
        let set = ConfusionSet::new(vec!["b", "a", "c", "a"]);
        let candidates: Vec<&str> = set.candidates().collect();
        assert_eq!(candidates, vec!["b", "a", "c"]);
    }
}
