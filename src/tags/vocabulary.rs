use std::collections::BTreeSet;

use crate::Record;

/// The set of tags known to a session, kept in sorted order.
///
/// Suggestions are listed in this order, so it stays stable from one call to
/// the next. Blank entries are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    tags: BTreeSet<String>,
}

impl Vocabulary {
    /// Creates an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the vocabulary from every tag on the given records.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut vocabulary = Self::new();
        for record in records {
            vocabulary.extend(record.tags.iter().cloned());
        }
        vocabulary
    }

    /// Adds one tag, ignoring blanks and duplicates.
    ///
    /// Returns true if the tag was not known before.
    pub fn insert(&mut self, tag: impl AsRef<str>) -> bool {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            return false;
        }
        self.tags.insert(tag.to_string())
    }

    /// Adds every tag from `tags`.
    pub fn extend<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.insert(tag);
        }
    }

    /// Returns true if the tag is known.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Iterates tags in stored order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Number of known tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true when no tags are known.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut vocabulary = Self::new();
        vocabulary.extend(iter);
        vocabulary
    }
}
