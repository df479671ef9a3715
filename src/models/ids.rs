use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const ID_LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Identifier of an inventory record.
///
/// Opaque short string, unique within a record list. Generated ids are two
/// random uppercase letters followed by the session counter padded to three
/// digits (`AB001`); imported ids are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wraps an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh id for the given counter value.
    ///
    /// # Examples
    ///
    /// ```
    /// use stok::RecordId;
    ///
    /// let id = RecordId::generate(7, &mut rand::rng());
    /// assert_eq!(id.as_str().len(), 5);
    /// assert!(id.as_str().ends_with("007"));
    /// ```
    pub fn generate<R: Rng + ?Sized>(counter: u64, rng: &mut R) -> Self {
        let first = ID_LETTERS[rng.random_range(0..ID_LETTERS.len())] as char;
        let second = ID_LETTERS[rng.random_range(0..ID_LETTERS.len())] as char;
        Self(format!("{first}{second}{counter:03}"))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
