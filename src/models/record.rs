use serde::{Deserialize, Serialize};

use super::{RecordId, Stock};

/// A tracked part in the inventory.
///
/// `name` and `code` hold normalized, non-empty text and `tags` holds
/// normalized tags. The part code is stored under `partNumber` so data written
/// by earlier versions of the tracker loads unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier, unique within the record list.
    pub id: RecordId,
    /// Display name of the part.
    pub name: String,
    /// Manufacturer or internal part code.
    #[serde(rename = "partNumber")]
    pub code: String,
    /// Category tags, in the order they were entered.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Units on hand.
    #[serde(default)]
    pub stock: Stock,
}

impl Record {
    /// Creates a record from already-normalized parts.
    pub fn new(
        id: RecordId,
        name: impl Into<String>,
        code: impl Into<String>,
        tags: Vec<String>,
        stock: Stock,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            code: code.into(),
            tags,
            stock,
        }
    }

    /// Returns true if the name, code or any tag contains `query`,
    /// compared case-insensitively.
    ///
    /// An empty query matches every record.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.code.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

/// Raw field values as typed by the user, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordInput {
    pub name: String,
    pub code: String,
    pub tags: String,
    pub stock: String,
}

impl RecordInput {
    /// Creates input with a name and code and no tags or stock.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            ..Self::default()
        }
    }

    /// Sets the whitespace-separated tag text.
    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Sets the free-form stock text.
    pub fn stock(mut self, stock: impl Into<String>) -> Self {
        self.stock = stock.into();
        self
    }
}
