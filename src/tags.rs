//! Tag lists: parsing, formatting, the tag vocabulary and autocomplete.
//!
//! Tags are entered as one whitespace-separated string and stored as a list of
//! normalized tokens. The vocabulary collects every tag seen across records
//! and drives completion of the tag currently being typed.

mod category;
mod suggest;
mod vocabulary;

pub use category::TagCategory;
pub use suggest::{apply_suggestion, suggest};
pub use vocabulary::Vocabulary;

use serde_json::Value;

use crate::TextNormalizer;

/// Splits whitespace-separated tag text into normalized tags.
///
/// Runs of whitespace collapse and empty segments are dropped.
///
/// # Examples
///
/// ```
/// use stok::tags::parse_tags;
///
/// assert_eq!(parse_tags("elektronik relay"), vec!["ELEKTRONIK", "RELAY"]);
/// assert_eq!(parse_tags("  çoklu   boşluk  "), vec!["COKLU", "BOSLUK"]);
/// assert!(parse_tags("").is_empty());
/// ```
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input.split_whitespace().map(TextNormalizer::normalize).collect()
}

/// Joins tags with single spaces.
///
/// # Examples
///
/// ```
/// use stok::tags::format_tags;
///
/// assert_eq!(format_tags(&["ELEKTRONIK".to_string(), "RELAY".to_string()]), "ELEKTRONIK RELAY");
/// assert_eq!(format_tags(&[]), "");
/// ```
#[must_use]
pub fn format_tags(tags: &[String]) -> String {
    tags.join(" ")
}

/// Reads tags out of an untyped stored value.
///
/// Arrays are normalized element by element, a string is parsed as tag text,
/// and anything else (including null or a missing value) yields no tags.
pub fn tags_from_value(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(parse_tags)
            .collect(),
        Some(Value::String(s)) => parse_tags(s),
        _ => Vec::new(),
    }
}
