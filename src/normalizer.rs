use serde_json::Value;

/// Normalization applied to every free-text field.
///
/// Text is uppercased and the Turkish letters that have no ASCII uppercase
/// form are folded onto their plain-ASCII equivalents, so `çıkış` becomes
/// `CIKIS`. Everything else (digits, punctuation, other scripts) passes through
/// the ordinary Unicode uppercase mapping.
pub struct TextNormalizer;

impl TextNormalizer {
    /// Normalizes a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use stok::TextNormalizer;
    ///
    /// assert_eq!(TextNormalizer::normalize("çıkış"), "CIKIS");
    /// assert_eq!(TextNormalizer::normalize("İstanbul"), "ISTANBUL");
    /// assert_eq!(TextNormalizer::normalize("prd-001"), "PRD-001");
    /// assert_eq!(TextNormalizer::normalize("test@#$%"), "TEST@#$%");
    /// ```
    #[must_use]
    pub fn normalize(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match fold_letter(c) {
                Some(ascii) => out.push(ascii),
                None => out.extend(c.to_uppercase()),
            }
        }
        out
    }

    /// Normalizes a loosely-typed value.
    ///
    /// Used where text comes from untyped data such as stored JSON. A value
    /// that is absent altogether renders as `UNDEFINED` and an explicit null as
    /// `NULL`; non-string values are normalized from their JSON text.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::{Value, json};
    /// use stok::TextNormalizer;
    ///
    /// assert_eq!(TextNormalizer::normalize_value(None), "UNDEFINED");
    /// assert_eq!(TextNormalizer::normalize_value(Some(&Value::Null)), "NULL");
    /// assert_eq!(TextNormalizer::normalize_value(Some(&json!("röle"))), "ROLE");
    /// assert_eq!(TextNormalizer::normalize_value(Some(&json!(12))), "12");
    /// ```
    #[must_use]
    pub fn normalize_value(value: Option<&Value>) -> String {
        match value {
            None => Self::normalize("undefined"),
            Some(Value::Null) => Self::normalize("null"),
            Some(Value::String(s)) => Self::normalize(s),
            Some(other) => Self::normalize(&other.to_string()),
        }
    }
}

/// Maps the fixed Turkish letter table, both cases, onto uppercase ASCII.
fn fold_letter(c: char) -> Option<char> {
    let folded = match c {
        'ç' | 'Ç' => 'C',
        'ğ' | 'Ğ' => 'G',
        'ı' | 'İ' | 'i' => 'I',
        'ö' | 'Ö' => 'O',
        'ş' | 'Ş' => 'S',
        'ü' | 'Ü' => 'U',
        _ => return None,
    };
    Some(folded)
}
