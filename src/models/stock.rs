use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker used wherever a stock quantity is not known.
pub const UNKNOWN_STOCK: &str = "?";

/// Stock level of a record.
///
/// Either a non-negative count or the unknown sentinel. Serializes as a JSON
/// number or the string `"?"`, matching the stored data format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stock {
    Count(u64),
    #[default]
    Unknown,
}

impl Stock {
    /// Coerces free-form input into a stock value.
    ///
    /// Empty input and `?` are unknown. Otherwise every non-digit character is
    /// stripped first and the remaining digits are parsed; input without any
    /// digit is unknown. Partially numeric input is never rejected, which also
    /// means a leading minus sign is dropped rather than refused.
    ///
    /// # Examples
    ///
    /// ```
    /// use stok::Stock;
    ///
    /// assert_eq!(Stock::coerce(""), Stock::Unknown);
    /// assert_eq!(Stock::coerce("10abc"), Stock::Count(10));
    /// assert_eq!(Stock::coerce("-5"), Stock::Count(5));
    /// assert_eq!(Stock::coerce("abc"), Stock::Unknown);
    /// ```
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        if raw.is_empty() || raw == UNKNOWN_STOCK {
            return Self::Unknown;
        }

        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Self::Unknown;
        }

        // Only digits remain, so the sole failure mode is overflow.
        Self::Count(digits.parse().unwrap_or(u64::MAX))
    }

    /// Returns the count, or `None` when unknown.
    pub fn count(self) -> Option<u64> {
        match self {
            Self::Count(n) => Some(n),
            Self::Unknown => None,
        }
    }

    /// Returns true for the unknown sentinel.
    pub fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Stock after receiving one unit. Unknown stock becomes 1.
    #[must_use]
    pub fn incremented(self) -> Self {
        match self {
            Self::Count(n) => Self::Count(n.saturating_add(1)),
            Self::Unknown => Self::Count(1),
        }
    }

    /// Stock after removing one unit.
    ///
    /// Returns `None` when the stock is zero or unknown, since there is
    /// nothing known to take away.
    #[must_use]
    pub fn decremented(self) -> Option<Self> {
        match self {
            Self::Count(n) if n > 0 => Some(Self::Count(n - 1)),
            _ => None,
        }
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Unknown => f.write_str(UNKNOWN_STOCK),
        }
    }
}

impl FromStr for Stock {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::coerce(s))
    }
}

impl From<u64> for Stock {
    fn from(n: u64) -> Self {
        Self::Count(n)
    }
}

impl Serialize for Stock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(n) => serializer.serialize_u64(*n),
            Self::Unknown => serializer.serialize_str(UNKNOWN_STOCK),
        }
    }
}

impl<'de> Deserialize<'de> for Stock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StockVisitor)
    }
}

/// Accepts any stored number or string and runs it through coercion.
struct StockVisitor;

impl Visitor<'_> for StockVisitor {
    type Value = Stock;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a stock count or \"?\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Stock, E> {
        Ok(Stock::Count(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Stock, E> {
        Ok(Stock::coerce(&v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Stock, E> {
        Ok(Stock::coerce(&v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Stock, E> {
        Ok(Stock::coerce(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Stock, E> {
        Ok(Stock::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_sentinel_are_unknown() {
        assert_eq!(Stock::coerce(""), Stock::Unknown);
        assert_eq!(Stock::coerce("?"), Stock::Unknown);
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(Stock::coerce("10"), Stock::Count(10));
        assert_eq!(Stock::coerce("0"), Stock::Count(0));
        assert_eq!(Stock::coerce("007"), Stock::Count(7));
    }

    #[test]
    fn test_non_digits_are_stripped() {
        assert_eq!(Stock::coerce("10abc"), Stock::Count(10));
        assert_eq!(Stock::coerce("a1b2"), Stock::Count(12));
        assert_eq!(Stock::coerce("1.5"), Stock::Count(15));
        assert_eq!(Stock::coerce(" 3 "), Stock::Count(3));
    }

    #[test]
    fn test_input_without_digits_is_unknown() {
        assert_eq!(Stock::coerce("abc"), Stock::Unknown);
        assert_eq!(Stock::coerce("??"), Stock::Unknown);
        assert_eq!(Stock::coerce("-"), Stock::Unknown);
        assert_eq!(Stock::coerce(" "), Stock::Unknown);
    }

    /// Known quirk: the minus sign is stripped with every other non-digit
    /// before the emptiness check, so negative input yields its magnitude.
    #[test]
    fn test_quirk_negative_input_keeps_magnitude() {
        assert_eq!(Stock::coerce("-5"), Stock::Count(5));
        assert_eq!(Stock::coerce("-0"), Stock::Count(0));
    }

    #[test]
    fn test_overflow_saturates() {
        assert_eq!(
            Stock::coerce("99999999999999999999999999"),
            Stock::Count(u64::MAX)
        );
    }

    #[test]
    fn test_increment() {
        assert_eq!(Stock::Unknown.incremented(), Stock::Count(1));
        assert_eq!(Stock::Count(4).incremented(), Stock::Count(5));
        assert_eq!(Stock::Count(u64::MAX).incremented(), Stock::Count(u64::MAX));
    }

    #[test]
    fn test_decrement() {
        assert_eq!(Stock::Count(5).decremented(), Some(Stock::Count(4)));
        assert_eq!(Stock::Count(1).decremented(), Some(Stock::Count(0)));
        assert_eq!(Stock::Count(0).decremented(), None);
        assert_eq!(Stock::Unknown.decremented(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Stock::Count(12).to_string(), "12");
        assert_eq!(Stock::Unknown.to_string(), "?");
    }

    #[test]
    fn test_serializes_as_number_or_sentinel() {
        assert_eq!(serde_json::to_string(&Stock::Count(10)).unwrap(), "10");
        assert_eq!(serde_json::to_string(&Stock::Unknown).unwrap(), r#""?""#);
    }

    #[test]
    fn test_deserializes_loose_values() {
        let parse = |json: &str| serde_json::from_str::<Stock>(json).unwrap();

        assert_eq!(parse("10"), Stock::Count(10));
        assert_eq!(parse(r#""?""#), Stock::Unknown);
        assert_eq!(parse(r#""12""#), Stock::Count(12));
        assert_eq!(parse("null"), Stock::Unknown);
        assert_eq!(parse("-3"), Stock::Count(3));
    }
}
