use std::fmt;

/// Broad part family inferred from a tag's wording.
///
/// Used to group tags visually in listings. Matching is a plain substring
/// check on the lowercased tag, tried in declaration order, with both Turkish
/// and English keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCategory {
    Electronics,
    Resistor,
    Capacitor,
    Integrated,
    Mechanical,
}

const KEYWORDS: &[(TagCategory, &[&str])] = &[
    (TagCategory::Electronics, &["elektronik", "electronic"]),
    (TagCategory::Resistor, &["direnç", "direnc", "resistor"]),
    (TagCategory::Capacitor, &["kondansatör", "kondansator", "capacitor"]),
    (TagCategory::Integrated, &["entegre", "ic", "integrated"]),
    (TagCategory::Mechanical, &["mekanik", "mechanical"]),
];

impl TagCategory {
    /// Classifies a tag, returning `None` when no keyword matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use stok::tags::TagCategory;
    ///
    /// assert_eq!(TagCategory::classify("ELEKTRONIK"), Some(TagCategory::Electronics));
    /// assert_eq!(TagCategory::classify("IC"), Some(TagCategory::Integrated));
    /// assert_eq!(TagCategory::classify("VIDA"), None);
    /// ```
    pub fn classify(tag: &str) -> Option<Self> {
        let lower = tag.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map(|(category, _)| *category)
    }

    /// Short label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Resistor => "resistor",
            Self::Capacitor => "capacitor",
            Self::Integrated => "integrated",
            Self::Mechanical => "mechanical",
        }
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
