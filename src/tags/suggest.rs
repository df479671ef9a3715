use super::{Vocabulary, format_tags, parse_tags};

/// Computes completion candidates for the tag input `input`.
///
/// When the input is empty or ends in whitespace the user is starting a new
/// tag, and every known tag not already entered is offered. Otherwise the
/// candidates are the known tags that contain the last token
/// (case-insensitively), excluding the token itself and tags already entered.
/// Candidates keep the vocabulary's order.
///
/// # Examples
///
/// ```
/// use stok::tags::{Vocabulary, suggest};
///
/// let vocabulary: Vocabulary = ["AB", "BC"].into_iter().collect();
/// assert_eq!(suggest("A", &vocabulary), vec!["AB"]);
/// assert_eq!(suggest("", &vocabulary), vec!["AB", "BC"]);
/// ```
pub fn suggest(input: &str, vocabulary: &Vocabulary) -> Vec<String> {
    let entered = parse_tags(input);

    if starts_new_tag(input) {
        return vocabulary
            .iter()
            .filter(|tag| !entered.iter().any(|e| e == tag))
            .map(String::from)
            .collect();
    }

    let last = entered.last().map(String::as_str).unwrap_or_default();
    let needle = last.to_lowercase();

    vocabulary
        .iter()
        .filter(|tag| {
            tag.to_lowercase().contains(&needle)
                && *tag != last
                && !entered.iter().any(|e| e == tag)
        })
        .map(String::from)
        .collect()
}

/// Applies a chosen suggestion to the tag input.
///
/// A new tag is appended when the input is empty or ends in whitespace;
/// otherwise the in-progress last token is replaced. The result always ends in
/// a single space so typing can continue.
///
/// # Examples
///
/// ```
/// use stok::tags::apply_suggestion;
///
/// assert_eq!(apply_suggestion("ELEKTRONIK RE", "RELAY"), "ELEKTRONIK RELAY ");
/// assert_eq!(apply_suggestion("ELEKTRONIK ", "RELAY"), "ELEKTRONIK RELAY ");
/// assert_eq!(apply_suggestion("", "RELAY"), "RELAY ");
/// ```
pub fn apply_suggestion(input: &str, tag: &str) -> String {
    let mut entered = parse_tags(input);

    match entered.last_mut() {
        Some(last) if !starts_new_tag(input) => {
            *last = tag.to_string();
            format!("{} ", format_tags(&entered))
        }
        _ => format!("{input}{tag} "),
    }
}

fn starts_new_tag(input: &str) -> bool {
    input.chars().next_back().is_none_or(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(tags: &[&str]) -> Vocabulary {
        tags.iter().copied().collect()
    }

    #[test]
    fn test_empty_input_offers_everything() {
        assert_eq!(suggest("", &vocab(&["A", "B"])), vec!["A", "B"]);
    }

    #[test]
    fn test_trailing_space_excludes_entered_tags() {
        assert_eq!(suggest("A ", &vocab(&["A", "B"])), vec!["B"]);
    }

    #[test]
    fn test_partial_token_filters_by_substring() {
        assert_eq!(suggest("A", &vocab(&["AB", "BC"])), vec!["AB"]);
        assert_eq!(
            suggest("EL", &vocab(&["ELEKTRONIK", "MEKANIK", "RELAY"])),
            vec!["ELEKTRONIK", "RELAY"]
        );
    }

    #[test]
    fn test_exact_match_is_not_suggested() {
        assert_eq!(suggest("RELAY", &vocab(&["RELAY", "RELAYS"])), vec!["RELAYS"]);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        // Input is normalized before comparison, vocabulary entries lowercased.
        assert_eq!(suggest("vi", &vocab(&["VIDA", "SOMUN"])), vec!["VIDA"]);
    }

    #[test]
    fn test_tags_already_entered_are_excluded() {
        assert_eq!(
            suggest("VIDA V", &vocab(&["VIDA", "VIDALI", "SOMUN"])),
            vec!["VIDALI"]
        );
    }

    #[test]
    fn test_no_vocabulary_no_suggestions() {
        assert!(suggest("", &Vocabulary::new()).is_empty());
        assert!(suggest("A", &Vocabulary::new()).is_empty());
    }

    #[test]
    fn test_order_follows_vocabulary() {
        assert_eq!(suggest("", &vocab(&["C", "A", "B"])), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_apply_replaces_last_token() {
        assert_eq!(apply_suggestion("VIDA SO", "SOMUN"), "VIDA SOMUN ");
        assert_eq!(apply_suggestion("so", "SOMUN"), "SOMUN ");
    }

    #[test]
    fn test_apply_appends_after_space() {
        assert_eq!(apply_suggestion("VIDA ", "SOMUN"), "VIDA SOMUN ");
        assert_eq!(apply_suggestion("", "SOMUN"), "SOMUN ");
    }

    #[test]
    fn test_apply_collapses_spacing_when_replacing() {
        assert_eq!(apply_suggestion("VIDA   SO", "SOMUN"), "VIDA SOMUN ");
    }
}
