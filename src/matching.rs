//! Watch criteria matching.
//!
//! Current watches carry an 8-digit article number; matching strips every
//! non-digit character from both sides and compares the digit strings.
//! Watches created before article-number matching carry a free-text
//! product name instead, matched case-insensitively against item names.

/// Strip everything except ASCII digits. "504.878.57" becomes "50487857".
pub fn normalize_article_number(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Exact match on normalized article numbers. An empty normalized
/// criterion never matches anything.
pub fn matches_article_number(criterion: &str, article_numbers: &[String]) -> bool {
    let normalized = normalize_article_number(criterion);

    if normalized.is_empty() {
        return false;
    }

    article_numbers.iter().any(|number| normalize_article_number(number) == normalized)
}

/// Legacy free-text match: the whole term as a substring, or every
/// whitespace-separated word present somewhere in the item name.
/// Deliberately permissive; legacy watches rely on these semantics.
pub fn matches_legacy_name(term: &str, item_name: &str) -> bool {
    let normalized_term = term.trim().to_lowercase();
    let normalized_name = item_name.trim().to_lowercase();

    if normalized_term.is_empty() {
        return false;
    }

    if normalized_name.contains(&normalized_term) {
        return true;
    }

    normalized_term.split_whitespace().all(|word| normalized_name.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_normalize_strips_separators() {
        assert_eq!(normalize_article_number("504.878.57"), "50487857");
        assert_eq!(normalize_article_number("504-878-57"), "50487857");
        assert_eq!(normalize_article_number("50487857"), "50487857");
    }

    #[test]
    fn test_article_match_is_separator_insensitive() {
        assert!(matches_article_number("504.878.57", &numbers(&["50487857"])));
        assert!(matches_article_number("50487857", &numbers(&["504.878.57"])));
    }

    #[test]
    fn test_article_match_requires_exact_digits() {
        assert!(!matches_article_number("50487857", &numbers(&["50487858"])));
        assert!(!matches_article_number("5048785", &numbers(&["50487857"])));
    }

    #[test]
    fn test_empty_criterion_never_matches() {
        assert!(!matches_article_number("", &numbers(&["50487857"])));
        assert!(!matches_article_number("...", &numbers(&["50487857"])));
        assert!(!matches_legacy_name("", "BILLY boekenkast"));
        assert!(!matches_legacy_name("   ", "BILLY boekenkast"));
    }

    #[test]
    fn test_article_match_against_no_codes() {
        assert!(!matches_article_number("50487857", &[]));
    }

    #[test]
    fn test_legacy_substring_match() {
        assert!(matches_legacy_name("BILLY", "IKEA BILLY boekenkast wit 80x28x202cm"));
        assert!(matches_legacy_name("billy boekenkast", "IKEA BILLY boekenkast wit"));
    }

    #[test]
    fn test_legacy_all_words_any_order() {
        assert!(matches_legacy_name("boekenkast BILLY", "IKEA BILLY boekenkast wit 80x28x202cm"));
    }

    #[test]
    fn test_legacy_missing_word_no_match() {
        assert!(!matches_legacy_name("BILLY boekenkast", "BILLY deur"));
    }
}
