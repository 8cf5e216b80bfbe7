//! Case-preserving substitution
//!
//! The replacement follows the casing of the matched literal:
//! all-caps stays all-caps, a leading capital stays a leading capital,
//! anything else passes the target through unchanged.

/// Shape the target after the matched literal's casing.
pub fn preserve_case(matched: &str, target: &str) -> String {
    if matched.to_uppercase() == matched {
        return target.to_uppercase();
    }
    if starts_uppercase(matched) {
        return capitalize_first(target);
    }
    target.to_string()
}

/// True when the first char is unchanged by upper-casing.
fn starts_uppercase(text: &str) -> bool {
    match text.chars().next() {
        Some(c) => c.to_uppercase().eq(std::iter::once(c)),
        None => true,
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper() {
        assert_eq!(preserve_case("FOO", "bar"), "BAR");
    }

    #[test]
    fn test_title() {
        assert_eq!(preserve_case("Foo", "bar"), "Bar");
        // only the first char of the target changes
        assert_eq!(preserve_case("Foo", "bAR baz"), "BAR baz");
    }

    #[test]
    fn test_lower_and_mixed() {
        assert_eq!(preserve_case("foo", "bar"), "bar");
        assert_eq!(preserve_case("fOo", "bar"), "bar");
        assert_eq!(preserve_case("foo", "Bar"), "Bar");
    }

    #[test]
    fn test_caseless_match_counts_as_upper() {
        // digits are their own upper-case form
        assert_eq!(preserve_case("42", "answer"), "ANSWER");
    }

    #[test]
    fn test_leading_non_letter_is_title() {
        assert_eq!(preserve_case("1st", "first"), "First");
    }

    #[test]
    fn test_unicode() {
        assert_eq!(preserve_case("ÉCOLE", "straße"), "STRASSE");
        assert_eq!(preserve_case("École", "über"), "Über");
        assert_eq!(preserve_case("école", "über"), "über");
    }

    #[test]
    fn test_empty_target() {
        assert_eq!(preserve_case("Foo", ""), "");
    }
}
