//! Utility functions for GreenLine
//!
//! Common helper functions used across the codebase.

use std::sync::LazyLock;

/// Regex pattern for validating identifiers (slugs, coupon codes, skill names)
static VALID_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new("^[a-zA-Z0-9_.:-]*$").expect("Invalid regex pattern"));

/// Validate a string contains only allowed identifier characters
///
/// Allowed characters: alphanumeric, underscore, dot, colon, hyphen
pub fn is_valid_identifier(str: &str) -> bool {
    VALID_PATTERN.is_match(str)
}

/// Derive a URL slug from a display name
///
/// Lowercases, maps runs of non-alphanumeric characters to single
/// hyphens, and trims leading/trailing hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Normalize a phone number to E.164-ish form for SMS delivery
///
/// Keeps a leading `+` and strips every other non-digit character.
/// Returns `None` when fewer than 7 digits remain.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let mut normalized = String::with_capacity(raw.len());

    for (i, c) in raw.chars().enumerate() {
        if c == '+' && i == 0 {
            normalized.push(c);
        } else if c.is_ascii_digit() {
            normalized.push(c);
        }
    }

    let digits = normalized.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 7 { None } else { Some(normalized) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("spring-special.v2"));
        assert!(is_valid_identifier("skill:social_post"));
        assert!(is_valid_identifier(""));
        assert!(!is_valid_identifier("with spaces"));
        assert!(!is_valid_identifier("bad/char"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Joe's Plumbing & Heating"), "joe-s-plumbing-heating");
        assert_eq!(slugify("  Green Line 365  "), "green-line-365");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(
            normalize_phone("+1 (555) 867-5309"),
            Some("+15558675309".to_string())
        );
        assert_eq!(normalize_phone("555.867.5309"), Some("5558675309".to_string()));
        assert_eq!(normalize_phone("123"), None);
        // interior plus signs are stripped
        assert_eq!(
            normalize_phone("1+555+8675309"),
            Some("15558675309".to_string())
        );
    }
}
