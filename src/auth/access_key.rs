//! Access key format rules.
//!
//! Three shapes are accepted:
//! - long: `XXXX-XXXX-XXXX-XXXX`, upper-case letters and digits
//! - short: `word-word-NNNN`, lower-case words and a four digit suffix
//! - simple: 4 to 20 lower-case letters or digits
//!
//! Keys are compared case-insensitively once the format check has passed.

use crate::stats::event::mask_access_key;

pub const FORMAT_HINT: &str = "Enter the key in a valid format (for example ABCD-1234-EFGH-5678)";

pub fn is_valid_format(key: &str) -> bool {
    is_long_format(key) || is_short_format(key) || is_simple_format(key)
}

fn is_long_format(key: &str) -> bool {
    let groups: Vec<&str> = key.split('-').collect();
    groups.len() == 4
        && groups.iter().all(|g| {
            g.len() == 4 && g.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        })
}

fn is_short_format(key: &str) -> bool {
    let groups: Vec<&str> = key.split('-').collect();
    let [first, second, suffix] = groups.as_slice() else {
        return false;
    };
    is_lower_word(first)
        && is_lower_word(second)
        && suffix.len() == 4
        && suffix.bytes().all(|b| b.is_ascii_digit())
}

fn is_simple_format(key: &str) -> bool {
    (4..=20).contains(&key.len()) && is_lower_word(key)
}

fn is_lower_word(word: &str) -> bool {
    !word.is_empty()
        && word
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Canonical form used for hashing and lookup
pub fn normalize(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

/// Masked identity of a key, independent of the case it was typed in
pub fn masked_identity(key: &str) -> String {
    mask_access_key(&normalize(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_format() {
        assert!(is_valid_format("TEST-1234-ABCD-5678"));
        assert!(!is_valid_format("TEST-1234-ABCD"));
        assert!(!is_valid_format("TEST-1234-ABCD-567"));
        assert!(!is_valid_format("TEST_1234_ABCD_5678"));
    }

    #[test]
    fn test_short_format() {
        assert!(is_valid_format("demo-key-2024"));
        assert!(is_valid_format("workshop-key-2024"));
        assert!(!is_valid_format("demo-key-24"));
        assert!(!is_valid_format("demo--2024"));
        assert!(!is_valid_format("Demo-Key-2024"));
    }

    #[test]
    fn test_simple_format() {
        assert!(is_valid_format("okaasan"));
        assert!(is_valid_format("abcd"));
        assert!(!is_valid_format("abc"));
        assert!(!is_valid_format("a".repeat(21).as_str()));
        assert!(!is_valid_format("has space"));
    }

    #[test]
    fn test_lowercase_long_key_is_rejected() {
        // only the upper-case form of the long shape is accepted
        assert!(!is_valid_format("test-1234-abcd-5678"));
    }

    #[test]
    fn test_masked_identity_ignores_case() {
        assert_eq!(masked_identity("TEST-1234-ABCD-5678"), masked_identity("test-1234-abcd-5678"));
        assert_eq!(masked_identity("demo-key-2024"), "demo********");
    }
}
