use std::sync::LazyLock;

use fancy_regex::Regex;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Loose shape check for a contact-form address: something, `@`, something,
/// a dot, something, with no whitespace and a single `@`.
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .and_then(|pattern| pattern.is_match(email).ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(validate_email("hello@example.com"));
        assert!(validate_email("first.last+tag@mail.example.co.uk"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for input in [
            "",
            "plain",
            "@example.com",
            "user@",
            "user@example",
            "user name@example.com",
            "user@@example.com",
            "user@exa mple.com",
        ] {
            assert!(!validate_email(input), "{input:?} should be rejected");
        }
    }
}
