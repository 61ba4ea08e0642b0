use regex::Regex;
use std::sync::OnceLock;

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9]+$").expect("phone pattern is valid"))
}

/// Canonical lookup key for a phone number.
///
/// Formatting characters are removed and the international prefix (`+` or
/// `00`) is dropped, leaving the bare digit string. Input that is not a
/// phone number after cleanup is returned trimmed but otherwise untouched.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')' | '/'))
        .collect();

    if !phone_pattern().is_match(&cleaned) {
        return trimmed.to_string();
    }

    if let Some(rest) = cleaned.strip_prefix('+') {
        return rest.to_string();
    }
    if let Some(rest) = cleaned.strip_prefix("00") {
        if !rest.is_empty() {
            return rest.to_string();
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_is_ignored() {
        assert_eq!(normalize_phone("3331234567"), "3331234567");
        assert_eq!(normalize_phone(" 333 123 4567 "), "3331234567");
        assert_eq!(normalize_phone("333-123-4567"), "3331234567");
        assert_eq!(normalize_phone("(333) 123.4567"), "3331234567");
    }

    #[test]
    fn test_international_prefixes_share_a_key() {
        assert_eq!(normalize_phone("+39 333 123 4567"), "393331234567");
        assert_eq!(normalize_phone("0039 333 123 4567"), "393331234567");
        assert_eq!(normalize_phone("393331234567"), "393331234567");
    }

    #[test]
    fn test_non_phone_input_is_kept() {
        assert_eq!(normalize_phone(" abc-123 "), "abc-123");
        assert_eq!(normalize_phone("33+3"), "33+3");
        assert_eq!(normalize_phone("00"), "00");
        assert_eq!(normalize_phone(""), "");
    }
}
