//! Input sanitization functions
//!
//! This module provides the normalizers that rule sets apply to raw field
//! values before and between validation checks. All of them are pure.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Pattern to match runs of whitespace characters
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Trim leading and trailing whitespace from a string
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Collapse every run of whitespace into a single space
pub fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value, " ").to_string()
}

/// Remove every whitespace character
pub fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn uppercase(value: &str) -> String {
    value.to_uppercase()
}

/// Insert a space after every complete group of `group_size` digits that is
/// directly followed by another digit.
///
/// Grouping restarts at every non-digit, so a value that is already grouped
/// comes back unchanged.
pub fn group_digits(value: &str, group_size: usize) -> String {
    if group_size == 0 {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + value.len() / group_size);
    let mut run = 0usize;
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if !c.is_ascii_digit() {
            run = 0;
            continue;
        }
        run += 1;
        let next_is_digit = chars.peek().map_or(false, |n| n.is_ascii_digit());
        if run == group_size && next_is_digit {
            out.push(' ');
            run = 0;
        }
    }

    out
}

/// A named normalizer that a field spec can list as a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    Trim,
    CollapseWhitespace,
    StripWhitespace,
    Uppercase,
    GroupDigits(usize),
}

impl Sanitizer {
    pub fn apply(&self, value: &str) -> String {
        match self {
            Sanitizer::Trim => trim(value),
            Sanitizer::CollapseWhitespace => collapse_whitespace(value),
            Sanitizer::StripWhitespace => strip_whitespace(value),
            Sanitizer::Uppercase => uppercase(value),
            Sanitizer::GroupDigits(size) => group_digits(value, *size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim() {
        assert_eq!(trim("  hello  "), "hello");
        assert_eq!(trim("\n\tspaces\t\n"), "spaces");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("Git    Graph"), "Git Graph");
        assert_eq!(collapse_whitespace("New\t\tDelhi,\n India"), "New Delhi, India");
        assert_eq!(collapse_whitespace("one\ttab"), "one tab");
        assert_eq!(collapse_whitespace("plain"), "plain");
    }

    #[test]
    fn test_collapse_whitespace_is_idempotent() {
        for sample in ["a  b", " \t lead", "trail \n\n", "", "x y z", "\u{a0}\u{a0}nbsp"] {
            let once = collapse_whitespace(sample);
            assert_eq!(collapse_whitespace(&once), once, "sample {:?}", sample);
        }
    }

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace("Java   Script"), "JavaScript");
        assert_eq!(strip_whitespace(" 1234 5678\t9012 "), "123456789012");
        assert_eq!(strip_whitespace(&strip_whitespace("a b")), "ab");
    }

    #[test]
    fn test_uppercase() {
        assert_eq!(uppercase("abc Def"), "ABC DEF");
    }

    #[test]
    fn test_group_digits_formats_national_id() {
        assert_eq!(group_digits("123456789012", 4), "1234 5678 9012");
        assert_eq!(group_digits("12345678", 4), "1234 5678");
        assert_eq!(group_digits("1234", 4), "1234");
        assert_eq!(group_digits("123", 4), "123");
        assert_eq!(group_digits("", 4), "");
    }

    #[test]
    fn test_group_digits_after_strip_is_stable() {
        let once = group_digits(&strip_whitespace("1234 5678 9012"), 4);
        assert_eq!(once, "1234 5678 9012");
        assert_eq!(group_digits(&once, 4), once);
    }

    #[test]
    fn test_group_digits_restarts_on_non_digits() {
        assert_eq!(group_digits("12345-123456", 4), "1234 5-1234 56");
        assert_eq!(group_digits("abc", 4), "abc");
        assert_eq!(group_digits("1234", 0), "1234");
    }

    #[test]
    fn test_sanitizer_apply() {
        assert_eq!(Sanitizer::Trim.apply("  x "), "x");
        assert_eq!(Sanitizer::Uppercase.apply("pan"), "PAN");
        assert_eq!(Sanitizer::GroupDigits(4).apply("12345678"), "1234 5678");
    }
}
