//! Field validators for input validation
//!
//! Pure predicates used by the rule-set checks. Each one answers a single
//! question about an already-sanitized value; the failure message lives on
//! the rule that uses it.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use shared::{MealType, VaccineType};

lazy_static! {
    /// First character must be an ASCII letter
    static ref LEADING_LETTER_REGEX: Regex = Regex::new(r"^[a-zA-Z]").unwrap();

    /// Calendar date: four-digit year, then month and day, split by '-' or '/'
    static ref DATE_REGEX: Regex =
        Regex::new(r"^(\d{4})([-/])(\d{1,2})([-/])(\d{1,2})$").unwrap();
}

/// Value is present and not the empty string.
///
/// Whitespace-only values count as present; rule sets that want them
/// rejected trim before this check.
pub fn is_present(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty())
}

/// Non-empty and made only of ASCII digits
pub fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Non-empty and made only of ASCII letters once every character in
/// `ignore` has been removed
pub fn is_alpha(value: &str, ignore: &str) -> bool {
    let mut letters = value.chars().filter(|c| !ignore.contains(*c)).peekable();
    letters.peek().is_some() && letters.all(|c| c.is_ascii_alphabetic())
}

/// Non-empty and made only of ASCII letters and digits
pub fn is_alphanumeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Character count within `[min, max]`
pub fn has_length(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

pub fn starts_with_letter(value: &str) -> bool {
    LEADING_LETTER_REGEX.is_match(value)
}

/// Parse `YYYY-MM-DD` or `YYYY/MM/DD` into a calendar date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let caps = DATE_REGEX.captures(value)?;
    if caps.get(2)?.as_str() != caps.get(4)?.as_str() {
        return None;
    }

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let month = caps.get(3)?.as_str().parse::<u32>().ok()?;
    let day = caps.get(5)?.as_str().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn is_date(value: &str) -> bool {
    parse_date(value).is_some()
}

/// Date strictly before `reference`; unparseable values fail
pub fn is_before(value: &str, reference: NaiveDate) -> bool {
    parse_date(value).map_or(false, |date| date < reference)
}

/// Date strictly after `reference`; unparseable values fail
pub fn is_after(value: &str, reference: NaiveDate) -> bool {
    parse_date(value).map_or(false, |date| date > reference)
}

pub fn is_vaccine_type(value: &str) -> bool {
    value.parse::<VaccineType>().is_ok()
}

pub fn is_meal_type(value: &str) -> bool {
    value.parse::<MealType>().is_ok()
}

/// Human form used in messages, e.g. `28th Feb, 2025`
pub fn describe_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{} {}", day, suffix, date.format("%b, %Y"))
}
