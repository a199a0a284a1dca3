use std::{collections::HashSet, str::FromStr};

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

/// 數字文字中要先移除的字元：幣別符號、空白、不斷行空白、引號與換行
const NUMBER_ESCAPE_CHAR: &[char] = &['$', ' ', '\u{a0}', '\u{202f}', '"', '\n', '\r', '\t'];

/// 拉丁美洲格式：千分位用 '.'，小數點用 ','，例如 281.300,00
static LATIN_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(\d{1,3}(\.\d{3})+|\d+)(,\d+)?$").expect("latin number pattern")
});

/// Parses a decimal value written with a dot as decimal separator.
///
/// Characters in `NUMBER_ESCAPE_CHAR` plus the optional `escape_chars` are
/// removed before parsing.
///
/// # Example
///
/// ```ignore
/// let d = parse_decimal("1023.25", None)?;
/// ```
pub fn parse_decimal(s: &str, escape_chars: Option<Vec<char>>) -> Result<Decimal> {
    let cleaned = clean_escape_chars(s, escape_chars);
    Decimal::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as Decimal because {:?}", cleaned, why))
}

/// Parses a Latin-American formatted amount such as `"$ 281.300,00"` into `281300.00`.
///
/// The currency symbol and any kind of space are dropped, the period is
/// treated as thousands separator and the comma as decimal separator.
/// Text with a malformed grouping (`"28.13.00"`) or without digits (`"S/C"`) is rejected.
pub fn parse_latin_decimal(s: &str) -> Result<Decimal> {
    let cleaned = clean_escape_chars(s, None);

    if !LATIN_NUMBER.is_match(&cleaned) {
        return Err(anyhow!("'{}' is not a latin formatted number", s.trim()));
    }

    let normalized = cleaned.replace('.', "").replace(',', ".");
    Decimal::from_str(&normalized)
        .map_err(|why| anyhow!("Failed to parse '{}' as Decimal because {:?}", normalized, why))
}

/// Removes a set of escape characters from a given string.
///
/// # Example
///
/// ```ignore
/// let clean_s = clean_escape_chars("$ 1.234", Some(vec!['.']));
/// assert_eq!(clean_s, "1234");
/// ```
pub(crate) fn clean_escape_chars(s: &str, escape_chars: Option<Vec<char>>) -> String {
    let mut combined: Vec<char> = NUMBER_ESCAPE_CHAR.to_vec();
    if let Some(ec) = escape_chars {
        combined.extend(ec);
    }

    let filters = combined.iter().collect::<HashSet<_>>();
    s.chars().filter(|c| !filters.contains(c)).collect()
}

/// 首字大寫，其餘不變
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
