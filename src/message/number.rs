use rust_decimal::Decimal;

use crate::calculation::{DOLLAR_DECIMALS, PESO_DECIMALS, ROUNDING};

/// 無報價 sin cotización
pub const NO_QUOTE: &str = "S/C";

const THOUSANDS_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';

/// Formats an amount the Argentine way: `unit` prefix, period as thousands
/// separator, comma as decimal separator and exactly `decimals` digits.
///
/// A missing value renders as [`NO_QUOTE`].
///
/// # Example
///
/// ```ignore
/// assert_eq!(format_amount(Some(dec!(1234567.891)), "$", 2), "$1.234.567,89");
/// ```
pub fn format_amount(value: Option<Decimal>, unit: &str, decimals: u32) -> String {
    let Some(value) = value else {
        return NO_QUOTE.to_string();
    };

    let mut rounded = value.round_dp_with_strategy(decimals, ROUNDING);
    rounded.rescale(decimals);

    let digits = rounded.abs().to_string();
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(unit.len() + digits.len() + digits.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(unit);
    out.push_str(&group_thousands(integer));
    if let Some(fraction) = fraction {
        out.push(DECIMAL_SEPARATOR);
        out.push_str(fraction);
    }

    out
}

/// 披索，無小數，例如 $281.300
pub fn format_peso(value: Option<Decimal>) -> String {
    format_amount(value, "$", PESO_DECIMALS)
}

/// 美元，兩位小數，例如 USD403,50
pub fn format_usd(value: Option<Decimal>) -> String {
    format_amount(value, "USD", DOLLAR_DECIMALS)
}

/// 匯率（每一美元的披索），兩位小數，例如 $1.465,50
pub fn format_rate(value: Option<Decimal>) -> String {
    format_amount(value, "$", DOLLAR_DECIMALS)
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(c);
    }

    grouped
}
