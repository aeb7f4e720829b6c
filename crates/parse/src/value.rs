use rust_decimal::Decimal;
use std::str::FromStr;
use zapfin_core::Money;

use crate::date::strip_dates;

re!(re_number_token, r"\d+(?:[.,]\d+)*");

/// A monetary value found in text, with the byte span it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueToken {
    pub value: Money,
    pub start: usize,
    pub end: usize,
    pub raw: String,
}

/// All monetary values in `text`, left to right.
pub fn parse_values(text: &str) -> Vec<Money> {
    find_values(text).into_iter().map(|t| t.value).collect()
}

/// First monetary value in `text`, if any.
pub fn first_value(text: &str) -> Option<Money> {
    find_values(text).into_iter().next().map(|t| t.value)
}

/// Values in `text` once date literals and "dia N" phrases are blanked out.
pub fn parse_values_outside_dates(text: &str) -> Vec<Money> {
    parse_values(&strip_dates(text))
}

pub fn find_values(text: &str) -> Vec<ValueToken> {
    re_number_token()
        .find_iter(text)
        .filter_map(|m| {
            let value = parse_token(m.as_str())?;
            Some(ValueToken {
                value,
                start: m.start(),
                end: m.end(),
                raw: m.as_str().to_string(),
            })
        })
        .collect()
}

/// Interpret one run of digits and `.`/`,` separators.
///
/// The glyph does not decide which separator is the decimal point; the size
/// of the last group does:
/// - 2 digits: decimal (`2.900,50`, `2,900.50`, `2,50`);
/// - 3 digits: thousands grouping (`2.900` is 2900, never 2.9);
/// - 1 digit: decimal (`12,5`);
/// - 4+ digits: decimal, rounded to cents.
///
/// Every separator before the last one is a thousands separator.
pub fn parse_token(raw: &str) -> Option<Money> {
    let Some(last_sep) = raw.rfind(['.', ',']) else {
        return Decimal::from_str(raw).ok().map(Money::from_decimal);
    };

    let (int_part, frac_part) = (&raw[..last_sep], &raw[last_sep + 1..]);
    let int_digits: String = int_part.chars().filter(char::is_ascii_digit).collect();

    let decimal = if frac_part.len() == 3 {
        Decimal::from_str(&format!("{int_digits}{frac_part}")).ok()?
    } else {
        Decimal::from_str(&format!("{int_digits}.{frac_part}")).ok()?
    };
    Some(Money::from_decimal(decimal))
}
