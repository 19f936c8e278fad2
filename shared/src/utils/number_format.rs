//! Locale-aware number handling for cell values.
//!
//! Cells arrive as free-form text such as `R$ 1.234,56`, `(42)` or `1,234.5`.
//! [`parse_number`] turns them into `f64` under a [`Convention`],
//! [`decimal_count`] reports how many fractional digits the text carried, and
//! [`format_number`] renders a value back with a fixed number of fractional
//! digits for a [`DisplayLocale`].
//!
//! Parsing and decimal counting share one normalization step, so the
//! precision reported for a value always matches the value that was parsed.

use crate::models::{Convention, DisplayLocale};

/// Upper bound on fractional digits the formatter will render.
pub const MAX_FRACTION_DIGITS: usize = 20;

/// Digits of a normalized number, split at the decimal point.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NumberParts {
    integer: String,
    fraction: String,
    negative: bool,
}

/// Parses numeric cell text, returning `None` when it holds no usable digits.
///
/// Text is negative when it contains a `-` anywhere or both parentheses. Every
/// character other than ASCII digits, `.` and `,` is dropped before the
/// separators are resolved according to `convention`.
pub fn parse_number(text: &str, convention: Convention) -> Option<f64> {
    let parts = split_number(text, convention)?;
    let integer = if parts.integer.is_empty() { "0" } else { parts.integer.as_str() };
    let fraction = if parts.fraction.is_empty() { "0" } else { parts.fraction.as_str() };
    let magnitude = format!("{integer}.{fraction}").parse::<f64>().ok()?.abs();
    Some(if parts.negative { -magnitude } else { magnitude })
}

/// Number of fractional digits `text` encodes under `convention`.
///
/// `0` for unparseable text or when the value has no decimal part, including
/// auto-mode values where a single separator followed by three digits is read
/// as grouping (`1.234`).
pub fn decimal_count(text: &str, convention: Convention) -> usize {
    split_number(text, convention).map_or(0, |parts| parts.fraction.len())
}

/// Renders `value` with exactly `decimals` fractional digits in `locale`.
///
/// Non-finite values render as an empty string. Rounding is half away from
/// zero, applied to the shortest decimal representation of the value, so
/// `1.005` with two digits becomes `1.01`.
pub fn format_number(value: f64, decimals: usize, locale: DisplayLocale) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let decimals = decimals.min(MAX_FRACTION_DIGITS);

    // Display for f64 never switches to exponent notation.
    let shortest = value.abs().to_string();
    let (int_digits, frac_digits) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));
    let (integer, fraction) = round_half_up(int_digits, frac_digits, decimals);

    let mut out = String::with_capacity(integer.len() + decimals + 8);
    if value.is_sign_negative() {
        out.push('-');
    }
    out.push_str(&group_thousands(&integer, locale.grouping_separator()));
    if decimals > 0 {
        out.push(locale.decimal_separator());
        out.push_str(&fraction);
    }
    out
}

fn split_number(text: &str, convention: Convention) -> Option<NumberParts> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let negative = (trimmed.contains('(') && trimmed.contains(')')) || trimmed.contains('-');

    let stripped: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if stripped.is_empty() {
        return None;
    }

    let normalized = normalize_separators(&stripped, convention);
    let (integer, fraction) = leading_decimal(&normalized)?;
    Some(NumberParts {
        integer: integer.to_string(),
        fraction: fraction.to_string(),
        negative,
    })
}

/// Rewrites digits-and-separators text so that `.` is the only decimal mark.
fn normalize_separators(stripped: &str, convention: Convention) -> String {
    match convention {
        Convention::EnUs => stripped.replace(',', ""),
        Convention::PtBr => stripped.replace('.', "").replacen(',', ".", 1),
        Convention::Auto => match (stripped.rfind('.'), stripped.rfind(',')) {
            (Some(dot), Some(comma)) => {
                // Whichever separator appears last is the decimal mark.
                let (decimal, grouping) = if dot > comma { ('.', ',') } else { (',', '.') };
                stripped.replace(grouping, "").replacen(decimal, ".", 1)
            }
            (Some(_), None) => resolve_single_separator(stripped, '.'),
            (None, Some(_)) => resolve_single_separator(stripped, ','),
            (None, None) => stripped.to_string(),
        },
    }
}

fn resolve_single_separator(stripped: &str, separator: char) -> String {
    let parts: Vec<&str> = stripped.split(separator).collect();
    if parts.len() > 2 {
        return parts.concat();
    }
    let integer = parts[0];
    let fraction = parts.get(1).copied().unwrap_or("");
    match fraction.len() {
        0 => integer.to_string(),
        // Three trailing digits read as a thousands group.
        3 => format!("{integer}{fraction}"),
        _ => format!("{integer}.{fraction}"),
    }
}

/// Longest `digits[.digits]` prefix, or `None` when it has no digit at all.
fn leading_decimal(normalized: &str) -> Option<(&str, &str)> {
    let bytes = normalized.as_bytes();
    let int_end = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    let (fraction_start, fraction_end) = if bytes.get(int_end) == Some(&b'.') {
        let start = int_end + 1;
        let len = bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();
        (start, start + len)
    } else {
        (int_end, int_end)
    };

    if int_end == 0 && fraction_end == fraction_start {
        return None;
    }
    Some((&normalized[..int_end], &normalized[fraction_start..fraction_end]))
}

fn round_half_up(int_digits: &str, frac_digits: &str, decimals: usize) -> (String, String) {
    let mut digits: Vec<u8> = int_digits.bytes().collect();
    let mut fraction: Vec<u8> = frac_digits.bytes().take(decimals).collect();
    fraction.resize(decimals, b'0');
    digits.extend_from_slice(&fraction);

    let round_up = frac_digits
        .as_bytes()
        .get(decimals)
        .is_some_and(|d| *d >= b'5');
    if round_up {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - decimals;
    let integer = digits[..split].iter().map(|&b| b as char).collect();
    let fraction = digits[split..].iter().map(|&b| b as char).collect();
    (integer, fraction)
}

fn group_thousands(integer: &str, separator: char) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_explicit_conventions() {
        assert_eq!(parse_number("1.234,56", Convention::PtBr), Some(1234.56));
        assert_eq!(parse_number("1,234.56", Convention::EnUs), Some(1234.56));
        assert_eq!(parse_number("600.822.115,84", Convention::PtBr), Some(600822115.84));
        assert_eq!(parse_number("1.234", Convention::EnUs), Some(1.234));
        assert_eq!(parse_number("1.234", Convention::PtBr), Some(1234.0));
    }

    #[test]
    fn test_parse_negative_forms() {
        assert_eq!(parse_number("(42)", Convention::Auto), Some(-42.0));
        assert_eq!(parse_number("-42", Convention::Auto), Some(-42.0));
        assert_eq!(parse_number("-(5)", Convention::Auto), Some(-5.0));
        assert_eq!(parse_number("(1.234,56)", Convention::PtBr), Some(-1234.56));
        // Lone parenthesis is not enough
        assert_eq!(parse_number("(42", Convention::Auto), Some(42.0));
    }

    #[test]
    fn test_parse_auto_single_separator() {
        assert_eq!(parse_number("1.234", Convention::Auto), Some(1234.0));
        assert_eq!(parse_number("1.23", Convention::Auto), Some(1.23));
        assert_eq!(parse_number("12,5", Convention::Auto), Some(12.5));
        assert_eq!(parse_number("1,2345", Convention::Auto), Some(1.2345));
        assert_eq!(parse_number("1.234.567", Convention::Auto), Some(1234567.0));
        assert_eq!(parse_number("5.", Convention::Auto), Some(5.0));
    }

    #[test]
    fn test_parse_auto_both_separators() {
        assert_eq!(parse_number("1.234,56", Convention::Auto), Some(1234.56));
        assert_eq!(parse_number("1,234.56", Convention::Auto), Some(1234.56));
        assert_eq!(parse_number("R$ 1.234,56", Convention::Auto), Some(1234.56));
        assert_eq!(parse_number("$1,234,567.8", Convention::Auto), Some(1234567.8));
    }

    #[test]
    fn test_parse_takes_leading_number() {
        assert_eq!(parse_number("1.2.3", Convention::EnUs), Some(1.2));
        assert_eq!(parse_number("1,2,3", Convention::PtBr), Some(1.2));
        assert_eq!(parse_number(".5", Convention::EnUs), Some(0.5));
    }

    #[test]
    fn test_parse_unusable_text() {
        assert_eq!(parse_number("", Convention::Auto), None);
        assert_eq!(parse_number("   ", Convention::PtBr), None);
        assert_eq!(parse_number("abc", Convention::Auto), None);
        assert_eq!(parse_number(".", Convention::Auto), None);
        assert_eq!(parse_number(",", Convention::EnUs), None);
        assert_eq!(parse_number("-", Convention::Auto), None);
    }

    #[test]
    fn test_decimal_count() {
        assert_eq!(decimal_count("1.234,5", Convention::Auto), 1);
        assert_eq!(decimal_count("1.234", Convention::Auto), 0);
        assert_eq!(decimal_count("1.234", Convention::EnUs), 3);
        assert_eq!(decimal_count("1.50", Convention::EnUs), 2);
        assert_eq!(decimal_count("R$ 10,00", Convention::PtBr), 2);
        assert_eq!(decimal_count("1,2345", Convention::Auto), 4);
        assert_eq!(decimal_count("1.234.567", Convention::Auto), 0);
        assert_eq!(decimal_count("42", Convention::Auto), 0);
        assert_eq!(decimal_count("", Convention::Auto), 0);
        assert_eq!(decimal_count("n/a", Convention::PtBr), 0);
    }

    #[test]
    fn test_format_locales() {
        assert_eq!(format_number(1234.56, 2, DisplayLocale::PtBr), "1.234,56");
        assert_eq!(format_number(1234.5, 2, DisplayLocale::EnUs), "1,234.50");
        assert_eq!(format_number(1234567.0, 0, DisplayLocale::DeDe), "1.234.567");
        assert_eq!(format_number(12.0, 3, DisplayLocale::EnUs), "12.000");
        assert_eq!(format_number(-42.0, 0, DisplayLocale::PtBr), "-42");
        assert_eq!(format_number(0.5, 0, DisplayLocale::EnUs), "1");
    }

    #[test]
    fn test_format_rounds_half_away_from_zero() {
        assert_eq!(format_number(0.125, 2, DisplayLocale::EnUs), "0.13");
        assert_eq!(format_number(1.005, 2, DisplayLocale::EnUs), "1.01");
        assert_eq!(format_number(999.995, 2, DisplayLocale::EnUs), "1,000.00");
        assert_eq!(format_number(-2.5, 0, DisplayLocale::EnUs), "-3");
        assert_eq!(format_number(1.234, 2, DisplayLocale::PtBr), "1,23");
    }

    #[test]
    fn test_format_non_finite_is_empty() {
        assert_eq!(format_number(f64::NAN, 2, DisplayLocale::PtBr), "");
        assert_eq!(format_number(f64::INFINITY, 2, DisplayLocale::EnUs), "");
    }

    #[test]
    fn test_format_clamps_fraction_digits() {
        let formatted = format_number(1.5, 40, DisplayLocale::EnUs);
        let fraction = formatted.split_once('.').unwrap().1;
        assert_eq!(fraction.len(), MAX_FRACTION_DIGITS);
    }

    #[test]
    fn test_convert_keeps_source_precision() {
        let raw = "1,234.5";
        let value = parse_number(raw, Convention::Auto).unwrap();
        let decimals = decimal_count(raw, Convention::Auto);
        assert_eq!(format_number(value, decimals, DisplayLocale::PtBr), "1.234,5");
    }

    proptest! {
        #[test]
        fn prop_formatted_value_parses_back(value in -1.0e9f64..1.0e9, decimals in 0usize..=6) {
            for (locale, convention) in [
                (DisplayLocale::EnUs, Convention::EnUs),
                (DisplayLocale::PtBr, Convention::PtBr),
            ] {
                let text = format_number(value, decimals, locale);
                let parsed = parse_number(&text, convention).unwrap();
                let tolerance = 0.5 * 10f64.powi(-(decimals as i32)) + 1e-6;
                prop_assert!((parsed - value).abs() <= tolerance, "{} -> {} -> {}", value, text, parsed);
            }
        }
    }
}
