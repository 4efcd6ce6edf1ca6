//! Fractional-digit analysis and the scientific notation used on save.

/// Returns the largest number of fractional digits found in `tokens`.
///
/// The exponent part (`E`/`e` and everything after it) is ignored, so
/// `"2.50E+03"` counts two digits. Tokens without a fractional part do not
/// contribute; the result is `0` when no token has one.
#[must_use]
pub fn max_fractional_digits<S: AsRef<str>>(tokens: &[S]) -> usize {
    tokens
        .iter()
        .filter_map(|token| fractional_digits(token.as_ref()))
        .max()
        .unwrap_or(0)
}

fn fractional_digits(token: &str) -> Option<usize> {
    let mantissa = token.split(['E', 'e']).next().unwrap_or_default();
    let (_, fraction) = mantissa.split_once('.')?;
    if fraction.contains('.') {
        return None;
    }
    Some(fraction.len())
}

/// Formats `value` in upper-case scientific notation with `precision`
/// fractional mantissa digits and a signed, at least two-digit exponent.
///
/// `format_scientific(12.34, 3)` yields `"1.234E+01"`.
#[must_use]
pub fn format_scientific(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "NAN".to_owned();
    }
    if value.is_infinite() {
        return if value.is_sign_positive() {
            "INF".to_owned()
        } else {
            "-INF".to_owned()
        };
    }

    let raw = format!("{value:.precision$E}");
    let Some((mantissa, exponent)) = raw.split_once('E') else {
        return raw;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}E{sign}{:02}", exponent.unsigned_abs())
}
