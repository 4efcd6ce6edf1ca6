use serde::{Deserialize, Serialize};

/// Lexical class of a single whitespace-separated token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypedValue {
    Integer,
    Float,
    NonNumeric,
}

impl TypedValue {
    /// Classifies `token`.
    ///
    /// A token is `Integer` when it reads as a whole number, `Float` when it
    /// reads as any other decimal number (scientific notation included), and
    /// `NonNumeric` otherwise.
    #[must_use]
    pub fn classify(token: &str) -> Self {
        if token.parse::<i64>().is_ok() {
            return Self::Integer;
        }
        if token.parse::<f64>().is_ok() {
            return Self::Float;
        }
        Self::NonNumeric
    }

    #[must_use]
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::NonNumeric)
    }
}

/// Parses a numeric token into `f64`.
///
/// Integers go through `i64` first so that large whole numbers keep their
/// exact nearest representation.
#[must_use]
pub fn parse_number(token: &str) -> Option<f64> {
    if let Ok(value) = token.parse::<i64>() {
        return Some(value as f64);
    }
    token.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::{TypedValue, parse_number};

    #[test]
    fn whole_numbers_are_integers() {
        assert_eq!(TypedValue::classify("12"), TypedValue::Integer);
        assert_eq!(TypedValue::classify("-40"), TypedValue::Integer);
        assert_eq!(TypedValue::classify("+3"), TypedValue::Integer);
    }

    #[test]
    fn decimal_and_scientific_tokens_are_floats() {
        assert_eq!(TypedValue::classify("12.0"), TypedValue::Float);
        assert_eq!(TypedValue::classify("1.234E+01"), TypedValue::Float);
        assert_eq!(TypedValue::classify("5e-3"), TypedValue::Float);
        assert_eq!(TypedValue::classify("NAN"), TypedValue::Float);
        assert_eq!(TypedValue::classify("-INF"), TypedValue::Float);
    }

    #[test]
    fn words_and_empty_tokens_are_non_numeric() {
        assert_eq!(TypedValue::classify("cube.fits"), TypedValue::NonNumeric);
        assert_eq!(TypedValue::classify(""), TypedValue::NonNumeric);
        assert_eq!(TypedValue::classify("1.2.3"), TypedValue::NonNumeric);
        assert!(!TypedValue::classify("'x'").is_numeric());
    }

    #[test]
    fn parse_number_handles_both_classes() {
        assert_eq!(parse_number("40"), Some(40.0));
        assert_eq!(parse_number("2.5E+01"), Some(25.0));
        assert_eq!(parse_number("abc"), None);
    }
}
