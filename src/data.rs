//! Scalar cell values and key normalization.
//!
//! Sources disagree on how they encode numbers, so cells are parsed by
//! inference: integer first, then float, then string. An empty cell is
//! absent, not an empty string.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
        }
    }

    /// Numeric view used by the aggregator; strings do not coerce.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Parses one raw CSV cell. Empty (after trimming) means absent, as do
/// the usual spreadsheet missing-value markers.
pub fn parse_scalar(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || matches!(trimmed, "NaN" | "nan" | "N/A" | "n/a" | "NA" | "null") {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(Value::Integer(parsed));
    }
    if let Ok(parsed) = trimmed.parse::<f64>() {
        return Some(Value::Float(parsed));
    }
    Some(Value::String(raw.to_string()))
}

/// Canonicalizes a raw country name into a comparable key: stringify and
/// trim surrounding whitespace. Deliberately no case folding — "USA" and
/// "usa" remain distinct keys, and sources must agree on casing for their
/// rows to align. Callers that mix casings get duplicate entries for the
/// same logical country rather than an error.
pub fn normalize_country(raw: &str) -> String {
    raw.trim().to_string()
}

/// Parses a year cell into an integer where possible. Sources occasionally
/// carry years as floats ("2020.0"); those round-trip through f64.
pub fn parse_year(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(parsed);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.fract() == 0.0)
        .map(|f| f as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scalar_prefers_integer_over_float() {
        assert_eq!(parse_scalar("42"), Some(Value::Integer(42)));
        assert_eq!(parse_scalar("42.5"), Some(Value::Float(42.5)));
        assert_eq!(
            parse_scalar("Korea, Rep."),
            Some(Value::String("Korea, Rep.".to_string()))
        );
    }

    #[test]
    fn parse_scalar_treats_blank_and_na_markers_as_absent() {
        assert_eq!(parse_scalar(""), None);
        assert_eq!(parse_scalar("   "), None);
        assert_eq!(parse_scalar("NaN"), None);
        assert_eq!(parse_scalar("N/A"), None);
    }

    #[test]
    fn normalize_country_trims_but_keeps_case() {
        assert_eq!(normalize_country("  United States "), "United States");
        assert_ne!(normalize_country("USA"), normalize_country("usa"));
    }

    #[test]
    fn parse_year_accepts_float_encoded_years() {
        assert_eq!(parse_year("2020"), Some(2020));
        assert_eq!(parse_year("2020.0"), Some(2020));
        assert_eq!(parse_year("2020.5"), None);
        assert_eq!(parse_year("n/a"), None);
    }

    #[test]
    fn float_display_drops_trailing_zero() {
        assert_eq!(Value::Float(50.0).as_display(), "50");
        assert_eq!(Value::Float(0.92).as_display(), "0.92");
    }
}
