//! Quantity string parsing - text like "100 Mbps", "70kg", "5 ft 11 in" or 5'11"

use crate::convert::Magnitude;
use crate::unit::{CompositeValue, ConversionError};
use crate::units::{UnitRegistry, UNITS};

/// A parsed quantity: its magnitude and the canonical unit symbol, if the
/// text named one
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuantity {
    pub magnitude: Magnitude,
    pub unit: Option<String>,
}

/// Parse a quantity within a dimension using the global registry
pub fn parse_quantity(text: &str, dimension: &str) -> Result<ParsedQuantity, ConversionError> {
    parse_quantity_in(&UNITS, text, dimension)
}

/// Parse a quantity within a dimension of the given registry.
///
/// Supported formats:
/// - Bare number: "70"
/// - Number and unit: "70kg", "100 Mbps", "12.5 MB/s"
/// - Two components of a composite unit: "5 ft 11 in"
/// - Foot/inch marks: 5'11", 5' 11", 6'
pub fn parse_quantity_in(registry: &UnitRegistry, text: &str, dimension: &str) -> Result<ParsedQuantity, ConversionError> {
    let dim = registry.dimension(dimension)?;
    let s = text.trim();
    if s.is_empty() {
        return Err(ConversionError::Parse("empty quantity".to_string()));
    }

    if s.contains('\'') {
        return parse_feet_inches(registry, s, dimension);
    }

    let parts = split_parts(s)?;
    match parts.as_slice() {
        [(n, None)] => Ok(ParsedQuantity { magnitude: Magnitude::Scalar(*n), unit: None }),
        [(n, Some(u))] => {
            let symbol = dim.resolve(u).ok_or_else(|| unknown(u, dimension))?;
            Ok(ParsedQuantity {
                magnitude: Magnitude::Scalar(*n),
                unit: Some(symbol.to_string()),
            })
        }
        [(major, Some(u1)), (minor, Some(u2))] => {
            let major_unit = dim.resolve(u1).ok_or_else(|| unknown(u1, dimension))?;
            let minor_unit = dim.resolve(u2).ok_or_else(|| unknown(u2, dimension))?;
            let composite = dim
                .composites()
                .find(|c| c.major == major_unit && c.minor == minor_unit)
                .ok_or_else(|| {
                    ConversionError::Parse(format!("no composite unit of {} and {}", major_unit, minor_unit))
                })?;
            Ok(ParsedQuantity {
                magnitude: Magnitude::Composite(CompositeValue::new(*major, *minor)),
                unit: Some(composite.symbol.clone()),
            })
        }
        _ => Err(ConversionError::Parse(format!("unrecognized quantity '{}'", s))),
    }
}

/// Parse `5'11"` style notation against the dimension's feet/inches composite
fn parse_feet_inches(registry: &UnitRegistry, s: &str, dimension: &str) -> Result<ParsedQuantity, ConversionError> {
    let dim = registry.dimension(dimension)?;
    let composite = dim
        .composites()
        .find(|c| c.major == "ft" && c.minor == "in")
        .ok_or_else(|| ConversionError::Parse(format!("'{}' has no feet/inches unit", dimension)))?;

    let (major_text, rest) = s
        .split_once('\'')
        .ok_or_else(|| ConversionError::Parse(s.to_string()))?;
    let minor_text = rest.trim().trim_end_matches('"').trim();

    let major = parse_number(major_text.trim())?;
    let minor = if minor_text.is_empty() { 0.0 } else { parse_number(minor_text)? };

    Ok(ParsedQuantity {
        magnitude: Magnitude::Composite(CompositeValue::new(major, minor)),
        unit: Some(composite.symbol.clone()),
    })
}

/// Split text into (number, optional unit) pairs
fn split_parts(s: &str) -> Result<Vec<(f64, Option<String>)>, ConversionError> {
    let mut parts = Vec::new();
    let mut rest = s.trim_start();

    while !rest.is_empty() {
        let num_len = number_prefix_len(rest);
        if num_len == 0 {
            return Err(ConversionError::Parse(format!("expected a number at '{}'", rest)));
        }
        let value = parse_number(&rest[..num_len])?;
        rest = rest[num_len..].trim_start();

        let unit_len = rest
            .find(|c: char| c.is_whitespace() || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = if unit_len > 0 { Some(rest[..unit_len].to_string()) } else { None };
        rest = rest[unit_len..].trim_start();

        parts.push((value, unit));
    }

    Ok(parts)
}

/// Length of the leading numeric literal: sign, digits, one decimal point
/// and an optional exponent (`1.5e3`, `2E-4`). An `e` not followed by
/// digits belongs to the unit.
fn number_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut len = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    while len < bytes.len() {
        match bytes[len] {
            b'-' | b'+' if len == 0 => {}
            b'.' if !seen_dot => seen_dot = true,
            b if b.is_ascii_digit() => seen_digit = true,
            _ => break,
        }
        len += 1;
    }
    if !seen_digit {
        return 0;
    }

    if matches!(bytes.get(len), Some(b'e' | b'E')) {
        let mut end = len + 1;
        if matches!(bytes.get(end), Some(b'-' | b'+')) {
            end += 1;
        }
        let digits = bytes[end.min(bytes.len())..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digits > 0 {
            len = end + digits;
        }
    }
    len
}

fn parse_number(s: &str) -> Result<f64, ConversionError> {
    s.parse::<f64>()
        .map_err(|_| ConversionError::Parse(format!("invalid number '{}'", s)))
}

fn unknown(unit: &str, dimension: &str) -> ConversionError {
    ConversionError::UnknownUnit {
        unit: unit.to_string(),
        dimension: dimension.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_space() {
        let q = parse_quantity("100 Mbps", "data_rate").unwrap();
        assert_eq!(q.magnitude, Magnitude::Scalar(100.0));
        assert_eq!(q.unit.as_deref(), Some("Mbps"));
    }

    #[test]
    fn test_parse_attached_unit() {
        let q = parse_quantity("70kg", "weight").unwrap();
        assert_eq!(q.magnitude, Magnitude::Scalar(70.0));
        assert_eq!(q.unit.as_deref(), Some("kg"));
    }

    #[test]
    fn test_parse_alias_with_slash() {
        let q = parse_quantity("12.5 MB/s", "data_rate").unwrap();
        assert_eq!(q.unit.as_deref(), Some("MBps"));
    }

    #[test]
    fn test_parse_bare_number() {
        let q = parse_quantity("  -3.5 ", "weight").unwrap();
        assert_eq!(q.magnitude, Magnitude::Scalar(-3.5));
        assert_eq!(q.unit, None);
    }

    #[test]
    fn test_parse_exponent() {
        let q = parse_quantity("1.5e3 g", "weight").unwrap();
        assert_eq!(q.magnitude, Magnitude::Scalar(1500.0));
        assert_eq!(q.unit.as_deref(), Some("g"));

        let q = parse_quantity("2E-3kg", "weight").unwrap();
        assert_eq!(q.magnitude, Magnitude::Scalar(0.002));
        assert_eq!(q.unit.as_deref(), Some("kg"));

        let q = parse_quantity("4.7e+9", "data_volume").unwrap();
        assert_eq!(q.magnitude, Magnitude::Scalar(4.7e9));
        assert_eq!(q.unit, None);
    }

    #[test]
    fn test_exponent_needs_digits() {
        assert_eq!(number_prefix_len("3e"), 1);
        assert_eq!(number_prefix_len("3e-x"), 1);
        assert_eq!(number_prefix_len("-2.5e10 B"), 7);
    }

    #[test]
    fn test_parse_composite_words() {
        let q = parse_quantity("5 ft 11 in", "length").unwrap();
        assert_eq!(q.magnitude, Magnitude::Composite(CompositeValue::new(5.0, 11.0)));
        assert_eq!(q.unit.as_deref(), Some("ft_in"));
    }

    #[test]
    fn test_parse_feet_marks() {
        let q = parse_quantity("5'11\"", "length").unwrap();
        assert_eq!(q.magnitude, Magnitude::Composite(CompositeValue::new(5.0, 11.0)));

        let q = parse_quantity("6'", "length").unwrap();
        assert_eq!(q.magnitude, Magnitude::Composite(CompositeValue::new(6.0, 0.0)));
    }

    #[test]
    fn test_parse_wrong_dimension_unit() {
        assert!(matches!(
            parse_quantity("70 kg", "length"),
            Err(ConversionError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_quantity("kg 70", "weight"), Err(ConversionError::Parse(_))));
        assert!(matches!(parse_quantity("", "weight"), Err(ConversionError::Parse(_))));
        assert!(matches!(parse_quantity("1 2 3", "weight"), Err(ConversionError::Parse(_))));
    }

    #[test]
    fn test_parse_feet_marks_outside_length() {
        assert!(matches!(parse_quantity("5'11\"", "weight"), Err(ConversionError::Parse(_))));
    }
}
