//! Unit representation with conversion factors

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use quanta_core::QuantaError;

/// A simple unit: one multiplicative factor to its dimension's base unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// The unit symbol (e.g., "kg", "Mbps")
    pub symbol: String,
    /// The unit name (e.g., "kilogram")
    pub name: String,
    /// Id of the owning dimension
    pub dimension: String,
    /// value_base = value * factor
    pub factor: f64,
}

impl Unit {
    pub fn new(symbol: &str, name: &str, dimension: &str, factor: f64) -> Self {
        Unit {
            symbol: symbol.to_string(),
            name: name.to_string(),
            dimension: dimension.to_string(),
            factor,
        }
    }

    /// Check if this is the base unit of its dimension
    pub fn is_base(&self) -> bool {
        self.factor == 1.0
    }

    /// Convert a value from this unit to the base unit
    pub fn to_base(&self, value: f64) -> f64 {
        value * self.factor
    }

    /// Convert a value from the base unit to this unit
    pub fn from_base(&self, value: f64) -> f64 {
        value / self.factor
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Two components of a composite quantity, e.g. 5 ft 11 in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeValue {
    pub major: f64,
    pub minor: f64,
}

impl CompositeValue {
    pub fn new(major: f64, minor: f64) -> Self {
        CompositeValue { major, minor }
    }
}

/// A unit expressed as a major and a minor component (feet + inches).
///
/// Never converted through the factor path: the components are converted
/// independently and recombined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeUnit {
    pub symbol: String,
    pub name: String,
    pub dimension: String,
    /// Symbol of the major component unit
    pub major: String,
    /// Symbol of the minor component unit
    pub minor: String,
    pub major_factor: f64,
    pub minor_factor: f64,
}

/// Minor remainders closer than this to a whole number are snapped to it
const SNAP_EPSILON: f64 = 1e-9;

impl CompositeUnit {
    pub fn new(symbol: &str, name: &str, major: &Unit, minor: &Unit) -> Self {
        CompositeUnit {
            symbol: symbol.to_string(),
            name: name.to_string(),
            dimension: major.dimension.clone(),
            major: major.symbol.clone(),
            minor: minor.symbol.clone(),
            major_factor: major.factor,
            minor_factor: minor.factor,
        }
    }

    /// Minor units per major unit (12 for feet/inches)
    pub fn ratio(&self) -> f64 {
        self.major_factor / self.minor_factor
    }

    pub fn to_base(&self, value: CompositeValue) -> f64 {
        value.major * self.major_factor + value.minor * self.minor_factor
    }

    /// Decompose a base value into the canonical split: whole major units
    /// and a minor remainder in `[0, ratio)`. The sign is carried by both
    /// components.
    pub fn from_base(&self, base: f64) -> CompositeValue {
        if !base.is_finite() {
            return CompositeValue::new(base, 0.0);
        }

        let sign = if base < 0.0 { -1.0 } else { 1.0 };
        let ratio = self.ratio();
        let total_minor = base.abs() / self.minor_factor;

        let mut major = (total_minor / ratio).floor();
        let mut minor = total_minor - major * ratio;

        if (minor - minor.round()).abs() < SNAP_EPSILON {
            minor = minor.round();
        }
        if minor >= ratio - SNAP_EPSILON {
            major += 1.0;
            minor = (minor - ratio).max(0.0);
        }
        if minor.abs() < SNAP_EPSILON {
            minor = 0.0;
        }

        CompositeValue::new(sign * major, sign * minor)
    }
}

/// Errors that can occur during unit conversion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("unknown unit '{unit}' in dimension '{dimension}'")]
    UnknownUnit { unit: String, dimension: String },

    #[error("unit '{0}' is composite and needs a two-part value")]
    CompositeRequired(String),

    #[error("unit '{0}' is not composite")]
    NotComposite(String),

    #[error("cannot parse quantity: {0}")]
    Parse(String),

    #[error("invalid unit table: {0}")]
    InvalidTable(String),
}

impl From<ConversionError> for QuantaError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::UnknownDimension(d) => QuantaError::unknown_dimension(&d),
            ConversionError::UnknownUnit { unit, dimension } => {
                QuantaError::unknown_unit(&unit, &dimension)
            }
            ConversionError::Parse(s) => QuantaError::parse_error(s),
            ConversionError::InvalidTable(s) => QuantaError::invalid_config("units", s),
            other => QuantaError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foot() -> Unit {
        Unit::new("ft", "foot", "length", 30.48)
    }

    fn inch() -> Unit {
        Unit::new("in", "inch", "length", 2.54)
    }

    fn feet_inches() -> CompositeUnit {
        CompositeUnit::new("ft_in", "feet and inches", &foot(), &inch())
    }

    #[test]
    fn test_base_unit() {
        assert!(Unit::new("cm", "centimeter", "length", 1.0).is_base());
        assert!(!foot().is_base());
    }

    #[test]
    fn test_simple_roundtrip() {
        let ft = foot();
        let base = ft.to_base(6.0);
        assert!((base - 182.88).abs() < 1e-9);
        assert!((ft.from_base(base) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_composite_ratio() {
        assert!((feet_inches().ratio() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_composite_to_base() {
        let base = feet_inches().to_base(CompositeValue::new(5.0, 11.0));
        assert!((base - 180.34).abs() < 1e-9);
    }

    #[test]
    fn test_composite_normalizes_overflowing_minor() {
        let unit = feet_inches();
        let base = unit.to_base(CompositeValue::new(5.0, 13.0));
        let canonical = unit.from_base(base);
        assert_eq!(canonical.major, 6.0);
        assert!((canonical.minor - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_composite_exact_feet() {
        let canonical = feet_inches().from_base(182.88);
        assert_eq!(canonical, CompositeValue::new(6.0, 0.0));
    }

    #[test]
    fn test_composite_negative() {
        let unit = feet_inches();
        let canonical = unit.from_base(-unit.to_base(CompositeValue::new(1.0, 6.0)));
        assert_eq!(canonical.major, -1.0);
        assert!((canonical.minor + 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_composite_non_finite_passes_through() {
        let canonical = feet_inches().from_base(f64::NAN);
        assert!(canonical.major.is_nan());
    }

    #[test]
    fn test_error_maps_to_quanta_codes() {
        let err: QuantaError = ConversionError::UnknownUnit {
            unit: "kg".into(),
            dimension: "length".into(),
        }
        .into();
        assert_eq!(err.code, quanta_core::codes::UNKNOWN_UNIT);
    }
}
