//! Conversion between units of one dimension
//!
//! Every conversion goes through the dimension's base unit:
//! `value_base = value * factor` and back with `value / factor`.
//! Composite units decompose and recombine their two components instead.

use serde::{Serialize, Deserialize};
use quanta_core::Value;
use crate::unit::{CompositeValue, ConversionError};
use crate::units::{UnitRegistry, UNITS};

/// A magnitude as submitted for a unit: a plain number, or two components
/// for composite units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Magnitude {
    Scalar(f64),
    Composite(CompositeValue),
}

impl Magnitude {
    /// Read a magnitude from a raw value: numbers become scalars,
    /// two-number lists (`[5, 11]`) become composites
    pub fn from_value(value: &Value) -> Option<Magnitude> {
        if let Some(n) = value.as_number() {
            return Some(Magnitude::Scalar(n));
        }
        value
            .as_pair()
            .map(|(major, minor)| Magnitude::Composite(CompositeValue::new(major, minor)))
    }

    pub fn to_value(self) -> Value {
        match self {
            Magnitude::Scalar(n) => Value::Number(n),
            Magnitude::Composite(c) => Value::List(vec![Value::Number(c.major), Value::Number(c.minor)]),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Magnitude::Scalar(n) => Some(*n),
            Magnitude::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<CompositeValue> {
        match self {
            Magnitude::Composite(c) => Some(*c),
            Magnitude::Scalar(_) => None,
        }
    }
}

impl From<f64> for Magnitude {
    fn from(n: f64) -> Self {
        Magnitude::Scalar(n)
    }
}

impl From<CompositeValue> for Magnitude {
    fn from(c: CompositeValue) -> Self {
        Magnitude::Composite(c)
    }
}

/// Converts values against one registry
#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    registry: &'a UnitRegistry,
}

impl Default for Converter<'static> {
    fn default() -> Self {
        Converter::new(&UNITS)
    }
}

impl<'a> Converter<'a> {
    pub fn new(registry: &'a UnitRegistry) -> Self {
        Converter { registry }
    }

    pub fn registry(&self) -> &'a UnitRegistry {
        self.registry
    }

    /// Convert a simple-unit value to the dimension's base unit
    pub fn to_base(&self, value: f64, unit: &str, dimension: &str) -> Result<f64, ConversionError> {
        Ok(self.registry.unit(unit, dimension)?.to_base(value))
    }

    /// Convert a base value to a simple unit
    pub fn from_base(&self, value: f64, unit: &str, dimension: &str) -> Result<f64, ConversionError> {
        Ok(self.registry.unit(unit, dimension)?.from_base(value))
    }

    /// Convert between two simple units of the same dimension
    pub fn convert(&self, value: f64, from: &str, to: &str, dimension: &str) -> Result<f64, ConversionError> {
        let from_unit = self.registry.unit(from, dimension)?;
        let to_unit = self.registry.unit(to, dimension)?;
        if from_unit.symbol == to_unit.symbol {
            return Ok(value);
        }
        Ok(to_unit.from_base(from_unit.to_base(value)))
    }

    pub fn composite_to_base(&self, value: CompositeValue, unit: &str, dimension: &str) -> Result<f64, ConversionError> {
        Ok(self.registry.composite(unit, dimension)?.to_base(value))
    }

    /// Canonical split of a base value: whole major units plus a minor
    /// remainder below one major unit
    pub fn composite_from_base(&self, value: f64, unit: &str, dimension: &str) -> Result<CompositeValue, ConversionError> {
        Ok(self.registry.composite(unit, dimension)?.from_base(value))
    }

    /// Convert any magnitude to base, picking the composite path when the
    /// unit requires it.
    ///
    /// A scalar submitted for a composite unit is read as whole major units.
    pub fn magnitude_to_base(&self, magnitude: Magnitude, unit: &str, dimension: &str) -> Result<f64, ConversionError> {
        if self.registry.is_composite(unit, dimension) {
            let value = match magnitude {
                Magnitude::Composite(c) => c,
                Magnitude::Scalar(n) => CompositeValue::new(n, 0.0),
            };
            return self.composite_to_base(value, unit, dimension);
        }
        match magnitude {
            Magnitude::Scalar(n) => self.to_base(n, unit, dimension),
            Magnitude::Composite(_) => Err(ConversionError::NotComposite(unit.to_string())),
        }
    }

    pub fn magnitude_from_base(&self, value: f64, unit: &str, dimension: &str) -> Result<Magnitude, ConversionError> {
        if self.registry.is_composite(unit, dimension) {
            return self.composite_from_base(value, unit, dimension).map(Magnitude::Composite);
        }
        self.from_base(value, unit, dimension).map(Magnitude::Scalar)
    }
}

/// Convert to base with the global registry
pub fn to_base(value: f64, unit: &str, dimension: &str) -> Result<f64, ConversionError> {
    Converter::default().to_base(value, unit, dimension)
}

/// Convert from base with the global registry
pub fn from_base(value: f64, unit: &str, dimension: &str) -> Result<f64, ConversionError> {
    Converter::default().from_base(value, unit, dimension)
}

/// Convert between units with the global registry
pub fn convert(value: f64, from: &str, to: &str, dimension: &str) -> Result<f64, ConversionError> {
    Converter::default().convert(value, from, to, dimension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_kg_to_lbs() {
        let lbs = convert(70.0, "kg", "lbs", "weight").unwrap();
        assert!(approx(lbs, 154.32, 0.01), "got {}", lbs);
    }

    #[test]
    fn test_mbps_to_base() {
        assert_eq!(to_base(100.0, "Mbps", "data_rate").unwrap(), 1.0e8);
        assert_eq!(to_base(1.0, "MB/s", "data_rate").unwrap(), 8.0e6);
    }

    #[test]
    fn test_decimal_and_binary_volumes_differ() {
        let gb = to_base(1.0, "GB", "data_volume").unwrap();
        let gib = to_base(1.0, "GiB", "data_volume").unwrap();
        assert_eq!(gb, 8.0e9);
        assert_eq!(gib, 8.0 * 1024.0 * 1024.0 * 1024.0);
    }

    #[test]
    fn test_roundtrip_every_unit() {
        let conv = Converter::default();
        for dim in UNITS.dimensions() {
            for unit in UNITS.dimension(dim).unwrap().units() {
                let base = conv.to_base(42.5, &unit.symbol, dim).unwrap();
                let back = conv.from_base(base, &unit.symbol, dim).unwrap();
                assert!(approx(back, 42.5, 1e-9 * 42.5), "{} in {}", unit.symbol, dim);
            }
        }
    }

    #[test]
    fn test_cross_dimension_rejected() {
        assert!(matches!(
            convert(1.0, "kg", "cm", "weight"),
            Err(ConversionError::UnknownUnit { .. })
        ));
        assert!(matches!(
            to_base(1.0, "kg", "nope"),
            Err(ConversionError::UnknownDimension(_))
        ));
    }

    #[test]
    fn test_composite_magnitude() {
        let conv = Converter::default();
        let base = conv
            .magnitude_to_base(CompositeValue::new(5.0, 11.0).into(), "ft_in", "length")
            .unwrap();
        assert!(approx(base, 180.34, 1e-9));

        let back = conv.magnitude_from_base(base, "ft_in", "length").unwrap();
        let split = back.as_composite().unwrap();
        assert_eq!(split.major, 5.0);
        assert!(approx(split.minor, 11.0, 1e-9));
    }

    #[test]
    fn test_scalar_for_composite_is_major_units() {
        let conv = Converter::default();
        let base = conv.magnitude_to_base(6.0.into(), "ft_in", "length").unwrap();
        assert!(approx(base, 182.88, 1e-9));
    }

    #[test]
    fn test_composite_for_simple_rejected() {
        let conv = Converter::default();
        assert_eq!(
            conv.magnitude_to_base(CompositeValue::new(5.0, 11.0).into(), "cm", "length"),
            Err(ConversionError::NotComposite("cm".into()))
        );
    }

    #[test]
    fn test_magnitude_from_value() {
        assert_eq!(Magnitude::from_value(&Value::Number(3.0)), Some(Magnitude::Scalar(3.0)));
        let pair = Value::List(vec![Value::Number(5.0), Value::Number(11.0)]);
        assert_eq!(
            Magnitude::from_value(&pair),
            Some(Magnitude::Composite(CompositeValue::new(5.0, 11.0)))
        );
        assert_eq!(Magnitude::from_value(&Value::Text("x".into())), None);
    }

    #[test]
    fn test_custom_registry_isolated_from_global() {
        let reg = UnitRegistry::new().with_dimension(
            crate::Dimension::new("volume", "Volume", "ml", "milliliter").with_unit("l", "liter", 1000.0),
        );
        let conv = Converter::new(&reg);
        assert_eq!(conv.to_base(2.0, "l", "volume").unwrap(), 2000.0);
        assert!(conv.to_base(1.0, "kg", "weight").is_err());
    }
}
