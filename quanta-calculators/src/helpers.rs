//! Common calculator utilities

use quanta_core::Value;
use quanta_plugin::{object, CalcInputs};

/// Divide, yielding NaN instead of infinity for a zero divisor so the
/// result renders as a placeholder
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// Round to a number of decimal places, for table and series values
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// A base value expressed in the unit the caller chose for `field`,
/// falling back to `default_unit`
pub fn in_chosen_unit(inputs: &CalcInputs, field: &str, dimension: &str, default_unit: &str, base: f64) -> (f64, String) {
    let unit = inputs.unit(field).unwrap_or(default_unit);
    match inputs.converter().from_base(base, unit, dimension) {
        Ok(value) => (value, unit.to_string()),
        Err(_) => (base, default_unit.to_string()),
    }
}

/// Base value of a quantity in a known unit, against the registry the
/// inputs were normalized with; used for fixed reference tables
pub fn base_of(inputs: &CalcInputs, value: f64, unit: &str, dimension: &str) -> f64 {
    inputs.converter().to_base(value, unit, dimension).unwrap_or(f64::NAN)
}

/// One chart point or table row
pub fn row(pairs: &[(&str, Value)]) -> Value {
    object(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quanta_units::{Dimension, UnitRegistry};

    #[test]
    fn test_ratio_by_zero() {
        assert!(ratio(1.0, 0.0).is_nan());
        assert_eq!(ratio(6.0, 3.0), 2.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.34567, 2), 2.35);
        assert_eq!(round_to(1234.5, 0), 1235.0);
    }

    #[test]
    fn test_in_chosen_unit() {
        let inputs = CalcInputs::new().with_quantity("weight", 70.0, "lbs");
        let (value, unit) = in_chosen_unit(&inputs, "weight", "weight", "kg", 70.0);
        assert_eq!(unit, "lbs");
        assert!((value - 154.3236).abs() < 1e-3);

        let (value, unit) = in_chosen_unit(&CalcInputs::new(), "weight", "weight", "kg", 70.0);
        assert_eq!((value, unit.as_str()), (70.0, "kg"));
    }

    #[test]
    fn test_base_of() {
        let inputs = CalcInputs::new();
        assert_eq!(base_of(&inputs, 100.0, "Mbps", "data_rate"), 1e8);
        assert!(base_of(&inputs, 1.0, "kg", "length").is_nan());
    }

    #[test]
    fn test_conversions_use_the_inputs_registry() {
        // a registry where a "mile" is exactly 1 km
        let custom = UnitRegistry::new().with_dimension(
            Dimension::new("length", "Length", "cm", "centimetre")
                .with_unit("km", "kilometre", 100_000.0)
                .with_unit("mi", "mile", 100_000.0),
        );
        let inputs = CalcInputs::using(&custom).with_quantity("distance", 200_000.0, "mi");
        assert_eq!(base_of(&inputs, 1.0, "mi", "length"), 100_000.0);

        let (value, unit) = in_chosen_unit(&inputs, "distance", "length", "km", 200_000.0);
        assert_eq!((value, unit.as_str()), (2.0, "mi"));
    }

    #[test]
    fn test_row() {
        let r = row(&[("week", Value::Number(1.0)), ("weight", Value::Number(69.5))]);
        assert_eq!(r.as_object().map(|o| o.len()), Some(2));
    }
}
