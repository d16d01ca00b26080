//! Validation of raw submissions against field descriptors
//!
//! Fields are resolved in declaration order. Each visible field ends up
//! either in the normalized `FieldValues` or as an issue; every issue is
//! collected before failing so the caller sees the whole picture.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::debug;
use quanta_core::{QuantaError, Value};
use quanta_units::{CompositeValue, Converter, Magnitude, UnitRegistry, UNITS, parse_quantity_in};
use crate::field::{FieldDescriptor, FieldType};
use crate::input::{FieldValue, FieldValues, RawInputs};
use crate::visibility::is_visible;

/// How bounds violations and bad choices are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// End-user submissions: reject with an issue
    #[default]
    Strict,
    /// Trusted data (presets): clamp to bounds, fall back to defaults
    Lenient,
}

/// Every issue found in one submission
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("validation failed with {} issue(s)", .issues.len())]
pub struct ValidationFailure {
    pub issues: Vec<QuantaError>,
}

/// Relative slack on bound comparisons, so a value clamped in one unit
/// still passes after conversion to another
const BOUND_TOLERANCE: f64 = 1e-9;

/// Validate against the global unit registry
pub fn validate(fields: &[FieldDescriptor], raw: &RawInputs, mode: Mode) -> Result<FieldValues, ValidationFailure> {
    Validator::new(&UNITS, mode).validate(fields, raw)
}

/// Field validator bound to a unit registry and a mode
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    converter: Converter<'a>,
    mode: Mode,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a UnitRegistry, mode: Mode) -> Self {
        Validator {
            converter: Converter::new(registry),
            mode,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn validate(&self, fields: &[FieldDescriptor], raw: &RawInputs) -> Result<FieldValues, ValidationFailure> {
        let mut resolved = FieldValues::new();
        let mut issues = Vec::new();

        for field in fields {
            if !is_visible(field, &resolved) {
                debug!(field = %field.id, "field hidden, skipped");
                continue;
            }
            match self.resolve_field(field, raw) {
                Ok(value) => resolved.insert(&field.id, value),
                Err(issue) => issues.push(issue),
            }
        }

        if issues.is_empty() {
            Ok(resolved)
        } else {
            Err(ValidationFailure { issues })
        }
    }

    fn resolve_field(&self, field: &FieldDescriptor, raw: &RawInputs) -> Result<FieldValue, QuantaError> {
        match raw.value(&field.id) {
            Some(value) => {
                let unit = self.resolve_unit(field, raw.unit(&field.id))?;
                self.coerce(field, value, unit)
            }
            None if !field.default_value.is_null() => {
                // Defaults are declared in the default unit
                let unit = self.resolve_unit(field, None)?;
                self.coerce(field, &field.default_value, unit)
            }
            None if field.optional => {
                let unit = self.resolve_unit(field, None)?;
                Ok(FieldValue::new(Value::Null, unit))
            }
            None => Err(QuantaError::missing_required_field(&field.id)),
        }
    }

    /// Submitted unit if the dimension has it and the field allows it,
    /// otherwise the default unit
    fn resolve_unit(&self, field: &FieldDescriptor, submitted: Option<&str>) -> Result<Option<String>, QuantaError> {
        let Some(dimension) = &field.unit_type else {
            return Ok(None);
        };
        let registry = self.converter.registry();

        if let Some(unit) = submitted {
            match registry.canonical(unit, dimension) {
                Ok(symbol) if field.allows_unit(symbol) => return Ok(Some(symbol.to_string())),
                _ => debug!(field = %field.id, unit, "unit not allowed, using default"),
            }
        }

        let fallback = match &field.default_unit {
            Some(unit) => unit.clone(),
            None => registry
                .dimension(dimension)
                .map_err(|e| QuantaError::from(e).in_field(&field.id))?
                .base_unit
                .clone(),
        };
        Ok(Some(fallback))
    }

    fn coerce(&self, field: &FieldDescriptor, value: &Value, unit: Option<String>) -> Result<FieldValue, QuantaError> {
        match field.kind {
            FieldType::Number | FieldType::Slider => self.coerce_number(field, value, unit),
            FieldType::Radio | FieldType::Select => self.coerce_choice(field, value),
            FieldType::Toggle => self.coerce_toggle(field, value),
        }
    }

    fn coerce_number(&self, field: &FieldDescriptor, value: &Value, unit: Option<String>) -> Result<FieldValue, QuantaError> {
        let (magnitude, unit) = match value {
            Value::Text(text) => self.parse_text(field, text, unit)?,
            other => match Magnitude::from_value(other) {
                Some(m) => (m, unit),
                None => return Err(QuantaError::invalid_value(&field.id, "a number", other.type_name())),
            },
        };

        let magnitude = self.shape(field, magnitude, unit.as_deref())?;

        let finite = match magnitude {
            Magnitude::Scalar(n) => n.is_finite(),
            Magnitude::Composite(c) => c.major.is_finite() && c.minor.is_finite(),
        };
        if !finite {
            return Err(QuantaError::invalid_value(&field.id, "a finite number", "a non-finite number"));
        }

        let magnitude = self.check_bounds(field, magnitude, unit.as_deref())?;
        Ok(FieldValue::new(magnitude.to_value(), unit))
    }

    /// Numeric or quantity text. A unit written in the text wins over the
    /// submitted one, but must be allowed for the field.
    fn parse_text(&self, field: &FieldDescriptor, text: &str, unit: Option<String>) -> Result<(Magnitude, Option<String>), QuantaError> {
        let Some(dimension) = &field.unit_type else {
            let n = text
                .trim()
                .parse::<f64>()
                .map_err(|_| QuantaError::invalid_value(&field.id, "a number", text))?;
            return Ok((Magnitude::Scalar(n), None));
        };

        let parsed = parse_quantity_in(self.converter.registry(), text, dimension)
            .map_err(|_| QuantaError::invalid_value(&field.id, "a quantity", text))?;

        match parsed.unit {
            Some(written) if !field.allows_unit(&written) => Err(QuantaError::invalid_value(
                &field.id,
                &format!("one of {:?}", field.allowed_units),
                &written,
            )),
            Some(written) => Ok((parsed.magnitude, Some(written))),
            None => Ok((parsed.magnitude, unit)),
        }
    }

    /// Make the magnitude match the unit kind: scalars for composite units
    /// are whole major units, pairs are only valid for composite units
    fn shape(&self, field: &FieldDescriptor, magnitude: Magnitude, unit: Option<&str>) -> Result<Magnitude, QuantaError> {
        let composite = match (unit, &field.unit_type) {
            (Some(u), Some(d)) => self.converter.registry().is_composite(u, d),
            _ => false,
        };
        match magnitude {
            Magnitude::Scalar(n) if composite => Ok(Magnitude::Composite(CompositeValue::new(n, 0.0))),
            Magnitude::Composite(_) if !composite => {
                Err(QuantaError::invalid_value(&field.id, "a number", "a two-part value"))
            }
            m => Ok(m),
        }
    }

    fn check_bounds(&self, field: &FieldDescriptor, magnitude: Magnitude, unit: Option<&str>) -> Result<Magnitude, QuantaError> {
        if field.min.is_none() && field.max.is_none() {
            return Ok(magnitude);
        }

        let (Some(dimension), Some(unit)) = (&field.unit_type, unit) else {
            // Unitless: compare directly
            let n = magnitude.as_scalar().unwrap_or(f64::NAN);
            return match self.bounded(field, n, field.min, field.max)? {
                Some(clamped) => Ok(Magnitude::Scalar(clamped)),
                None => Ok(magnitude),
            };
        };

        // Bounds live in the default unit; compare everything in base
        let bound_unit = field.default_unit.as_deref().unwrap_or(unit);
        let to_base = |m: Magnitude, u: &str| {
            self.converter
                .magnitude_to_base(m, u, dimension)
                .map_err(|e| QuantaError::from(e).in_field(&field.id))
        };
        let base = to_base(magnitude, unit)?;
        let min = field.min.map(|m| to_base(Magnitude::Scalar(m), bound_unit)).transpose()?;
        let max = field.max.map(|m| to_base(Magnitude::Scalar(m), bound_unit)).transpose()?;

        let outside = min.map(|lo| base < lo - slack(lo)).unwrap_or(false)
            || max.map(|hi| base > hi + slack(hi)).unwrap_or(false);
        if !outside {
            return Ok(magnitude);
        }

        match self.mode {
            Mode::Strict => {
                let shown = self.in_bound_unit(base, bound_unit, dimension);
                Err(QuantaError::out_of_range(&field.id, shown, field.min, field.max))
            }
            Mode::Lenient => {
                let clamped = clamp(base, min, max);
                debug!(field = %field.id, "value clamped to bounds");
                self.converter
                    .magnitude_from_base(clamped, unit, dimension)
                    .map_err(|e| QuantaError::from(e).in_field(&field.id))
            }
        }
    }

    /// `Ok(None)` when in range, the clamped value in lenient mode
    fn bounded(&self, field: &FieldDescriptor, n: f64, min: Option<f64>, max: Option<f64>) -> Result<Option<f64>, QuantaError> {
        let outside = min.map(|lo| n < lo - slack(lo)).unwrap_or(false)
            || max.map(|hi| n > hi + slack(hi)).unwrap_or(false);
        if !outside {
            return Ok(None);
        }
        match self.mode {
            Mode::Strict => Err(QuantaError::out_of_range(&field.id, n, min, max)),
            Mode::Lenient => {
                debug!(field = %field.id, "value clamped to bounds");
                Ok(Some(clamp(n, min, max)))
            }
        }
    }

    fn in_bound_unit(&self, base: f64, unit: &str, dimension: &str) -> f64 {
        let registry = self.converter.registry();
        if let Ok(composite) = registry.composite(unit, dimension) {
            return base / composite.major_factor;
        }
        self.converter.from_base(base, unit, dimension).unwrap_or(base)
    }

    fn coerce_choice(&self, field: &FieldDescriptor, value: &Value) -> Result<FieldValue, QuantaError> {
        if let Some(option) = field.option(value) {
            return Ok(FieldValue::plain(Value::Text(option.value.clone())));
        }
        if self.mode == Mode::Lenient {
            if let Some(option) = field.option(&field.default_value) {
                debug!(field = %field.id, "unknown option, using default");
                return Ok(FieldValue::plain(Value::Text(option.value.clone())));
            }
        }
        let expected: Vec<&str> = field.options.iter().map(|o| o.value.as_str()).collect();
        Err(QuantaError::invalid_value(
            &field.id,
            &format!("one of [{}]", expected.join(", ")),
            &value.to_string(),
        ))
    }

    fn coerce_toggle(&self, field: &FieldDescriptor, value: &Value) -> Result<FieldValue, QuantaError> {
        if let Some(b) = as_flag(value) {
            return Ok(FieldValue::plain(Value::Bool(b)));
        }
        if self.mode == Mode::Lenient {
            if let Some(b) = as_flag(&field.default_value) {
                return Ok(FieldValue::plain(Value::Bool(b)));
            }
        }
        Err(QuantaError::invalid_value(&field.id, "true or false", &value.to_string()))
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Text(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
        Value::Text(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn slack(bound: f64) -> f64 {
    BOUND_TOLERANCE * bound.abs().max(1.0)
}

fn clamp(n: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let n = min.map(|lo| n.max(lo)).unwrap_or(n);
    max.map(|hi| n.min(hi)).unwrap_or(n)
}
