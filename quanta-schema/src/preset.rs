//! Presets: named, fixed bundles of field values

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use quanta_core::Value;
use quanta_units::UnitRegistry;
use crate::field::FieldDescriptor;
use crate::input::{FieldValues, RawInputs};
use crate::validate::{Mode, ValidationFailure, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    /// Template key of the preset name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub values: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub units: BTreeMap<String, String>,
}

impl Preset {
    pub fn new(id: &str) -> Self {
        Preset {
            id: id.to_string(),
            label: None,
            values: BTreeMap::new(),
            units: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_value(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.values.insert(field.to_string(), value.into());
        self
    }

    pub fn with_quantity(mut self, field: &str, value: impl Into<Value>, unit: &str) -> Self {
        self.units.insert(field.to_string(), unit.to_string());
        self.with_value(field, value)
    }

    pub fn to_raw(&self) -> RawInputs {
        RawInputs {
            values: self.values.clone(),
            units: self.units.clone(),
        }
    }

    /// Resolve the preset against a field list. Presets are trusted, so
    /// out-of-range values are clamped rather than rejected.
    pub fn apply(&self, fields: &[FieldDescriptor], registry: &UnitRegistry) -> Result<FieldValues, ValidationFailure> {
        Validator::new(registry, Mode::Lenient).validate(fields, &self.to_raw())
    }
}
