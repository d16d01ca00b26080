//! Raw submissions and normalized field values

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use quanta_core::Value;

/// What a caller submits: field id to value, plus field id to chosen unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
    #[serde(default)]
    pub units: BTreeMap<String, String>,
}

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.values.insert(field.to_string(), value.into());
        self
    }

    pub fn with_unit(mut self, field: &str, unit: &str) -> Self {
        self.units.insert(field.to_string(), unit.to_string());
        self
    }

    /// Value and unit in one call
    pub fn with_quantity(self, field: &str, value: impl Into<Value>, unit: &str) -> Self {
        self.with_value(field, value).with_unit(field, unit)
    }

    /// Submitted value, treating an explicit null as absent
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field).filter(|v| !v.is_null())
    }

    pub fn unit(&self, field: &str) -> Option<&str> {
        self.units.get(field).map(|s| s.as_str())
    }
}

/// A validated value with its resolved unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl FieldValue {
    pub fn new(value: Value, unit: Option<String>) -> Self {
        FieldValue { value, unit }
    }

    pub fn plain(value: Value) -> Self {
        FieldValue { value, unit: None }
    }
}

/// Normalized output of validation. Hidden fields are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues {
    fields: BTreeMap<String, FieldValue>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, value: FieldValue) {
        self.fields.insert(id.to_string(), value);
    }

    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.fields.get(id)
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.fields.get(id).map(|f| &f.value)
    }

    pub fn number(&self, id: &str) -> Option<f64> {
        self.value(id).and_then(|v| v.as_number())
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.value(id).and_then(|v| v.as_text())
    }

    pub fn unit(&self, id: &str) -> Option<&str> {
        self.fields.get(id).and_then(|f| f.unit.as_deref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Turn validated values back into a submission
    pub fn to_raw(&self) -> RawInputs {
        let mut raw = RawInputs::new();
        for (id, field) in &self.fields {
            raw.values.insert(id.clone(), field.value.clone());
            if let Some(unit) = &field.unit {
                raw.units.insert(id.clone(), unit.clone());
            }
        }
        raw
    }
}
