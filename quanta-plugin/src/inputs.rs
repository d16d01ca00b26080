//! What a calculator receives and what it returns

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use quanta_core::Value;
use quanta_units::{Converter, UnitRegistry, UNITS};

/// Validated inputs, dimension-bound values already in base units.
///
/// Hidden fields are absent; optional fields left empty are present as
/// null, so `number` returns `None` for both and `0.0` only for a real zero.
///
/// Carries the unit registry the engine normalized with, so calculators
/// convert reference values against the same table.
#[derive(Debug, Clone)]
pub struct CalcInputs<'a> {
    values: BTreeMap<String, Value>,
    /// Unit the caller chose for each dimension-bound field
    units: BTreeMap<String, String>,
    registry: &'a UnitRegistry,
}

impl Default for CalcInputs<'static> {
    fn default() -> Self {
        CalcInputs::using(&UNITS)
    }
}

impl CalcInputs<'static> {
    /// Inputs over the standard registry
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> CalcInputs<'a> {
    pub fn using(registry: &'a UnitRegistry) -> Self {
        CalcInputs {
            values: BTreeMap::new(),
            units: BTreeMap::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &'a UnitRegistry {
        self.registry
    }

    pub fn converter(&self) -> Converter<'a> {
        Converter::new(self.registry)
    }

    pub fn with_value(mut self, id: &str, value: impl Into<Value>) -> Self {
        self.insert(id, value.into(), None);
        self
    }

    pub fn with_quantity(mut self, id: &str, base_value: f64, unit: &str) -> Self {
        self.insert(id, Value::Number(base_value), Some(unit.to_string()));
        self
    }

    pub fn insert(&mut self, id: &str, value: Value, unit: Option<String>) {
        self.values.insert(id.to_string(), value);
        if let Some(unit) = unit {
            self.units.insert(id.to_string(), unit);
        }
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn number(&self, id: &str) -> Option<f64> {
        self.value(id).and_then(|v| v.as_number())
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.value(id).and_then(|v| v.as_text())
    }

    pub fn flag(&self, id: &str) -> Option<bool> {
        self.value(id).and_then(|v| v.as_bool())
    }

    pub fn unit(&self, id: &str) -> Option<&str> {
        self.units.get(id).map(|s| s.as_str())
    }

    /// Present and visible (possibly null)
    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}

/// Raw results in base units plus chart/table metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalcOutput {
    pub values: BTreeMap<String, Value>,
    pub metadata: BTreeMap<String, Value>,
}

impl CalcOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, value: impl Into<Value>) -> Self {
        self.set(id, value);
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn set(&mut self, id: &str, value: impl Into<Value>) {
        self.values.insert(id.to_string(), value.into());
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn number(&self, id: &str) -> Option<f64> {
        self.get(id).and_then(|v| v.as_number())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.metadata.is_empty()
    }
}

/// Build an object value from pairs, for metadata rows and series points
pub fn object<I, K>(pairs: I) -> Value
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    Value::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
}
