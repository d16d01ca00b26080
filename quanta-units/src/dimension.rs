//! Measurement dimensions
//!
//! A dimension is a family of mutually convertible units sharing one base
//! unit. Units never cross dimensions: `lbs` is only reachable through
//! `weight`.

use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::{Unit, CompositeUnit};

/// Well-known dimension ids
pub const WEIGHT: &str = "weight";
pub const LENGTH: &str = "length";
pub const DATA_VOLUME: &str = "data_volume";
pub const DATA_RATE: &str = "data_rate";
pub const DURATION: &str = "duration";
pub const SPEED: &str = "speed";
pub const ENERGY: &str = "energy";

/// A named measurement family with its units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    pub id: String,
    pub name: String,
    /// Symbol of the canonical base unit
    pub base_unit: String,
    units: HashMap<String, Unit>,
    composites: HashMap<String, CompositeUnit>,
    aliases: HashMap<String, String>,
}

impl Dimension {
    /// Create a dimension with its base unit (factor 1)
    pub fn new(id: &str, name: &str, base_symbol: &str, base_name: &str) -> Self {
        let mut units = HashMap::new();
        units.insert(base_symbol.to_string(), Unit::new(base_symbol, base_name, id, 1.0));
        Dimension {
            id: id.to_string(),
            name: name.to_string(),
            base_unit: base_symbol.to_string(),
            units,
            composites: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    pub fn with_unit(mut self, symbol: &str, name: &str, factor: f64) -> Self {
        self.insert_unit(Unit::new(symbol, name, &self.id, factor));
        self
    }

    pub fn with_alias(mut self, alias: &str, symbol: &str) -> Self {
        self.insert_alias(alias, symbol);
        self
    }

    /// Register a composite unit built from two already registered units.
    /// Unknown component symbols leave the dimension unchanged.
    pub fn with_composite(mut self, symbol: &str, name: &str, major: &str, minor: &str) -> Self {
        if let (Some(major), Some(minor)) = (self.units.get(major), self.units.get(minor)) {
            let composite = CompositeUnit::new(symbol, name, major, minor);
            self.composites.insert(symbol.to_string(), composite);
        }
        self
    }

    pub(crate) fn insert_unit(&mut self, unit: Unit) {
        self.units.insert(unit.symbol.clone(), unit);
    }

    pub(crate) fn insert_composite(&mut self, composite: CompositeUnit) {
        self.composites.insert(composite.symbol.clone(), composite);
    }

    pub(crate) fn insert_alias(&mut self, alias: &str, symbol: &str) {
        self.aliases.insert(alias.to_string(), symbol.to_string());
    }

    /// Resolve a symbol or alias to the canonical symbol
    pub fn resolve<'a>(&'a self, symbol: &'a str) -> Option<&'a str> {
        if self.units.contains_key(symbol) || self.composites.contains_key(symbol) {
            return Some(symbol);
        }
        self.aliases.get(symbol).map(|s| s.as_str())
    }

    /// Get a simple unit by symbol or alias
    pub fn unit(&self, symbol: &str) -> Option<&Unit> {
        self.resolve(symbol).and_then(|s| self.units.get(s))
    }

    /// Get a composite unit by symbol or alias
    pub fn composite(&self, symbol: &str) -> Option<&CompositeUnit> {
        self.resolve(symbol).and_then(|s| self.composites.get(s))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.resolve(symbol).is_some()
    }

    pub fn is_composite(&self, symbol: &str) -> bool {
        self.composite(symbol).is_some()
    }

    pub fn base(&self) -> Option<&Unit> {
        self.units.get(&self.base_unit)
    }

    /// Simple unit symbols ordered by factor, then composite symbols
    pub fn symbols(&self) -> Vec<&str> {
        let mut simple: Vec<&Unit> = self.units.values().collect();
        simple.sort_by(|a, b| a.factor.total_cmp(&b.factor));
        let mut composite: Vec<&str> = self.composites.keys().map(|s| s.as_str()).collect();
        composite.sort_unstable();

        simple.into_iter().map(|u| u.symbol.as_str()).chain(composite).collect()
    }

    /// Iterate over the simple units
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn composites(&self) -> impl Iterator<Item = &CompositeUnit> {
        self.composites.values()
    }
}
