//! Per-locale string table

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::plural::{PluralCategory, PluralRule};

/// Singular and plural label of a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitLabel {
    pub one: String,
    pub other: String,
}

impl UnitLabel {
    pub fn new(one: &str, other: &str) -> Self {
        UnitLabel { one: one.to_string(), other: other.to_string() }
    }
}

/// Decimal and grouping separators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberSymbols {
    pub decimal: String,
    pub group: String,
}

impl Default for NumberSymbols {
    fn default() -> Self {
        NumberSymbols {
            decimal: ".".to_string(),
            group: ",".to_string(),
        }
    }
}

/// Everything one locale supplies: grammar, separators, templates, labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleTable {
    #[serde(default)]
    pub plural: PluralRule,
    #[serde(default)]
    pub number: NumberSymbols,
    #[serde(default = "default_list_separator")]
    pub list_separator: String,
    /// Template key to template text
    #[serde(default)]
    pub strings: BTreeMap<String, String>,
    /// Unit symbol to its labels
    #[serde(default)]
    pub units: BTreeMap<String, UnitLabel>,
}

fn default_list_separator() -> String {
    ", ".to_string()
}

impl Default for LocaleTable {
    fn default() -> Self {
        LocaleTable {
            plural: PluralRule::default(),
            number: NumberSymbols::default(),
            list_separator: default_list_separator(),
            strings: BTreeMap::new(),
            units: BTreeMap::new(),
        }
    }
}

impl LocaleTable {
    pub fn with_string(mut self, key: &str, template: &str) -> Self {
        self.strings.insert(key.to_string(), template.to_string());
        self
    }

    pub fn with_unit(mut self, symbol: &str, one: &str, other: &str) -> Self {
        self.units.insert(symbol.to_string(), UnitLabel::new(one, other));
        self
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(|s| s.as_str())
    }

    /// Label for `count` of a unit, or `None` when the locale has no labels
    /// for it
    pub fn unit_label(&self, symbol: &str, count: f64) -> Option<&str> {
        let label = self.units.get(symbol)?;
        Some(match self.plural.category(count) {
            PluralCategory::One => &label.one,
            PluralCategory::Other => &label.other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let table: LocaleTable = serde_json::from_str("{}").unwrap();
        assert_eq!(table.list_separator, ", ");
        assert_eq!(table.number.decimal, ".");
        assert_eq!(table.plural, PluralRule::OneOther);
    }

    #[test]
    fn test_unit_label() {
        let table = LocaleTable::default().with_unit("day", "day", "days");
        assert_eq!(table.unit_label("day", 1.0), Some("day"));
        assert_eq!(table.unit_label("day", 0.0), Some("days"));
        assert_eq!(table.unit_label("day", 3.0), Some("days"));
        assert_eq!(table.unit_label("week", 3.0), None);
    }
}
