//! Unit registry: the standard dimensions plus table-driven loading

use std::collections::HashMap;
use std::sync::LazyLock;
use serde::{Serialize, Deserialize};
use crate::dimension::{self, Dimension};
use crate::unit::{CompositeUnit, ConversionError, Unit};

/// Global unit registry, built once and read-only afterwards
pub static UNITS: LazyLock<UnitRegistry> = LazyLock::new(UnitRegistry::standard);

/// Registry of all known dimensions and their units
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    dimensions: HashMap<String, Dimension>,
}

impl UnitRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in dimensions
    pub fn standard() -> Self {
        UnitRegistry::new()
            .with_dimension(weight_units())
            .with_dimension(length_units())
            .with_dimension(data_volume_units())
            .with_dimension(data_rate_units())
            .with_dimension(duration_units())
            .with_dimension(speed_units())
            .with_dimension(energy_units())
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.insert(dimension.id.clone(), dimension);
        self
    }

    /// Build a registry from a serialized unit table
    pub fn from_table(table: UnitTable) -> Result<Self, ConversionError> {
        let mut registry = UnitRegistry::new();
        for def in table.dimensions {
            let dimension = def.build()?;
            if registry.dimensions.contains_key(&dimension.id) {
                return Err(ConversionError::InvalidTable(format!(
                    "dimension '{}' declared twice",
                    dimension.id
                )));
            }
            registry = registry.with_dimension(dimension);
        }
        Ok(registry)
    }

    pub fn from_json(json: &str) -> Result<Self, ConversionError> {
        let table: UnitTable = serde_json::from_str(json)
            .map_err(|e| ConversionError::InvalidTable(e.to_string()))?;
        Self::from_table(table)
    }

    pub fn dimension(&self, id: &str) -> Result<&Dimension, ConversionError> {
        self.dimensions
            .get(id)
            .ok_or_else(|| ConversionError::UnknownDimension(id.to_string()))
    }

    /// Get a simple unit within a dimension
    pub fn unit(&self, symbol: &str, dimension: &str) -> Result<&Unit, ConversionError> {
        let dim = self.dimension(dimension)?;
        if dim.is_composite(symbol) {
            return Err(ConversionError::CompositeRequired(symbol.to_string()));
        }
        dim.unit(symbol).ok_or_else(|| unknown_unit(symbol, dimension))
    }

    /// Get a composite unit within a dimension
    pub fn composite(&self, symbol: &str, dimension: &str) -> Result<&CompositeUnit, ConversionError> {
        let dim = self.dimension(dimension)?;
        if let Some(composite) = dim.composite(symbol) {
            return Ok(composite);
        }
        if dim.unit(symbol).is_some() {
            return Err(ConversionError::NotComposite(symbol.to_string()));
        }
        Err(unknown_unit(symbol, dimension))
    }

    pub fn is_composite(&self, symbol: &str, dimension: &str) -> bool {
        self.dimensions
            .get(dimension)
            .map(|d| d.is_composite(symbol))
            .unwrap_or(false)
    }

    pub fn contains(&self, symbol: &str, dimension: &str) -> bool {
        self.dimensions
            .get(dimension)
            .map(|d| d.contains(symbol))
            .unwrap_or(false)
    }

    /// Canonical symbol for a symbol or alias within a dimension
    pub fn canonical<'a>(&'a self, symbol: &'a str, dimension: &str) -> Result<&'a str, ConversionError> {
        self.dimension(dimension)?
            .resolve(symbol)
            .ok_or_else(|| unknown_unit(symbol, dimension))
    }

    pub fn units_in(&self, dimension: &str) -> Result<Vec<&str>, ConversionError> {
        Ok(self.dimension(dimension)?.symbols())
    }

    /// All dimension ids, sorted
    pub fn dimensions(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.dimensions.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }
}

fn unknown_unit(symbol: &str, dimension: &str) -> ConversionError {
    ConversionError::UnknownUnit {
        unit: symbol.to_string(),
        dimension: dimension.to_string(),
    }
}

// ============ Serialized tables ============

/// Serialized form of a unit registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTable {
    pub dimensions: Vec<DimensionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub base: UnitDef,
    #[serde(default)]
    pub units: Vec<UnitDef>,
    #[serde(default)]
    pub composites: Vec<CompositeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDef {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_factor")]
    pub factor: f64,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeDef {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub major: String,
    pub minor: String,
}

fn default_factor() -> f64 {
    1.0
}

impl DimensionDef {
    fn build(self) -> Result<Dimension, ConversionError> {
        let mut dim = Dimension::new(&self.id, &self.name, &self.base.symbol, &self.base.name);
        for alias in &self.base.aliases {
            dim.insert_alias(alias, &self.base.symbol);
        }

        for unit in self.units {
            if !unit.factor.is_finite() || unit.factor <= 0.0 {
                return Err(ConversionError::InvalidTable(format!(
                    "unit '{}' in '{}' has invalid factor {}",
                    unit.symbol, self.id, unit.factor
                )));
            }
            if dim.contains(&unit.symbol) {
                return Err(ConversionError::InvalidTable(format!(
                    "unit '{}' declared twice in '{}'",
                    unit.symbol, self.id
                )));
            }
            dim.insert_unit(Unit::new(&unit.symbol, &unit.name, &self.id, unit.factor));
            for alias in &unit.aliases {
                dim.insert_alias(alias, &unit.symbol);
            }
        }

        for composite in self.composites {
            let major = dim.unit(&composite.major).ok_or_else(|| unknown_unit(&composite.major, &self.id))?;
            let minor = dim.unit(&composite.minor).ok_or_else(|| unknown_unit(&composite.minor, &self.id))?;
            if major.factor <= minor.factor {
                return Err(ConversionError::InvalidTable(format!(
                    "composite '{}' needs a major unit larger than its minor unit",
                    composite.symbol
                )));
            }
            let unit = CompositeUnit::new(&composite.symbol, &composite.name, major, minor);
            dim.insert_composite(unit);
        }

        Ok(dim)
    }
}

// ============ Built-in dimensions ============

fn weight_units() -> Dimension {
    Dimension::new(dimension::WEIGHT, "Weight", "kg", "kilogram")
        .with_unit("g", "gram", 0.001)
        .with_unit("lbs", "pound", 0.45359237)
        .with_unit("oz", "ounce", 0.028349523125)
        .with_unit("st", "stone", 6.35029318)
        .with_alias("kilogram", "kg")
        .with_alias("kilograms", "kg")
        .with_alias("kgs", "kg")
        .with_alias("gram", "g")
        .with_alias("grams", "g")
        .with_alias("lb", "lbs")
        .with_alias("pound", "lbs")
        .with_alias("pounds", "lbs")
        .with_alias("ounce", "oz")
        .with_alias("ounces", "oz")
        .with_alias("stone", "st")
}

fn length_units() -> Dimension {
    Dimension::new(dimension::LENGTH, "Length", "cm", "centimeter")
        .with_unit("mm", "millimeter", 0.1)
        .with_unit("m", "meter", 100.0)
        .with_unit("km", "kilometer", 100_000.0)
        .with_unit("in", "inch", 2.54)
        .with_unit("ft", "foot", 30.48)
        .with_unit("yd", "yard", 91.44)
        .with_unit("mi", "mile", 160_934.4)
        .with_composite("ft_in", "feet and inches", "ft", "in")
        .with_alias("centimeter", "cm")
        .with_alias("centimeters", "cm")
        .with_alias("meter", "m")
        .with_alias("meters", "m")
        .with_alias("metre", "m")
        .with_alias("metres", "m")
        .with_alias("kilometer", "km")
        .with_alias("kilometers", "km")
        .with_alias("inch", "in")
        .with_alias("inches", "in")
        .with_alias("foot", "ft")
        .with_alias("feet", "ft")
        .with_alias("mile", "mi")
        .with_alias("miles", "mi")
}

fn data_volume_units() -> Dimension {
    const KIB: f64 = 1024.0;
    Dimension::new(dimension::DATA_VOLUME, "Data volume", "bit", "bit")
        .with_unit("B", "byte", 8.0)
        // Decimal (SI)
        .with_unit("KB", "kilobyte", 8.0e3)
        .with_unit("MB", "megabyte", 8.0e6)
        .with_unit("GB", "gigabyte", 8.0e9)
        .with_unit("TB", "terabyte", 8.0e12)
        // Binary (IEC)
        .with_unit("KiB", "kibibyte", 8.0 * KIB)
        .with_unit("MiB", "mebibyte", 8.0 * KIB * KIB)
        .with_unit("GiB", "gibibyte", 8.0 * KIB * KIB * KIB)
        .with_unit("TiB", "tebibyte", 8.0 * KIB * KIB * KIB * KIB)
        // Bit multiples
        .with_unit("Kb", "kilobit", 1.0e3)
        .with_unit("Mb", "megabit", 1.0e6)
        .with_unit("Gb", "gigabit", 1.0e9)
        .with_alias("bits", "bit")
        .with_alias("byte", "B")
        .with_alias("bytes", "B")
        .with_alias("kB", "KB")
        .with_alias("megabyte", "MB")
        .with_alias("megabytes", "MB")
        .with_alias("gigabyte", "GB")
        .with_alias("gigabytes", "GB")
        .with_alias("terabyte", "TB")
        .with_alias("terabytes", "TB")
}

fn data_rate_units() -> Dimension {
    Dimension::new(dimension::DATA_RATE, "Data rate", "bps", "bits per second")
        .with_unit("Kbps", "kilobits per second", 1.0e3)
        .with_unit("Mbps", "megabits per second", 1.0e6)
        .with_unit("Gbps", "gigabits per second", 1.0e9)
        .with_unit("Tbps", "terabits per second", 1.0e12)
        .with_unit("Bps", "bytes per second", 8.0)
        .with_unit("KBps", "kilobytes per second", 8.0e3)
        .with_unit("MBps", "megabytes per second", 8.0e6)
        .with_unit("GBps", "gigabytes per second", 8.0e9)
        .with_alias("bit/s", "bps")
        .with_alias("kbps", "Kbps")
        .with_alias("mbps", "Mbps")
        .with_alias("gbps", "Gbps")
        .with_alias("tbps", "Tbps")
        .with_alias("B/s", "Bps")
        .with_alias("KB/s", "KBps")
        .with_alias("MB/s", "MBps")
        .with_alias("GB/s", "GBps")
}

fn duration_units() -> Dimension {
    Dimension::new(dimension::DURATION, "Duration", "s", "second")
        .with_unit("ms", "millisecond", 0.001)
        .with_unit("min", "minute", 60.0)
        .with_unit("h", "hour", 3600.0)
        .with_unit("day", "day", 86_400.0)
        .with_unit("week", "week", 604_800.0)
        .with_alias("sec", "s")
        .with_alias("seconds", "s")
        .with_alias("minutes", "min")
        .with_alias("hr", "h")
        .with_alias("hours", "h")
        .with_alias("days", "day")
        .with_alias("weeks", "week")
}

fn speed_units() -> Dimension {
    Dimension::new(dimension::SPEED, "Speed", "m/s", "meters per second")
        .with_unit("km/h", "kilometers per hour", 1.0 / 3.6)
        .with_unit("mph", "miles per hour", 0.44704)
        .with_alias("kph", "km/h")
        .with_alias("kmh", "km/h")
}

fn energy_units() -> Dimension {
    Dimension::new(dimension::ENERGY, "Energy", "kcal", "kilocalorie")
        .with_unit("kJ", "kilojoule", 1.0 / 4.184)
        .with_unit("cal", "calorie", 0.001)
        .with_alias("Cal", "kcal")
        .with_alias("calories", "kcal")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_registry() {
        let reg = UnitRegistry::standard();

        assert!(reg.unit("kg", "weight").is_ok());
        assert!(reg.unit("Mbps", "data_rate").is_ok());
        assert!(reg.unit("pounds", "weight").is_ok());
        assert!(reg.unit("unknown_xyz", "weight").is_err());
    }

    #[test]
    fn test_unknown_dimension() {
        let reg = UnitRegistry::standard();
        assert_eq!(
            reg.unit("kg", "mass").unwrap_err(),
            ConversionError::UnknownDimension("mass".into())
        );
    }

    #[test]
    fn test_dimension_isolation() {
        let reg = UnitRegistry::standard();
        assert!(matches!(
            reg.unit("kg", "length"),
            Err(ConversionError::UnknownUnit { .. })
        ));
        assert!(matches!(
            reg.unit("Mbps", "data_volume"),
            Err(ConversionError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_every_dimension_has_factor_one_base() {
        let reg = UnitRegistry::standard();
        for id in reg.dimensions() {
            let dim = reg.dimension(id).unwrap();
            assert!(dim.base().unwrap().is_base(), "{} base is not factor 1", id);
        }
    }

    #[test]
    fn test_composite_lookup() {
        let reg = UnitRegistry::standard();
        assert!(reg.composite("ft_in", "length").is_ok());
        assert_eq!(
            reg.composite("ft", "length").unwrap_err(),
            ConversionError::NotComposite("ft".into())
        );
        assert_eq!(
            reg.unit("ft_in", "length").unwrap_err(),
            ConversionError::CompositeRequired("ft_in".into())
        );
    }

    #[test]
    fn test_canonical_alias() {
        let reg = UnitRegistry::standard();
        assert_eq!(reg.canonical("MB/s", "data_rate").unwrap(), "MBps");
        assert_eq!(reg.canonical("lb", "weight").unwrap(), "lbs");
    }

    #[test]
    fn test_from_json_table() {
        let json = r#"{
            "dimensions": [{
                "id": "volume",
                "name": "Volume",
                "base": { "symbol": "ml", "name": "milliliter" },
                "units": [
                    { "symbol": "l", "name": "liter", "factor": 1000, "aliases": ["liter"] },
                    { "symbol": "cup", "name": "US cup", "factor": 236.588 }
                ]
            }]
        }"#;
        let reg = UnitRegistry::from_json(json).unwrap();
        assert_eq!(reg.unit("liter", "volume").unwrap().factor, 1000.0);
        assert_eq!(reg.dimensions(), vec!["volume"]);
    }

    #[test]
    fn test_table_rejects_bad_factor() {
        let json = r#"{
            "dimensions": [{
                "id": "volume",
                "base": { "symbol": "ml" },
                "units": [{ "symbol": "l", "factor": 0 }]
            }]
        }"#;
        assert!(matches!(
            UnitRegistry::from_json(json),
            Err(ConversionError::InvalidTable(_))
        ));
    }

    #[test]
    fn test_table_composite_requires_components() {
        let json = r#"{
            "dimensions": [{
                "id": "length",
                "base": { "symbol": "cm" },
                "units": [{ "symbol": "in", "factor": 2.54 }],
                "composites": [{ "symbol": "ft_in", "major": "ft", "minor": "in" }]
            }]
        }"#;
        assert!(matches!(
            UnitRegistry::from_json(json),
            Err(ConversionError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_global_registry() {
        assert!(UNITS.dimensions().contains(&"weight"));
    }
}
