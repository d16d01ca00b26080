//! Quanta - Unit-Aware Calculation Engine
//!
//! Validates raw form inputs against a calculator's field descriptors,
//! converts quantities to base units, runs the calculator, and renders the
//! results back into display units and locale-formatted strings.

mod engine;
mod envelope;
mod render;
mod settings;

pub use engine::{Description, Orchestrator, Stage};
pub use envelope::ResultEnvelope;
pub use render::{Rendered, Renderer};
pub use settings::EngineSettings;

pub use quanta_core::{codes, QuantaError, QuantaResult, Value};
pub use quanta_locale::{Catalog, LocaleStore};
pub use quanta_plugin::CalculatorRegistry;
pub use quanta_schema::RawInputs;
pub use quanta_units::UnitRegistry;

use std::path::Path;
use std::sync::Arc;
use serde::Serialize;
use tracing::{info, warn};
use quanta_units::{parse_quantity_in, Converter, Magnitude};

/// One dimension as listed for clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionInfo {
    pub id: String,
    /// Localized dimension name
    pub label: String,
    pub base: String,
    /// Simple units by increasing size, then composite units
    pub units: Vec<String>,
}

/// Main Quanta engine
pub struct Quanta {
    calculators: Arc<CalculatorRegistry>,
    units: Arc<UnitRegistry>,
    locales: LocaleStore,
    settings: EngineSettings,
}

impl Quanta {
    pub fn new(calculators: CalculatorRegistry) -> Self {
        Self {
            calculators: Arc::new(calculators),
            units: Arc::new(UnitRegistry::standard()),
            locales: LocaleStore::default(),
            settings: EngineSettings::default(),
        }
    }

    pub fn with_standard_calculators() -> Self {
        Self::new(quanta_calculators::load_calculators(CalculatorRegistry::new()))
    }

    pub fn with_units(mut self, units: UnitRegistry) -> Self {
        self.units = Arc::new(units);
        self
    }

    /// Apply settings. The catalog's default locale follows the settings
    /// when the catalog has a table for it.
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        let current = self.locales.snapshot();
        if current.default_locale != settings.default_locale {
            match Catalog::clone(&current).with_default_locale(&settings.default_locale) {
                Ok(catalog) => {
                    self.locales.swap(catalog);
                }
                Err(e) => warn!(locale = %settings.default_locale, "{}", e.message),
            }
        }
        self.settings = settings;
        self
    }

    pub fn with_catalog(self, catalog: Catalog) -> Self {
        self.locales.swap(catalog);
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn calculators(&self) -> &CalculatorRegistry {
        &self.calculators
    }

    /// The catalog snapshot requests are currently served from
    pub fn catalog(&self) -> Arc<Catalog> {
        self.locales.snapshot()
    }

    /// Check every calculator config against the unit registry
    pub fn validate(&self) -> QuantaResult<()> {
        self.calculators.validate(&self.units)
    }

    /// Run a calculator on a user submission. An unknown calculator is an
    /// error; invalid inputs are reported inside the envelope.
    pub fn execute(&self, calculator: &str, raw: &RawInputs, locale: Option<&str>) -> QuantaResult<ResultEnvelope> {
        let calc = self.calculators.lookup(calculator)?;
        let catalog = self.locales.snapshot();
        let orchestrator = Orchestrator::new(&self.units, &catalog, self.settings.number);
        Ok(orchestrator.execute(calc, raw, self.locale(locale)))
    }

    pub fn apply_preset(&self, calculator: &str, preset: &str, locale: Option<&str>) -> QuantaResult<ResultEnvelope> {
        let calc = self.calculators.lookup(calculator)?;
        let catalog = self.locales.snapshot();
        let orchestrator = Orchestrator::new(&self.units, &catalog, self.settings.number);
        orchestrator.apply_preset(calc, preset, self.locale(locale))
    }

    pub fn describe(&self, calculator: &str, locale: Option<&str>) -> QuantaResult<Description> {
        let calc = self.calculators.lookup(calculator)?;
        let catalog = self.locales.snapshot();
        let orchestrator = Orchestrator::new(&self.units, &catalog, self.settings.number);
        Ok(orchestrator.describe(calc, self.locale(locale)))
    }

    pub fn list(&self, category: Option<&str>) -> Value {
        self.calculators.list(category)
    }

    /// Convert a value between units of one dimension.
    ///
    /// `value` may be a number, a `[major, minor]` pair, or quantity text
    /// such as `"5'11\""`; a unit written in the text wins over `from`.
    pub fn convert(&self, value: &Value, from: Option<&str>, to: &str, dimension: &str) -> QuantaResult<Value> {
        let (magnitude, unit) = match value {
            Value::Text(text) => {
                let parsed = parse_quantity_in(&self.units, text, dimension)?;
                (parsed.magnitude, parsed.unit.or_else(|| from.map(str::to_string)))
            }
            other => {
                let magnitude = Magnitude::from_value(other).ok_or_else(|| {
                    QuantaError::invalid_value("value", "a number, a pair or a quantity", other.type_name())
                })?;
                (magnitude, from.map(str::to_string))
            }
        };
        let unit = unit.ok_or_else(|| {
            QuantaError::invalid_value("from", "a unit", "nothing").with_suggestion("Pass 'from' or write the unit in the value")
        })?;

        let converter = Converter::new(&self.units);
        let base = converter.magnitude_to_base(magnitude, &unit, dimension)?;
        Ok(converter.magnitude_from_base(base, to, dimension)?.to_value())
    }

    /// Dimensions and their units, all or one
    pub fn list_units(&self, dimension: Option<&str>, locale: Option<&str>) -> QuantaResult<Vec<DimensionInfo>> {
        let ids = match dimension {
            Some(id) => vec![self.units.dimension(id)?.id.as_str()],
            None => self.units.dimensions(),
        };
        let catalog = self.locales.snapshot();
        let locale = catalog.resolve(self.locale(locale));

        ids.into_iter()
            .map(|id| -> QuantaResult<DimensionInfo> {
                let dim = self.units.dimension(id)?;
                let label = catalog
                    .template(locale, &format!("dimension.{}", id))
                    .unwrap_or(dim.name.as_str())
                    .to_string();
                Ok(DimensionInfo {
                    id: dim.id.clone(),
                    label,
                    base: dim.base_unit.clone(),
                    units: dim.symbols().into_iter().map(str::to_string).collect(),
                })
            })
            .collect()
    }

    /// Replace the locale catalog. Calculations already running keep the
    /// snapshot they started with.
    pub fn reload_locales(&self, catalog: Catalog) -> Vec<String> {
        let codes: Vec<String> = catalog.codes().into_iter().map(str::to_string).collect();
        self.locales.swap(catalog);
        info!(locales = ?codes, "locales reloaded");
        codes
    }

    /// Reload from a directory of `<code>.json` tables over the builtins
    pub fn reload_locales_from(&self, dir: &Path) -> QuantaResult<Vec<String>> {
        let catalog = Catalog::load_dir(dir, &self.settings.default_locale)?;
        Ok(self.reload_locales(catalog))
    }

    fn locale<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.settings.default_locale)
    }
}

impl Default for Quanta {
    fn default() -> Self {
        Self::with_standard_calculators()
    }
}

/// Build `RawInputs` from `field: value` pairs, with an optional unit
/// after `=>`
#[macro_export]
macro_rules! inputs {
    {} => { $crate::RawInputs::new() };
    { $($key:ident : $value:expr $(=> $unit:expr)?),* $(,)? } => {{
        let raw = $crate::RawInputs::new();
        $(
            let raw = raw.with_value(stringify!($key), $crate::Value::from($value));
            $( let raw = raw.with_unit(stringify!($key), $unit); )?
        )*
        raw
    }};
}
