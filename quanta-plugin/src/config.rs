//! Calculator configuration: fields, presets, results, templates, charts

use std::collections::{BTreeMap, HashSet};
use serde::{Serialize, Deserialize};
use quanta_core::{QuantaError, QuantaResult, Value};
use quanta_locale::Templates;
use quanta_schema::{check_fields, FieldDescriptor, Preset, ShowWhen};
use quanta_units::UnitRegistry;

/// How a result is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    /// Plain number
    Number,
    /// Number in a unit of a dimension
    Quantity,
    /// Seconds shown as days, hours, minutes, seconds
    Duration,
    /// Number followed by `%`
    Percent,
    Text,
    Bool,
}

/// Where a quantity result takes its display unit from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "camelCase")]
pub enum UnitSource {
    /// Always this unit
    Fixed { unit: String },
    /// The unit the caller chose for an input of the same dimension
    Mirror { field: String },
    /// Look up the unit chosen for an input of another dimension
    /// (`km` distance to `km/h` speed)
    Mapped {
        field: String,
        map: BTreeMap<String, String>,
        fallback: String,
    },
}

impl UnitSource {
    pub fn fixed(unit: &str) -> Self {
        UnitSource::Fixed { unit: unit.to_string() }
    }

    pub fn mirror(field: &str) -> Self {
        UnitSource::Mirror { field: field.to_string() }
    }

    pub fn mapped(field: &str, pairs: &[(&str, &str)], fallback: &str) -> Self {
        UnitSource::Mapped {
            field: field.to_string(),
            map: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            fallback: fallback.to_string(),
        }
    }
}

/// How one result is denormalized and formatted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDescriptor {
    pub id: String,
    pub kind: ResultKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitSource>,
    /// Template key rendered with `{value}` bound to the formatted value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fraction_digits: Option<usize>,
    /// Suppressed (null, empty string) when the predicate is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<ShowWhen>,
}

impl ResultDescriptor {
    pub fn new(id: &str, kind: ResultKind) -> Self {
        ResultDescriptor {
            id: id.to_string(),
            kind,
            dimension: None,
            unit: None,
            template: None,
            max_fraction_digits: None,
            show_when: None,
        }
    }

    pub fn number(id: &str) -> Self {
        Self::new(id, ResultKind::Number)
    }

    pub fn quantity(id: &str, dimension: &str, unit: UnitSource) -> Self {
        let mut result = Self::new(id, ResultKind::Quantity);
        result.dimension = Some(dimension.to_string());
        result.unit = Some(unit);
        result
    }

    pub fn duration(id: &str) -> Self {
        Self::new(id, ResultKind::Duration)
    }

    pub fn percent(id: &str) -> Self {
        Self::new(id, ResultKind::Percent)
    }

    pub fn text(id: &str) -> Self {
        Self::new(id, ResultKind::Text)
    }

    pub fn with_template(mut self, key: &str) -> Self {
        self.template = Some(key.to_string());
        self
    }

    pub fn digits(mut self, max_fraction_digits: usize) -> Self {
        self.max_fraction_digits = Some(max_fraction_digits);
        self
    }

    pub fn show_when(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.show_when = Some(ShowWhen {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Line,
    Bar,
    Table,
}

/// A chart or table fed verbatim from one metadata entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescriptor {
    pub id: String,
    pub kind: ChartKind,
    /// Metadata key holding the series or rows
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ChartDescriptor {
    pub fn new(id: &str, kind: ChartKind, source: &str) -> Self {
        ChartDescriptor {
            id: id.to_string(),
            kind,
            source: source.to_string(),
            title: None,
        }
    }

    pub fn with_title(mut self, key: &str) -> Self {
        self.title = Some(key.to_string());
        self
    }
}

/// Everything declarative about a calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorConfig {
    pub id: String,
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub presets: Vec<Preset>,
    #[serde(default)]
    pub results: Vec<ResultDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_key: Option<String>,
    #[serde(default)]
    pub templates: Templates,
    #[serde(default)]
    pub charts: Vec<ChartDescriptor>,
}

impl CalculatorConfig {
    pub fn new(id: &str) -> Self {
        CalculatorConfig {
            id: id.to_string(),
            fields: Vec::new(),
            presets: Vec::new(),
            results: Vec::new(),
            summary_key: None,
            templates: Templates::new(),
            charts: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_result(mut self, result: ResultDescriptor) -> Self {
        self.results.push(result);
        self
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.presets.push(preset);
        self
    }

    pub fn with_chart(mut self, chart: ChartDescriptor) -> Self {
        self.charts.push(chart);
        self
    }

    pub fn with_summary(mut self, key: &str) -> Self {
        self.summary_key = Some(key.to_string());
        self
    }

    /// Add templates for one locale
    pub fn with_templates(mut self, locale: &str, pairs: &[(&str, &str)]) -> Self {
        let table = self.templates.entry(locale.to_string()).or_default();
        for (key, text) in pairs {
            table.insert(key.to_string(), text.to_string());
        }
        self
    }

    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn preset(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Config-time checks: fields, unit references, visibility, presets
    pub fn validate(&self, units: &UnitRegistry) -> QuantaResult<()> {
        check_fields(&self.id, &self.fields, units)?;

        let mut ids = HashSet::new();
        for result in &self.results {
            if !ids.insert(result.id.as_str()) {
                return Err(self.invalid(format!("result '{}' declared twice", result.id)));
            }
            self.check_result(result, units)?;
        }

        let mut preset_ids = HashSet::new();
        for preset in &self.presets {
            if !preset_ids.insert(preset.id.as_str()) {
                return Err(self.invalid(format!("preset '{}' declared twice", preset.id)));
            }
            if let Some(unknown) = preset.values.keys().find(|k| self.field(k).is_none()) {
                return Err(self.invalid(format!("preset '{}' sets unknown field '{}'", preset.id, unknown)));
            }
        }

        Ok(())
    }

    fn check_result(&self, result: &ResultDescriptor, units: &UnitRegistry) -> QuantaResult<()> {
        if let Some(predicate) = &result.show_when {
            if self.field(&predicate.field).is_none() {
                return Err(self.invalid(format!(
                    "result '{}' is conditioned on unknown field '{}'",
                    result.id, predicate.field
                )));
            }
        }

        if result.kind != ResultKind::Quantity {
            return Ok(());
        }

        let (Some(dimension), Some(source)) = (&result.dimension, &result.unit) else {
            return Err(self.invalid(format!("quantity result '{}' needs a dimension and a unit", result.id)));
        };
        units.dimension(dimension).map_err(QuantaError::from)?;

        let known = |unit: &str| -> QuantaResult<()> {
            if units.contains(unit, dimension) {
                Ok(())
            } else {
                Err(QuantaError::unknown_unit(unit, dimension))
            }
        };

        match source {
            UnitSource::Fixed { unit } => known(unit),
            UnitSource::Mirror { field } => {
                let input = self
                    .field(field)
                    .ok_or_else(|| self.invalid(format!("result '{}' mirrors unknown field '{}'", result.id, field)))?;
                if input.unit_type.as_deref() != Some(dimension.as_str()) {
                    return Err(self.invalid(format!(
                        "result '{}' mirrors '{}' from another dimension",
                        result.id, field
                    )));
                }
                Ok(())
            }
            UnitSource::Mapped { field, map, fallback } => {
                if self.field(field).is_none() {
                    return Err(self.invalid(format!("result '{}' maps unknown field '{}'", result.id, field)));
                }
                for unit in map.values() {
                    known(unit)?;
                }
                known(fallback)
            }
        }
    }

    fn invalid(&self, details: String) -> QuantaError {
        QuantaError::invalid_config(&self.id, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quanta_core::codes;
    use quanta_units::UNITS;

    fn pace_config() -> CalculatorConfig {
        CalculatorConfig::new("pace")
            .with_field(FieldDescriptor::number("distance").with_unit("length", "km").allow_units(&["km", "mi"]))
            .with_field(FieldDescriptor::number("time").with_unit("duration", "min"))
            .with_result(ResultDescriptor::quantity(
                "speed",
                "speed",
                UnitSource::mapped("distance", &[("km", "km/h"), ("mi", "mph")], "km/h"),
            ))
            .with_result(ResultDescriptor::quantity("distanceOut", "length", UnitSource::mirror("distance")))
            .with_templates("en", &[("summary", "Pace {pace}")])
            .with_summary("summary")
    }

    #[test]
    fn test_valid_config() {
        assert!(pace_config().validate(&UNITS).is_ok());
    }

    #[test]
    fn test_mapped_unit_in_wrong_dimension() {
        let config = pace_config().with_result(ResultDescriptor::quantity(
            "bad",
            "speed",
            UnitSource::mapped("distance", &[("km", "km")], "km/h"),
        ));
        assert_eq!(config.validate(&UNITS).unwrap_err().code, codes::UNKNOWN_UNIT);
    }

    #[test]
    fn test_mirror_across_dimensions_rejected() {
        let config = pace_config()
            .with_result(ResultDescriptor::quantity("bad", "speed", UnitSource::mirror("distance")));
        assert_eq!(config.validate(&UNITS).unwrap_err().code, codes::INVALID_CONFIG);
    }

    #[test]
    fn test_unknown_result_dimension() {
        let config = pace_config()
            .with_result(ResultDescriptor::quantity("bad", "volume", UnitSource::fixed("l")));
        assert_eq!(config.validate(&UNITS).unwrap_err().code, codes::UNKNOWN_DIMENSION);
    }

    #[test]
    fn test_preset_with_unknown_field() {
        let config = pace_config().with_preset(Preset::new("p").with_value("cadence", 180.0));
        assert!(config.validate(&UNITS).is_err());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(pace_config()).unwrap();
        assert_eq!(json["results"][0]["unit"]["from"], "mapped");
        assert_eq!(json["results"][1]["unit"]["field"], "distance");
        assert_eq!(json["summaryKey"], "summary");
        assert_eq!(json["templates"]["en"]["summary"], "Pace {pace}");
    }
}
