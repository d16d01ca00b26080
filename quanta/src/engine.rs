//! Calculation orchestrator
//!
//! One calculation runs through five stages: validate the raw submission,
//! normalize dimension-bound values to base units, compute, denormalize and
//! format each result, then assemble the envelope and summary. Every stage
//! is a pure function of the config, the inputs and the catalog snapshot.

use std::collections::BTreeMap;
use std::fmt;
use serde::Serialize;
use tracing::debug;
use quanta_core::{QuantaError, QuantaResult, Value};
use quanta_locale::{Catalog, NumberStyle};
use quanta_plugin::{CalcInputs, Calculator, CalculatorConfig, CalculatorMeta};
use quanta_schema::{FieldValues, Mode, RawInputs, ValidationFailure, Validator};
use quanta_units::{Converter, Magnitude, UnitRegistry};
use crate::envelope::ResultEnvelope;
use crate::render::Renderer;

/// Pipeline stages, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Normalize,
    Compute,
    Format,
    Assemble,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate => "validate",
            Stage::Normalize => "normalize",
            Stage::Compute => "compute",
            Stage::Format => "format",
            Stage::Assemble => "assemble",
        };
        f.write_str(name)
    }
}

/// What the presentation layer needs to build a calculator's form
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    pub meta: CalculatorMeta,
    /// Locale the labels were rendered for
    pub locale: String,
    pub config: CalculatorConfig,
    /// Option, preset and chart labels resolved for the locale
    pub labels: BTreeMap<String, String>,
}

/// Runs calculations against one unit registry and one catalog snapshot
pub struct Orchestrator<'a> {
    units: &'a UnitRegistry,
    catalog: &'a Catalog,
    style: NumberStyle,
}

impl<'a> Orchestrator<'a> {
    pub fn new(units: &'a UnitRegistry, catalog: &'a Catalog, style: NumberStyle) -> Self {
        Orchestrator { units, catalog, style }
    }

    /// Run a user submission. Validation is strict: any issue makes the
    /// envelope invalid and nothing is computed.
    pub fn execute(&self, calculator: &dyn Calculator, raw: &RawInputs, locale: &str) -> ResultEnvelope {
        let config = calculator.config();
        debug!(calculator = %config.id, stage = %Stage::Validate, mode = "strict");
        let validated = Validator::new(self.units, Mode::Strict).validate(&config.fields, raw);
        self.run(calculator, validated, locale)
    }

    /// Run a preset through lenient validation and the same pipeline
    pub fn apply_preset(&self, calculator: &dyn Calculator, preset: &str, locale: &str) -> QuantaResult<ResultEnvelope> {
        let config = calculator.config();
        let found = config
            .preset(preset)
            .ok_or_else(|| unknown_preset(config, preset))?;
        debug!(calculator = %config.id, preset, stage = %Stage::Validate, mode = "lenient");
        let validated = found.apply(&config.fields, self.units);
        Ok(self.run(calculator, validated, locale))
    }

    pub fn describe(&self, calculator: &dyn Calculator, locale: &str) -> Description {
        let config = calculator.config();
        let locale = self.catalog.resolve(locale);
        let renderer = Renderer::new(config, self.catalog, locale, self.style, self.units);

        let option_keys = config
            .fields
            .iter()
            .flat_map(|f| f.options.iter())
            .filter_map(|o| o.label.as_deref());
        let preset_keys = config.presets.iter().filter_map(|p| p.label.as_deref());
        let chart_keys = config.charts.iter().filter_map(|c| c.title.as_deref());

        let labels = option_keys
            .chain(preset_keys)
            .chain(chart_keys)
            .filter_map(|key| renderer.label(key).map(|text| (key.to_string(), text.to_string())))
            .collect();

        Description {
            meta: calculator.meta(),
            locale: locale.to_string(),
            config: config.clone(),
            labels,
        }
    }

    fn run(
        &self,
        calculator: &dyn Calculator,
        validated: Result<FieldValues, ValidationFailure>,
        locale: &str,
    ) -> ResultEnvelope {
        let config = calculator.config();
        let id = config.id.as_str();

        let inputs = match validated {
            Ok(inputs) => inputs,
            Err(failure) => {
                debug!(calculator = id, issues = failure.issues.len(), "submission invalid");
                return ResultEnvelope::invalid(failure.issues);
            }
        };

        debug!(calculator = id, stage = %Stage::Normalize, fields = inputs.len());
        let normalized = match self.normalize(config, &inputs) {
            Ok(normalized) => normalized,
            Err(issue) => return ResultEnvelope::invalid(vec![issue]),
        };

        debug!(calculator = id, stage = %Stage::Compute);
        let output = calculator.calculate(&normalized);

        // Resolve once so fallback warnings are logged once per calculation
        let locale = self.catalog.resolve(locale);
        debug!(calculator = id, stage = %Stage::Format, locale, results = output.values.len());
        let renderer = Renderer::new(config, self.catalog, locale, self.style, self.units);

        let mut envelope = ResultEnvelope {
            is_valid: true,
            ..Default::default()
        };
        for (result_id, rendered) in renderer.results(&output.values, &inputs) {
            envelope.values.insert(result_id.clone(), rendered.value);
            envelope.formatted.insert(result_id, rendered.formatted);
        }

        debug!(calculator = id, stage = %Stage::Assemble);
        let summary_args = renderer.summary_args(&inputs, &envelope.formatted);
        envelope.summary = renderer.summary(&summary_args);
        envelope.metadata = output.metadata;
        envelope
    }

    /// Convert every dimension-bound, non-null input to its base unit. The
    /// chosen unit travels along so calculators can report in it.
    fn normalize(&self, config: &CalculatorConfig, inputs: &FieldValues) -> QuantaResult<CalcInputs<'a>> {
        let converter = Converter::new(self.units);
        let mut normalized = CalcInputs::using(self.units);

        for (id, input) in inputs.iter() {
            let dimension = config.field(id).and_then(|f| f.unit_type.as_deref());
            match (dimension, input.unit.as_deref()) {
                (Some(dimension), Some(unit)) if !input.value.is_null() => {
                    let magnitude = Magnitude::from_value(&input.value).ok_or_else(|| {
                        QuantaError::invalid_value(id, "a number", input.value.type_name())
                    })?;
                    let base = converter
                        .magnitude_to_base(magnitude, unit, dimension)
                        .map_err(|e| QuantaError::from(e).in_field(id))?;
                    normalized.insert(id, Value::Number(base), Some(unit.to_string()));
                }
                _ => normalized.insert(id, input.value.clone(), input.unit.clone()),
            }
        }

        Ok(normalized)
    }
}

fn unknown_preset(config: &CalculatorConfig, preset: &str) -> QuantaError {
    let err = QuantaError::unknown_preset(&config.id, preset);
    if config.presets.is_empty() {
        return err;
    }
    let known: Vec<&str> = config.presets.iter().map(|p| p.id.as_str()).collect();
    err.with_suggestion(format!("Available presets: {}", known.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quanta_core::codes;
    use quanta_plugin::{CalcOutput, ResultDescriptor, UnitSource};
    use quanta_schema::{FieldDescriptor, Preset};
    use quanta_units::UNITS;

    /// Body mass index with a mirrored weight echo
    struct Bmi {
        config: CalculatorConfig,
    }

    impl Bmi {
        fn new() -> Self {
            let config = CalculatorConfig::new("bmi")
                .with_field(FieldDescriptor::number("weight").with_unit("weight", "kg").bounds(20.0, 400.0))
                .with_field(FieldDescriptor::number("height").with_unit("length", "cm").bounds(50.0, 250.0))
                .with_result(ResultDescriptor::number("bmi").digits(1))
                .with_result(ResultDescriptor::quantity("weightEcho", "weight", UnitSource::mirror("weight")))
                .with_preset(Preset::new("average").with_value("weight", 70.0).with_value("height", 175.0))
                .with_preset(Preset::new("tall").with_value("weight", 500.0).with_value("height", 190.0))
                .with_templates("en", &[("summary", "BMI {bmi} at {weight}")])
                .with_summary("summary");
            Bmi { config }
        }
    }

    impl Calculator for Bmi {
        fn meta(&self) -> CalculatorMeta {
            CalculatorMeta {
                id: "bmi",
                name: "BMI",
                description: "Body mass index",
                category: "health",
                related: &[],
            }
        }

        fn config(&self) -> &CalculatorConfig {
            &self.config
        }

        fn calculate(&self, inputs: &CalcInputs) -> CalcOutput {
            let (Some(kg), Some(cm)) = (inputs.number("weight"), inputs.number("height")) else {
                return CalcOutput::new();
            };
            let m = cm / 100.0;
            CalcOutput::new()
                .with("bmi", kg / (m * m))
                .with("weightEcho", kg)
                .with_metadata("heightM", m)
        }
    }

    fn orchestrator(catalog: &Catalog) -> Orchestrator<'_> {
        Orchestrator::new(&UNITS, catalog, NumberStyle::default())
    }

    #[test]
    fn test_execute_in_pounds() {
        let catalog = Catalog::builtin();
        let raw = RawInputs::new()
            .with_quantity("weight", 154.324, "lbs")
            .with_value("height", 175.0);
        let env = orchestrator(&catalog).execute(&Bmi::new(), &raw, "en");
        assert!(env.is_valid);
        assert!((env.number("bmi").unwrap() - 22.857).abs() < 1e-2);
        assert_eq!(env.formatted("bmi"), Some("22.9"));
        assert_eq!(env.formatted("weightEcho"), Some("154.32 lbs"));
        assert_eq!(env.summary, "BMI 22.9 at 154.32 lbs");
        assert_eq!(env.metadata["heightM"], Value::Number(1.75));
    }

    #[test]
    fn test_strict_rejects_out_of_range() {
        let catalog = Catalog::builtin();
        let raw = RawInputs::new().with_value("weight", 500.0).with_value("height", 175.0);
        let env = orchestrator(&catalog).execute(&Bmi::new(), &raw, "en");
        assert!(!env.is_valid);
        assert!(env.values.is_empty() && env.formatted.is_empty() && env.metadata.is_empty());
        assert_eq!(env.issues[0].code, codes::OUT_OF_RANGE);
    }

    #[test]
    fn test_preset_clamps() {
        let catalog = Catalog::builtin();
        let env = orchestrator(&catalog).apply_preset(&Bmi::new(), "tall", "en").unwrap();
        assert!(env.is_valid);
        assert_eq!(env.number("weightEcho"), Some(400.0));
    }

    #[test]
    fn test_unknown_preset() {
        let catalog = Catalog::builtin();
        let err = orchestrator(&catalog).apply_preset(&Bmi::new(), "huge", "en").unwrap_err();
        assert_eq!(err.code, codes::UNKNOWN_PRESET);
        assert!(err.suggestion.unwrap().contains("average"));
    }

    #[test]
    fn test_locale_fallback_to_language() {
        let catalog = Catalog::builtin();
        let raw = RawInputs::new()
            .with_quantity("weight", 70500.0, "g")
            .with_value("height", 175.0);
        let env = orchestrator(&catalog).execute(&Bmi::new(), &raw, "de-AT");
        assert!(env.is_valid, "{:?}", env.issues);
        assert_eq!(env.formatted("weightEcho"), Some("70.500 g"));
        assert_eq!(env.formatted("bmi"), Some("23"));
    }

    #[test]
    fn test_describe_lists_meta() {
        let catalog = Catalog::builtin();
        let description = orchestrator(&catalog).describe(&Bmi::new(), "fr");
        assert_eq!(description.locale, "en");
        assert_eq!(description.meta.id, "bmi");
        let json = serde_json::to_value(&description).unwrap();
        assert_eq!(json["config"]["fields"][0]["unitType"], "weight");
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Normalize.to_string(), "normalize");
    }
}
