//! Result renderer
//!
//! Takes raw calculator output (base units) back into each result's display
//! unit and formats it for one locale. Inputs are formatted the same way so
//! the summary template can quote them.

use std::collections::BTreeMap;
use tracing::warn;
use quanta_core::Value;
use quanta_locale::{args, Catalog, Formatter, NumberStyle, TemplateArgs, NOT_A_NUMBER};
use quanta_plugin::{CalculatorConfig, ResultDescriptor, ResultKind, UnitSource};
use quanta_schema::{visibility, FieldDescriptor, FieldType, FieldValue, FieldValues};
use quanta_units::{CompositeValue, Converter, Magnitude, UnitRegistry};

/// One result after denormalization
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Raw value in the display unit (`[major, minor]` for composites)
    pub value: Value,
    pub formatted: String,
}

impl Rendered {
    fn new(value: Value, formatted: String) -> Self {
        Rendered { value, formatted }
    }

    /// A result whose `showWhen` is false
    pub fn suppressed() -> Self {
        Rendered::new(Value::Null, String::new())
    }
}

/// Renderer for one calculator in one (already resolved) locale
pub struct Renderer<'a> {
    config: &'a CalculatorConfig,
    catalog: &'a Catalog,
    locale: &'a str,
    formatter: Formatter<'a>,
    converter: Converter<'a>,
}

impl<'a> Renderer<'a> {
    pub fn new(
        config: &'a CalculatorConfig,
        catalog: &'a Catalog,
        locale: &'a str,
        style: NumberStyle,
        units: &'a UnitRegistry,
    ) -> Self {
        Renderer {
            config,
            catalog,
            locale,
            formatter: catalog.formatter(locale, style),
            converter: Converter::new(units),
        }
    }

    pub fn locale(&self) -> &str {
        self.locale
    }

    /// Render every declared result the calculator produced, in declaration
    /// order. Suppressed results are always present.
    pub fn results(&self, produced: &BTreeMap<String, Value>, inputs: &FieldValues) -> Vec<(String, Rendered)> {
        self.config
            .results
            .iter()
            .filter_map(|result| {
                self.result(result, produced.get(&result.id), inputs)
                    .map(|rendered| (result.id.clone(), rendered))
            })
            .collect()
    }

    /// Render one result. `None` when the calculator did not produce it.
    pub fn result(&self, result: &ResultDescriptor, raw: Option<&Value>, inputs: &FieldValues) -> Option<Rendered> {
        if let Some(predicate) = &result.show_when {
            if !visibility::evaluate(predicate, inputs) {
                return Some(Rendered::suppressed());
            }
        }
        let raw = raw?;

        let formatter = match result.max_fraction_digits {
            Some(digits) => self.formatter.with_fraction_digits(digits),
            None => self.formatter,
        };

        let mut rendered = match (result.kind, raw) {
            (_, Value::Null) => Rendered::new(Value::Null, String::new()),
            (ResultKind::Quantity, Value::Number(base)) => self.quantity(&formatter, result, *base, inputs),
            (ResultKind::Duration, Value::Number(n)) => Rendered::new(raw.clone(), formatter.duration(*n)),
            (ResultKind::Percent, Value::Number(n)) => Rendered::new(raw.clone(), formatter.percent(*n)),
            (ResultKind::Number, Value::Number(n)) => Rendered::new(raw.clone(), formatter.number(*n)),
            (_, Value::Bool(b)) => Rendered::new(raw.clone(), self.yes_no(*b)),
            (_, other) => Rendered::new(other.clone(), self.plain(other)),
        };

        if let Some(key) = &result.template {
            if !rendered.formatted.is_empty() {
                rendered.formatted = self.catalog.render_with(
                    Some(&self.config.templates),
                    key,
                    self.locale,
                    &args([("value", rendered.formatted.as_str())]),
                );
            }
        }
        Some(rendered)
    }

    /// Unit a quantity result is displayed in
    pub fn display_unit<'s>(&'s self, result: &'s ResultDescriptor, inputs: &'s FieldValues) -> Option<&'s str> {
        let chosen = |field: &str| -> Option<&'s str> {
            inputs
                .unit(field)
                .or_else(|| self.config.field(field).and_then(|f| f.default_unit.as_deref()))
        };

        match result.unit.as_ref()? {
            UnitSource::Fixed { unit } => Some(unit.as_str()),
            UnitSource::Mirror { field } => chosen(field),
            UnitSource::Mapped { field, map, fallback } => Some(
                chosen(field)
                    .and_then(|unit| map.get(unit))
                    .unwrap_or(fallback)
                    .as_str(),
            ),
        }
    }

    fn quantity(&self, formatter: &Formatter<'_>, result: &ResultDescriptor, base: f64, inputs: &FieldValues) -> Rendered {
        let Some(dimension) = result.dimension.as_deref() else {
            return Rendered::new(Value::Number(base), formatter.number(base));
        };
        let registry = self.converter.registry();
        let unit = match self.display_unit(result, inputs) {
            Some(unit) => unit.to_string(),
            None => match registry.dimension(dimension) {
                Ok(d) => d.base_unit.clone(),
                Err(_) => return Rendered::new(Value::Number(base), formatter.number(base)),
            },
        };

        match self.converter.magnitude_from_base(base, &unit, dimension) {
            Ok(Magnitude::Scalar(value)) => Rendered::new(Value::Number(value), formatter.quantity_of(value, &unit)),
            Ok(Magnitude::Composite(parts)) => Rendered::new(
                Magnitude::Composite(parts).to_value(),
                self.composite(formatter, parts, &unit, dimension),
            ),
            Err(e) => {
                warn!(result = %result.id, unit = %unit, error = %e, "result could not be denormalized");
                Rendered::new(Value::Number(base), NOT_A_NUMBER.to_string())
            }
        }
    }

    fn composite(&self, formatter: &Formatter<'_>, parts: CompositeValue, unit: &str, dimension: &str) -> String {
        match self.converter.registry().composite(unit, dimension) {
            Ok(composite) => formatter.composite(
                parts.major,
                formatter.unit_label(&composite.major, parts.major),
                parts.minor,
                formatter.unit_label(&composite.minor, parts.minor),
            ),
            Err(_) => NOT_A_NUMBER.to_string(),
        }
    }

    /// An input value as the user would read it back
    pub fn input(&self, field: &FieldDescriptor, input: &FieldValue) -> String {
        let value = &input.value;
        match field.kind {
            FieldType::Number | FieldType::Slider => {
                let (Some(dimension), Some(unit)) = (field.unit_type.as_deref(), input.unit.as_deref()) else {
                    return match value {
                        Value::Number(n) => self.formatter.number(*n),
                        other => self.plain(other),
                    };
                };
                match Magnitude::from_value(value) {
                    Some(Magnitude::Scalar(n)) => self.formatter.quantity_of(n, unit),
                    Some(Magnitude::Composite(parts)) => self.composite(&self.formatter, parts, unit, dimension),
                    None => self.plain(value),
                }
            }
            FieldType::Radio | FieldType::Select => field
                .option(value)
                .and_then(|option| option.label.as_deref())
                .and_then(|key| self.catalog.template_with(Some(&self.config.templates), key, self.locale))
                .map(str::to_string)
                .unwrap_or_else(|| self.plain(value)),
            FieldType::Toggle => match value.as_bool() {
                Some(b) => self.yes_no(b),
                None => self.plain(value),
            },
        }
    }

    /// Template arguments for the summary: every visible input by field id,
    /// then every rendered result by result id
    pub fn summary_args(&self, inputs: &FieldValues, formatted: &BTreeMap<String, String>) -> TemplateArgs {
        let mut summary = TemplateArgs::new();
        for field in &self.config.fields {
            if let Some(input) = inputs.get(&field.id) {
                summary.insert(field.id.clone(), self.input(field, input));
            }
        }
        summary.extend(formatted.iter().map(|(k, v)| (k.clone(), v.clone())));
        summary
    }

    /// The calculator's summary line, empty when it declares none
    pub fn summary(&self, summary_args: &TemplateArgs) -> String {
        match &self.config.summary_key {
            Some(key) => self
                .catalog
                .render_with(Some(&self.config.templates), key, self.locale, summary_args),
            None => String::new(),
        }
    }

    /// Label for a template key, if any locale has it
    pub fn label(&self, key: &str) -> Option<&'a str> {
        self.catalog.template_with(Some(&self.config.templates), key, self.locale)
    }

    fn yes_no(&self, b: bool) -> String {
        let key = if b { "common.yes" } else { "common.no" };
        self.label(key)
            .map(str::to_string)
            .unwrap_or_else(|| b.to_string())
    }

    fn plain(&self, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::Number(n) => self.formatter.number(*n),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quanta_schema::ShowWhen;
    use quanta_units::UNITS;

    fn config() -> CalculatorConfig {
        CalculatorConfig::new("demo")
            .with_field(FieldDescriptor::number("height").with_unit("length", "cm"))
            .with_field(FieldDescriptor::number("distance").with_unit("length", "km").allow_units(&["km", "mi"]))
            .with_field(FieldDescriptor::radio("goal", &["lose", "maintain"]))
            .with_result(ResultDescriptor::quantity("heightOut", "length", UnitSource::mirror("height")))
            .with_result(ResultDescriptor::quantity(
                "speed",
                "speed",
                UnitSource::mapped("distance", &[("km", "km/h"), ("mi", "mph")], "km/h"),
            ))
            .with_result(ResultDescriptor::duration("time"))
            .with_result(ResultDescriptor::percent("share").digits(0))
            .with_result(ResultDescriptor::number("deficit").show_when("goal", "lose"))
            .with_result(ResultDescriptor::number("kcal").with_template("kcal.value"))
            .with_templates("en", &[("kcal.value", "{value} kcal/day"), ("summary", "{goal}: {kcal}")])
            .with_summary("summary")
    }

    fn inputs(height_unit: &str, distance_unit: &str, goal: &str) -> FieldValues {
        let mut values = FieldValues::new();
        values.insert("height", FieldValue::new(Value::Number(180.0), Some(height_unit.to_string())));
        values.insert("distance", FieldValue::new(Value::Number(10.0), Some(distance_unit.to_string())));
        values.insert("goal", FieldValue::plain(Value::from(goal)));
        values
    }

    fn render(config: &CalculatorConfig, id: &str, raw: Value, inputs: &FieldValues) -> Option<Rendered> {
        let catalog = Catalog::builtin();
        let renderer = Renderer::new(config, &catalog, "en", NumberStyle::default(), &UNITS);
        let result = config.results.iter().find(|r| r.id == id).unwrap();
        renderer.result(result, Some(&raw), inputs)
    }

    #[test]
    fn test_mirror_composite_unit() {
        let config = config();
        let out = render(&config, "heightOut", Value::Number(180.34), &inputs("ft_in", "km", "lose")).unwrap();
        assert_eq!(out.formatted, "5 ft 11 in");
        let (major, minor) = out.value.as_pair().unwrap();
        assert_eq!(major, 5.0);
        assert!((minor - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_mapped_unit() {
        let config = config();
        // 10 km/h in m/s
        let base = Value::Number(10.0 / 3.6);
        let km = render(&config, "speed", base.clone(), &inputs("cm", "km", "lose")).unwrap();
        assert_eq!(km.formatted, "10 km/h");
        let mi = render(&config, "speed", base, &inputs("cm", "mi", "lose")).unwrap();
        assert_eq!(mi.formatted, "6.21 mph");
    }

    #[test]
    fn test_duration_and_percent() {
        let config = config();
        let values = inputs("cm", "km", "lose");
        assert_eq!(render(&config, "time", Value::Number(3661.0), &values).unwrap().formatted, "1 hour, 1 minute, 1 second");
        assert_eq!(render(&config, "share", Value::Number(33.333), &values).unwrap().formatted, "33%");
    }

    #[test]
    fn test_suppressed_result() {
        let config = config();
        let out = render(&config, "deficit", Value::Number(500.0), &inputs("cm", "km", "maintain")).unwrap();
        assert_eq!(out, Rendered::suppressed());
    }

    #[test]
    fn test_result_template() {
        let config = config();
        let out = render(&config, "kcal", Value::Number(2150.4), &inputs("cm", "km", "lose")).unwrap();
        assert_eq!(out.formatted, "2,150.4 kcal/day");
        assert_eq!(out.value, Value::Number(2150.4));
    }

    #[test]
    fn test_non_finite_result() {
        let config = config();
        let out = render(&config, "heightOut", Value::Number(f64::NAN), &inputs("cm", "km", "lose")).unwrap();
        assert_eq!(out.formatted, NOT_A_NUMBER);
    }

    #[test]
    fn test_unproduced_result_omitted() {
        let config = config();
        let catalog = Catalog::builtin();
        let renderer = Renderer::new(&config, &catalog, "en", NumberStyle::default(), &UNITS);
        let produced = BTreeMap::from([("kcal".to_string(), Value::Number(2000.0))]);
        let rendered = renderer.results(&produced, &inputs("cm", "km", "maintain"));
        let ids: Vec<&str> = rendered.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["deficit", "kcal"]);
    }

    #[test]
    fn test_summary_quotes_inputs() {
        let config = config();
        let catalog = Catalog::builtin();
        let renderer = Renderer::new(&config, &catalog, "en", NumberStyle::default(), &UNITS);
        let values = inputs("cm", "km", "lose");
        let formatted = BTreeMap::from([("kcal".to_string(), "2,000 kcal/day".to_string())]);
        let summary_args = renderer.summary_args(&values, &formatted);
        assert_eq!(summary_args["height"], "180 cm");
        assert_eq!(renderer.summary(&summary_args), "lose: 2,000 kcal/day");
    }

    #[test]
    fn test_show_when_on_hidden_input() {
        let config = config();
        let mut values = FieldValues::new();
        values.insert("height", FieldValue::new(Value::Number(180.0), Some("cm".to_string())));
        let predicate = ShowWhen { field: "goal".into(), value: Value::from("lose") };
        assert!(!visibility::evaluate(&predicate, &values));
        assert_eq!(render(&config, "deficit", Value::Number(1.0), &values).unwrap(), Rendered::suppressed());
    }
}
