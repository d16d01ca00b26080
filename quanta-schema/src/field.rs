//! Field descriptors: the declarative description of one input

use serde::{Serialize, Deserialize};
use quanta_core::Value;

/// Declared input type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    Radio,
    Select,
    Slider,
    Toggle,
}

impl FieldType {
    /// Number-like fields carry bounds and may bind a dimension
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Slider)
    }

    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Radio | FieldType::Select)
    }
}

/// One choice of a radio or select field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    /// Template key of the option label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl From<&str> for FieldOption {
    fn from(value: &str) -> Self {
        FieldOption { value: value.to_string(), label: None }
    }
}

/// Visibility predicate: visible while `field` currently equals `value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowWhen {
    pub field: String,
    pub value: Value,
}

/// Immutable description of one input field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default)]
    pub default_value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Dimension id this field is bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_unit: Option<String>,
    /// Empty means every unit of the dimension
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_units: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Absent resolves to null instead of a missing-field issue
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<ShowWhen>,
}

impl FieldDescriptor {
    pub fn new(id: &str, kind: FieldType) -> Self {
        FieldDescriptor {
            id: id.to_string(),
            kind,
            default_value: Value::Null,
            min: None,
            max: None,
            step: None,
            unit_type: None,
            default_unit: None,
            allowed_units: Vec::new(),
            options: Vec::new(),
            optional: false,
            show_when: None,
        }
    }

    pub fn number(id: &str) -> Self {
        Self::new(id, FieldType::Number)
    }

    pub fn slider(id: &str, min: f64, max: f64, step: f64) -> Self {
        Self::new(id, FieldType::Slider).bounds(min, max).with_step(step)
    }

    pub fn radio(id: &str, options: &[&str]) -> Self {
        Self::new(id, FieldType::Radio).with_options(options)
    }

    pub fn select(id: &str, options: &[&str]) -> Self {
        Self::new(id, FieldType::Select).with_options(options)
    }

    pub fn toggle(id: &str) -> Self {
        Self::new(id, FieldType::Toggle)
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Bind to a dimension with the unit used for defaults and bounds
    pub fn with_unit(mut self, dimension: &str, default_unit: &str) -> Self {
        self.unit_type = Some(dimension.to_string());
        self.default_unit = Some(default_unit.to_string());
        self
    }

    pub fn allow_units(mut self, units: &[&str]) -> Self {
        self.allowed_units = units.iter().map(|u| u.to_string()).collect();
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| FieldOption::from(*o)).collect();
        self
    }

    /// Label every option with the template key `<prefix>.<value>`
    pub fn labelled(mut self, prefix: &str) -> Self {
        for option in &mut self.options {
            option.label = Some(format!("{}.{}", prefix, option.value));
        }
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn show_when(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.show_when = Some(ShowWhen {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn is_dimensional(&self) -> bool {
        self.unit_type.is_some()
    }

    /// Whether `unit` may be chosen for this field. Dimension membership is
    /// checked separately against the registry.
    pub fn allows_unit(&self, unit: &str) -> bool {
        self.allowed_units.is_empty() || self.allowed_units.iter().any(|u| u == unit)
    }

    pub fn option(&self, value: &Value) -> Option<&FieldOption> {
        self.options
            .iter()
            .find(|o| value.matches(&Value::Text(o.value.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let field = FieldDescriptor::number("weight")
            .with_unit("weight", "kg")
            .allow_units(&["kg", "lbs"])
            .bounds(20.0, 300.0)
            .with_default(70.0);

        assert!(field.is_dimensional());
        assert!(field.allows_unit("lbs"));
        assert!(!field.allows_unit("st"));
        assert_eq!(field.default_value, Value::Number(70.0));
    }

    #[test]
    fn test_json_contract() {
        let json = r#"{
            "id": "deficitPercent",
            "type": "slider",
            "defaultValue": 20,
            "min": 5,
            "max": 40,
            "step": 1,
            "showWhen": { "field": "goal", "value": "lose" }
        }"#;
        let field: FieldDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(field.kind, FieldType::Slider);
        assert_eq!(field.max, Some(40.0));
        assert_eq!(field.show_when.unwrap().value, Value::Text("lose".into()));
        assert!(!field.optional);
    }

    #[test]
    fn test_serializes_camel_case() {
        let field = FieldDescriptor::number("height").with_unit("length", "cm");
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "number");
        assert_eq!(json["unitType"], "length");
        assert_eq!(json["defaultUnit"], "cm");
        assert!(json.get("allowedUnits").is_none());
    }

    #[test]
    fn test_option_lookup_is_loose() {
        let field = FieldDescriptor::select("level", &["1", "2"]);
        assert!(field.option(&Value::Number(2.0)).is_some());
        assert!(field.option(&Value::Text("3".into())).is_none());
    }

    #[test]
    fn test_labelled_options() {
        let field = FieldDescriptor::radio("goal", &["lose", "gain"]).labelled("goal");
        let label = field.option(&Value::from("gain")).and_then(|o| o.label.as_deref());
        assert_eq!(label, Some("goal.gain"));
    }
}
