//! Structured errors
//!
//! Errors are values. Validation problems travel inside the result envelope
//! as a list of issues, configuration problems surface once at startup, and
//! translation gaps are logged and recovered. Nothing here panics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const UNKNOWN_DIMENSION: &str = "UNKNOWN_DIMENSION";
    pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
    pub const OUT_OF_RANGE: &str = "OUT_OF_RANGE";
    pub const MISSING_REQUIRED_FIELD: &str = "MISSING_REQUIRED_FIELD";
    pub const INVALID_VALUE: &str = "INVALID_VALUE";
    pub const MISSING_TRANSLATION: &str = "MISSING_TRANSLATION";
    pub const INVALID_CONFIG: &str = "INVALID_CONFIG";
    pub const UNKNOWN_CALCULATOR: &str = "UNKNOWN_CALCULATOR";
    pub const UNKNOWN_PRESET: &str = "UNKNOWN_PRESET";
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Recovered locally, result still usable
    Warning,
    /// The request cannot be computed as submitted
    Error,
    /// The engine configuration is broken
    Fatal,
}

/// Structured error shared by every Quanta crate
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("[{code}] {message}{}", suggestion_suffix(.suggestion))]
pub struct QuantaError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Input field the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Severity level
    pub severity: Severity,
}

impl QuantaError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            field: None,
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: attach the offending field
    pub fn in_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }

    // ========== Common Error Constructors ==========

    pub fn unknown_dimension(dimension: &str) -> Self {
        Self::new(codes::UNKNOWN_DIMENSION, format!("Unknown dimension: {}", dimension))
            .with_suggestion("Register the dimension or fix the calculator config")
            .with_severity(Severity::Fatal)
    }

    pub fn unknown_unit(unit: &str, dimension: &str) -> Self {
        Self::new(
            codes::UNKNOWN_UNIT,
            format!("Unit '{}' is not registered in dimension '{}'", unit, dimension),
        )
        .with_suggestion(format!("Use one of the units registered under '{}'", dimension))
        .with_severity(Severity::Fatal)
    }

    pub fn out_of_range(field: &str, value: f64, min: Option<f64>, max: Option<f64>) -> Self {
        let range = match (min, max) {
            (Some(lo), Some(hi)) => format!("[{}, {}]", lo, hi),
            (Some(lo), None) => format!("[{}, ∞)", lo),
            (None, Some(hi)) => format!("(-∞, {}]", hi),
            (None, None) => "(-∞, ∞)".to_string(),
        };
        Self::new(
            codes::OUT_OF_RANGE,
            format!("Field '{}' value {} is outside {}", field, value, range),
        )
        .in_field(field)
    }

    pub fn missing_required_field(field: &str) -> Self {
        Self::new(codes::MISSING_REQUIRED_FIELD, format!("Missing required field: {}", field))
            .in_field(field)
    }

    pub fn invalid_value(field: &str, expected: &str, got: &str) -> Self {
        Self::new(
            codes::INVALID_VALUE,
            format!("Field '{}': expected {}, got {}", field, expected, got),
        )
        .in_field(field)
    }

    pub fn missing_translation(locale: &str, key: &str) -> Self {
        Self::new(
            codes::MISSING_TRANSLATION,
            format!("No '{}' string for locale '{}'", key, locale),
        )
        .with_severity(Severity::Warning)
    }

    pub fn invalid_config(calculator: &str, details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_CONFIG,
            format!("Invalid config for '{}': {}", calculator, details.into()),
        )
        .with_severity(Severity::Fatal)
    }

    pub fn unknown_calculator(name: &str) -> Self {
        Self::new(codes::UNKNOWN_CALCULATOR, format!("Unknown calculator: {}", name))
            .with_suggestion("List calculators with calculators/list")
    }

    pub fn unknown_preset(calculator: &str, preset: &str) -> Self {
        Self::new(
            codes::UNKNOWN_PRESET,
            format!("Calculator '{}' has no preset '{}'", calculator, preset),
        )
    }

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
            .with_severity(Severity::Fatal)
    }
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (suggestion: {})", s),
        None => String::new(),
    }
}

impl From<serde_json::Error> for QuantaError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse_error(err.to_string())
    }
}
