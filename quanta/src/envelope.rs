//! Result envelope: the output contract of one calculation

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use quanta_core::{QuantaError, Value};

/// Complete output of one calculation.
///
/// An invalid envelope means "not yet computable": values, formatted
/// strings, metadata and summary are all empty and `issues` says why.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    /// Result id to raw value in its display unit (null when suppressed)
    pub values: BTreeMap<String, Value>,
    /// Result id to display string (empty when suppressed)
    pub formatted: BTreeMap<String, String>,
    pub summary: String,
    pub is_valid: bool,
    /// Chart series and table rows, passed through verbatim
    pub metadata: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<QuantaError>,
}

impl ResultEnvelope {
    pub fn invalid(issues: Vec<QuantaError>) -> Self {
        ResultEnvelope {
            is_valid: false,
            issues,
            ..Default::default()
        }
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn number(&self, id: &str) -> Option<f64> {
        self.value(id).and_then(|v| v.as_number())
    }

    pub fn formatted(&self, id: &str) -> Option<&str> {
        self.formatted.get(id).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_is_empty() {
        let env = ResultEnvelope::invalid(vec![QuantaError::missing_required_field("weight")]);
        assert!(!env.is_valid);
        assert!(env.values.is_empty());
        assert!(env.formatted.is_empty());
        assert!(env.metadata.is_empty());
        assert!(env.summary.is_empty());
        assert_eq!(env.issues.len(), 1);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(ResultEnvelope::default()).unwrap();
        assert_eq!(json["isValid"], false);
        assert!(json["values"].is_object());
        assert!(json.get("issues").is_none());
    }
}
