//! Quanta Core - Fundamental types
//!
//! This crate provides the core types used throughout Quanta:
//! - `Value`: Raw field and result values (numbers, text, flags, lists)
//! - `QuantaError`: Structured errors carried in result envelopes

mod error;
mod value;

pub use error::{codes, QuantaError, Severity};
pub use value::Value;

/// Result alias used across the workspace
pub type QuantaResult<T> = Result<T, QuantaError>;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{QuantaError, QuantaResult, Severity, Value};
}

#[cfg(test)]
mod tests {
    use super::*;

    mod value_tests {
        use super::*;
        use std::collections::BTreeMap;

        #[test]
        fn test_from_f64() {
            let v: Value = 70.0.into();
            assert_eq!(v.as_number(), Some(70.0));
        }

        #[test]
        fn test_from_str() {
            let v: Value = "lose".into();
            assert_eq!(v.as_text(), Some("lose"));
        }

        #[test]
        fn test_type_name() {
            assert_eq!(Value::Number(0.0).type_name(), "Number");
            assert_eq!(Value::Text(String::new()).type_name(), "Text");
            assert_eq!(Value::Bool(true).type_name(), "Bool");
            assert_eq!(Value::Null.type_name(), "Null");
        }

        #[test]
        fn test_json_is_plain() {
            let v: Value = serde_json::from_str("[5, 11]").unwrap();
            assert_eq!(v.as_pair(), Some((5.0, 11.0)));

            let v: Value = serde_json::from_str("null").unwrap();
            assert!(v.is_null());

            let v: Value = serde_json::from_str("\"maintain\"").unwrap();
            assert_eq!(v.as_text(), Some("maintain"));

            let mut obj = BTreeMap::new();
            obj.insert("kcal".to_string(), Value::Number(2000.0));
            let json = serde_json::to_string(&Value::Object(obj)).unwrap();
            assert_eq!(json, r#"{"kcal":2000.0}"#);
        }

        #[test]
        fn test_loose_matching() {
            assert!(Value::Text("true".into()).matches(&Value::Bool(true)));
            assert!(Value::Number(5.0).matches(&Value::Text("5".into())));
            assert!(!Value::Text("lose".into()).matches(&Value::Text("gain".into())));
            assert!(!Value::Null.matches(&Value::Text("lose".into())));
        }

        #[test]
        fn test_pair_requires_two_numbers() {
            let v = Value::List(vec![Value::Number(5.0)]);
            assert_eq!(v.as_pair(), None);
            let v = Value::List(vec![Value::Number(5.0), Value::Text("x".into())]);
            assert_eq!(v.as_pair(), None);
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_error_construction() {
            let err = QuantaError::missing_required_field("weight");
            assert_eq!(err.code, codes::MISSING_REQUIRED_FIELD);
            assert_eq!(err.field.as_deref(), Some("weight"));
            assert_eq!(err.severity, Severity::Error);
        }

        #[test]
        fn test_config_errors_are_fatal() {
            assert_eq!(QuantaError::unknown_unit("kg", "length").severity, Severity::Fatal);
            assert_eq!(QuantaError::unknown_dimension("mass").severity, Severity::Fatal);
        }

        #[test]
        fn test_out_of_range_message() {
            let err = QuantaError::out_of_range("age", 150.0, Some(15.0), Some(100.0));
            assert!(err.message.contains("[15, 100]"), "{}", err.message);
        }

        #[test]
        fn test_error_display() {
            let err = QuantaError::parse_error("unexpected token");
            let display = format!("{}", err);
            assert!(display.contains("PARSE_ERROR"));
        }

        #[test]
        fn test_error_display_with_suggestion() {
            let err = QuantaError::unknown_calculator("pace").with_suggestion("Did you mean 'running_pace'?");
            let boxed: Box<dyn std::error::Error> = Box::new(err.clone());
            assert_eq!(
                boxed.to_string(),
                format!("[{}] {} (suggestion: Did you mean 'running_pace'?)", err.code, err.message)
            );
            assert!(boxed.source().is_none());
        }

        #[test]
        fn test_error_roundtrip() {
            let err = QuantaError::out_of_range("age", 5.0, Some(15.0), None);
            let json = serde_json::to_string(&err).unwrap();
            let back: QuantaError = serde_json::from_str(&json).unwrap();
            assert_eq!(err, back);
        }
    }
}
