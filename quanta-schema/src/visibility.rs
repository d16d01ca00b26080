//! Conditional visibility
//!
//! Each `showWhen` predicate is an edge from a field to a field declared
//! before it. Checking that ordering once at config time makes the graph
//! acyclic, so visibility can be resolved in a single pass in declaration
//! order.

use std::collections::HashSet;
use quanta_core::{QuantaError, QuantaResult};
use crate::field::{FieldDescriptor, ShowWhen};
use crate::input::FieldValues;

/// Check that every predicate references a field declared earlier
pub fn check_graph(calculator: &str, fields: &[FieldDescriptor]) -> QuantaResult<()> {
    let mut declared: HashSet<&str> = HashSet::new();

    for field in fields {
        if let Some(predicate) = &field.show_when {
            if predicate.field == field.id {
                return Err(QuantaError::invalid_config(
                    calculator,
                    format!("field '{}' is conditioned on itself", field.id),
                ));
            }
            if !declared.contains(predicate.field.as_str()) {
                let reason = if fields.iter().any(|f| f.id == predicate.field) {
                    "a field declared after it"
                } else {
                    "an unknown field"
                };
                return Err(QuantaError::invalid_config(
                    calculator,
                    format!("field '{}' is conditioned on {} ('{}')", field.id, reason, predicate.field),
                )
                .in_field(&field.id));
            }
        }
        declared.insert(field.id.as_str());
    }

    Ok(())
}

/// Evaluate a predicate against the values resolved so far. A reference to
/// a hidden (hence unresolved) field is false.
pub fn evaluate(predicate: &ShowWhen, resolved: &FieldValues) -> bool {
    resolved
        .value(&predicate.field)
        .map(|current| current.matches(&predicate.value))
        .unwrap_or(false)
}

pub fn is_visible(field: &FieldDescriptor, resolved: &FieldValues) -> bool {
    field
        .show_when
        .as_ref()
        .map(|p| evaluate(p, resolved))
        .unwrap_or(true)
}
