//! Config-time checks on a field list
//!
//! These run once, when a calculator is registered, so that unknown
//! dimensions, unknown units and bad visibility references never surface
//! at request time.

use std::collections::HashSet;
use quanta_core::{QuantaError, QuantaResult};
use quanta_units::UnitRegistry;
use crate::field::FieldDescriptor;
use crate::visibility::check_graph;

pub fn check_fields(calculator: &str, fields: &[FieldDescriptor], registry: &UnitRegistry) -> QuantaResult<()> {
    let mut seen = HashSet::new();

    for field in fields {
        if !seen.insert(field.id.as_str()) {
            return Err(QuantaError::invalid_config(
                calculator,
                format!("field '{}' declared twice", field.id),
            ));
        }

        if let (Some(min), Some(max)) = (field.min, field.max) {
            if min > max {
                return Err(QuantaError::invalid_config(
                    calculator,
                    format!("field '{}' has min {} above max {}", field.id, min, max),
                )
                .in_field(&field.id));
            }
        }

        if field.kind.has_options() && field.options.is_empty() {
            return Err(QuantaError::invalid_config(
                calculator,
                format!("field '{}' has no options", field.id),
            )
            .in_field(&field.id));
        }

        check_units(calculator, field, registry)?;
    }

    check_graph(calculator, fields)
}

fn check_units(calculator: &str, field: &FieldDescriptor, registry: &UnitRegistry) -> QuantaResult<()> {
    let Some(dimension) = &field.unit_type else {
        if field.default_unit.is_some() || !field.allowed_units.is_empty() {
            return Err(QuantaError::invalid_config(
                calculator,
                format!("field '{}' lists units but has no unitType", field.id),
            ));
        }
        return Ok(());
    };

    if !field.kind.is_numeric() {
        return Err(QuantaError::invalid_config(
            calculator,
            format!("field '{}' binds a dimension but is not numeric", field.id),
        ));
    }

    registry
        .dimension(dimension)
        .map_err(|e| QuantaError::from(e).in_field(&field.id))?;

    let known = |unit: &str| -> QuantaResult<()> {
        if registry.contains(unit, dimension) {
            Ok(())
        } else {
            Err(QuantaError::unknown_unit(unit, dimension).in_field(&field.id))
        }
    };

    for unit in &field.allowed_units {
        known(unit)?;
    }
    if let Some(default_unit) = &field.default_unit {
        known(default_unit)?;
        if !field.allows_unit(default_unit) {
            return Err(QuantaError::invalid_config(
                calculator,
                format!("default unit '{}' of field '{}' is not allowed", default_unit, field.id),
            ));
        }
    }

    Ok(())
}
