//! Quanta Plugin System
//!
//! Calculators extend Quanta with one domain each. A calculator is a
//! declarative `CalculatorConfig` (fields, presets, result descriptors,
//! templates, charts) plus a pure `calculate` over base-unit inputs.

mod traits;
mod config;
mod inputs;
mod registry;

pub use traits::{Calculator, CalculatorMeta};
pub use config::{
    CalculatorConfig, ChartDescriptor, ChartKind,
    ResultDescriptor, ResultKind, UnitSource,
};
pub use inputs::{object, CalcInputs, CalcOutput};
pub use registry::CalculatorRegistry;

/// Re-export core types for calculator authors
pub mod prelude {
    pub use crate::{
        Calculator, CalculatorMeta, CalculatorConfig, CalculatorRegistry,
        ChartDescriptor, ChartKind, ResultDescriptor, ResultKind, UnitSource,
        CalcInputs, CalcOutput, object,
    };
    pub use quanta_core::prelude::*;
    pub use quanta_schema::{FieldDescriptor, Preset};
}
