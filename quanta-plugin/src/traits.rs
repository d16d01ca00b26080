//! Calculator trait

use serde::Serialize;
use crate::{CalcInputs, CalcOutput, CalculatorConfig};

/// Metadata for a calculator
#[derive(Debug, Clone, Serialize)]
pub struct CalculatorMeta {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub related: &'static [&'static str],
}

/// A domain calculator: a declarative config plus one pure function.
///
/// `calculate` receives inputs already validated and converted to base
/// units and returns results in base units. It must be deterministic and
/// total over its declared inputs; the engine does not catch faults.
pub trait Calculator: Send + Sync {
    fn meta(&self) -> CalculatorMeta;
    fn config(&self) -> &CalculatorConfig;
    fn calculate(&self, inputs: &CalcInputs) -> CalcOutput;
}
