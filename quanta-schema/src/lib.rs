//! Quanta Schema - Declarative input model
//!
//! Field descriptors, conditional visibility, validation of raw
//! submissions (strict for users, lenient for presets) and presets.

mod field;
mod input;
mod check;
mod preset;
pub mod validate;
pub mod visibility;

pub use field::{FieldDescriptor, FieldOption, FieldType, ShowWhen};
pub use input::{FieldValue, FieldValues, RawInputs};
pub use check::check_fields;
pub use preset::Preset;
pub use validate::{validate, Mode, ValidationFailure, Validator};
