//! Quanta Units - Dimensional unit registry and conversion
//!
//! Every quantity belongs to exactly one dimension and converts through
//! that dimension's base unit. Units of different dimensions are never
//! interconvertible.
//!
//! Dimensions:
//! - Weight (kg, g, lbs, oz, st)
//! - Length (cm, mm, m, km, in, ft, yd, mi, composite ft_in)
//! - Data volume (bit, B, KB..TB, KiB..TiB, Kb..Gb)
//! - Data rate (bps, Kbps..Tbps, Bps..GBps)
//! - Duration (s, ms, min, h, day, week)
//! - Speed (m/s, km/h, mph)
//! - Energy (kcal, kJ, cal)

pub mod dimension;
mod unit;
mod convert;
mod parse;
mod units;

pub use dimension::Dimension;
pub use unit::{Unit, CompositeUnit, CompositeValue, ConversionError};
pub use convert::{Converter, Magnitude, to_base, from_base, convert};
pub use parse::{parse_quantity, parse_quantity_in, ParsedQuantity};
pub use units::{UnitRegistry, UnitTable, DimensionDef, UnitDef, CompositeDef, UNITS};
