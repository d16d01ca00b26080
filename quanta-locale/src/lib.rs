//! Quanta Locale - Templates and locale-aware formatting
//!
//! - `LocaleTable`: one locale's plural rule, separators, templates, unit labels
//! - `Catalog`: every table as one immutable snapshot, with fallbacks
//! - `LocaleStore`: the snapshot behind an atomic swap, for hot reload
//! - `Formatter`: numbers, quantities and durations for one table

mod plural;
mod table;
mod template;
mod format;
mod catalog;
mod store;

use std::sync::LazyLock;

pub use plural::{PluralCategory, PluralRule};
pub use table::{LocaleTable, NumberSymbols, UnitLabel};
pub use template::{args, substitute, TemplateArgs};
pub use format::{format_number, Formatter, NumberStyle, NOT_A_NUMBER};
pub use catalog::{Catalog, Templates, DEFAULT_LOCALE};
pub use store::LocaleStore;

/// Builtin catalog for the convenience functions below
static BUILTIN: LazyLock<Catalog> = LazyLock::new(Catalog::builtin);

/// Render a builtin template
pub fn render(key: &str, locale: &str, args: &TemplateArgs) -> String {
    BUILTIN.render(key, locale, args)
}

/// Format a duration in seconds with the builtin tables
pub fn format_duration(seconds: f64, locale: &str) -> String {
    BUILTIN.formatter(locale, NumberStyle::default()).duration(seconds)
}

/// Format a number and a label with the builtin tables
pub fn format_quantity(value: f64, unit_label: &str, locale: &str) -> String {
    BUILTIN.formatter(locale, NumberStyle::default()).quantity(value, unit_label)
}
