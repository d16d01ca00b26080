//! Locale-aware formatting of numbers, quantities and durations

use serde::{Serialize, Deserialize};
use crate::table::LocaleTable;

/// Rendered in place of NaN and infinities
pub const NOT_A_NUMBER: &str = "—";

/// Numeric display settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberStyle {
    pub max_fraction_digits: usize,
    /// Non-zero magnitudes below this switch to scientific notation
    pub scientific_below: f64,
    /// Magnitudes at or above this switch to scientific notation
    pub scientific_from: f64,
}

impl Default for NumberStyle {
    fn default() -> Self {
        NumberStyle {
            max_fraction_digits: 2,
            scientific_below: 1e-3,
            scientific_from: 1e15,
        }
    }
}

impl NumberStyle {
    pub fn with_fraction_digits(mut self, digits: usize) -> Self {
        self.max_fraction_digits = digits;
        self
    }
}

/// Formatter for one locale table
#[derive(Debug, Clone, Copy)]
pub struct Formatter<'a> {
    table: &'a LocaleTable,
    style: NumberStyle,
}

impl<'a> Formatter<'a> {
    pub fn new(table: &'a LocaleTable, style: NumberStyle) -> Self {
        Formatter { table, style }
    }

    pub fn table(&self) -> &'a LocaleTable {
        self.table
    }

    pub fn style(&self) -> NumberStyle {
        self.style
    }

    /// Same table, different fraction digits
    pub fn with_fraction_digits(self, digits: usize) -> Self {
        Formatter {
            style: self.style.with_fraction_digits(digits),
            ..self
        }
    }

    pub fn number(&self, value: f64) -> String {
        format_number(value, self.style, self.table)
    }

    /// Number, a space, then the label
    pub fn quantity(&self, value: f64, unit_label: &str) -> String {
        if !value.is_finite() {
            return NOT_A_NUMBER.to_string();
        }
        format!("{} {}", self.number(value), unit_label)
    }

    /// Number with the locale's label for `symbol`, pluralized on `value`
    pub fn quantity_of(&self, value: f64, symbol: &str) -> String {
        self.quantity(value, self.unit_label(symbol, value))
    }

    /// Singular or plural label, falling back to the symbol itself. The
    /// plural category follows the number as displayed, so 1.0004 shown
    /// as "1" takes the singular.
    pub fn unit_label<'s>(&self, symbol: &'s str, count: f64) -> &'s str
    where
        'a: 's,
    {
        self.table.unit_label(symbol, self.displayed(count)).unwrap_or(symbol)
    }

    /// `value` rounded to the fraction digits it is shown with
    fn displayed(&self, value: f64) -> f64 {
        let digits = i32::try_from(self.style.max_fraction_digits).unwrap_or(i32::MAX);
        let scale = 10f64.powi(digits);
        let rounded = (value * scale).round() / scale;
        if rounded.is_finite() { rounded } else { value }
    }

    /// Two-component value such as 5 ft 11 in
    pub fn composite(&self, major: f64, major_symbol: &str, minor: f64, minor_symbol: &str) -> String {
        if !major.is_finite() || !minor.is_finite() {
            return NOT_A_NUMBER.to_string();
        }
        let minor = self.number(minor.abs());
        let major = self.number(major);
        format!("{} {} {} {}", major, major_symbol, minor, minor_symbol)
    }

    pub fn percent(&self, value: f64) -> String {
        if !value.is_finite() {
            return NOT_A_NUMBER.to_string();
        }
        format!("{}%", self.number(value))
    }

    /// Join items with the locale list separator
    pub fn list(&self, items: &[String]) -> String {
        items.join(&self.table.list_separator)
    }

    /// Days, hours, minutes and seconds, non-zero parts only
    pub fn duration(&self, seconds: f64) -> String {
        if !seconds.is_finite() {
            return NOT_A_NUMBER.to_string();
        }

        let sign = if seconds < 0.0 { "-" } else { "" };
        let total = seconds.abs().round();
        if total == 0.0 {
            return self.quantity_of(0.0, "s");
        }

        let days = (total / 86_400.0).floor();
        let rem = total - days * 86_400.0;
        let hours = (rem / 3_600.0).floor();
        let rem = rem - hours * 3_600.0;
        let minutes = (rem / 60.0).floor();
        let secs = rem - minutes * 60.0;

        let parts: Vec<String> = [(days, "day"), (hours, "h"), (minutes, "min"), (secs, "s")]
            .into_iter()
            .filter(|(n, _)| *n > 0.0)
            .map(|(n, symbol)| self.quantity_of(n, symbol))
            .collect();

        format!("{}{}", sign, self.list(&parts))
    }
}

/// Format a number with locale separators, trimmed trailing zeros and
/// scientific notation outside the style's window
pub fn format_number(value: f64, style: NumberStyle, table: &LocaleTable) -> String {
    if !value.is_finite() {
        return NOT_A_NUMBER.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude < style.scientific_below || magnitude >= style.scientific_from {
        return scientific(value, style.max_fraction_digits, &table.number.decimal);
    }

    let fixed = format!("{:.*}", style.max_fraction_digits, magnitude);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut out = String::new();
    let rounds_to_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    if value < 0.0 && !rounds_to_zero {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, &table.number.group));
    if !frac_part.is_empty() {
        out.push_str(&table.number.decimal);
        out.push_str(frac_part);
    }
    out
}

/// `1.5e-7`, `2.5e15`
fn scientific(value: f64, digits: usize, decimal: &str) -> String {
    let text = format!("{:.*e}", digits, value);
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{}e{}", mantissa.replace('.', decimal), exponent)
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}
