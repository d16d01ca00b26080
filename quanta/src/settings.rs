//! Engine settings

use serde::{Serialize, Deserialize};
use quanta_locale::{NumberStyle, DEFAULT_LOCALE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Locale used when a request names none
    pub default_locale: String,
    /// Number display for results without their own digits
    pub number: NumberStyle,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            default_locale: DEFAULT_LOCALE.to_string(),
            number: NumberStyle::default(),
        }
    }
}

impl EngineSettings {
    pub fn with_default_locale(mut self, locale: &str) -> Self {
        self.default_locale = locale.to_string();
        self
    }

    pub fn with_max_fraction_digits(mut self, digits: usize) -> Self {
        self.number.max_fraction_digits = digits;
        self
    }
}
