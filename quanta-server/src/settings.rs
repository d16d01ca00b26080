//! Server settings read from the environment

use std::env;
use std::path::PathBuf;
use tracing::warn;
use quanta::EngineSettings;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerSettings {
    /// Directory of `<code>.json` locale tables layered over the builtins
    pub locale_dir: Option<PathBuf>,
    pub engine: EngineSettings,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Settings from any key lookup, unset or unparsable keys keep defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = ServerSettings::default();

        if let Some(dir) = lookup("QUANTA_LOCALE_DIR").filter(|d| !d.is_empty()) {
            settings.locale_dir = Some(PathBuf::from(dir));
        }
        if let Some(locale) = lookup("QUANTA_DEFAULT_LOCALE").filter(|l| !l.is_empty()) {
            settings.engine = settings.engine.with_default_locale(&locale);
        }
        if let Some(digits) = lookup("QUANTA_MAX_FRACTION_DIGITS") {
            match digits.trim().parse::<usize>() {
                Ok(digits) => settings.engine = settings.engine.with_max_fraction_digits(digits),
                Err(_) => warn!(value = %digits, "QUANTA_MAX_FRACTION_DIGITS is not a count, ignored"),
            }
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = ServerSettings::from_lookup(lookup(&[]));
        assert_eq!(settings, ServerSettings::default());
        assert_eq!(settings.engine.default_locale, "en");
    }

    #[test]
    fn test_all_keys() {
        let settings = ServerSettings::from_lookup(lookup(&[
            ("QUANTA_LOCALE_DIR", "/etc/quanta/locales"),
            ("QUANTA_DEFAULT_LOCALE", "de"),
            ("QUANTA_MAX_FRACTION_DIGITS", "4"),
        ]));
        assert_eq!(settings.locale_dir, Some(PathBuf::from("/etc/quanta/locales")));
        assert_eq!(settings.engine.default_locale, "de");
        assert_eq!(settings.engine.number.max_fraction_digits, 4);
    }

    #[test]
    fn test_bad_digits_ignored() {
        let settings = ServerSettings::from_lookup(lookup(&[("QUANTA_MAX_FRACTION_DIGITS", "many")]));
        assert_eq!(settings.engine.number.max_fraction_digits, 2);
    }
}
