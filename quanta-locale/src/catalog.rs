//! Locale catalog: every locale table as one immutable snapshot

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};
use quanta_core::{QuantaError, QuantaResult};
use crate::format::{Formatter, NumberStyle};
use crate::table::LocaleTable;
use crate::template::{substitute, TemplateArgs};

/// Locale tables embedded in the binary
const BUILTIN: [(&str, &str); 3] = [
    ("en", include_str!("../locales/en.json")),
    ("es", include_str!("../locales/es.json")),
    ("de", include_str!("../locales/de.json")),
];

pub const DEFAULT_LOCALE: &str = "en";

/// Per-calculator templates: locale code to template key to text
pub type Templates = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub default_locale: String,
    pub locales: BTreeMap<String, LocaleTable>,
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin()
    }
}

impl Catalog {
    /// Catalog with no tables besides an empty default locale
    pub fn empty(default_locale: &str) -> Self {
        let mut locales = BTreeMap::new();
        locales.insert(default_locale.to_string(), LocaleTable::default());
        Catalog {
            default_locale: default_locale.to_string(),
            locales,
        }
    }

    /// The embedded en, es and de tables
    pub fn builtin() -> Self {
        let mut catalog = Catalog::empty(DEFAULT_LOCALE);
        for (code, json) in BUILTIN {
            match serde_json::from_str::<LocaleTable>(json) {
                Ok(table) => catalog.insert(code, table),
                Err(e) => warn!(locale = code, error = %e, "embedded locale table is invalid"),
            }
        }
        catalog
    }

    /// Builtin tables overlaid with every `<code>.json` in a directory. A
    /// file replaces the builtin table of the same code.
    pub fn load_dir(dir: &Path, default_locale: &str) -> QuantaResult<Self> {
        let mut catalog = Catalog::builtin();
        let entries = fs::read_dir(dir).map_err(|e| {
            QuantaError::invalid_config("locales", format!("cannot read {}: {}", dir.display(), e))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| QuantaError::invalid_config("locales", e.to_string()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(code) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let text = fs::read_to_string(&path).map_err(|e| {
                QuantaError::invalid_config("locales", format!("cannot read {}: {}", path.display(), e))
            })?;
            let table: LocaleTable = serde_json::from_str(&text).map_err(|e| {
                QuantaError::invalid_config("locales", format!("{}: {}", path.display(), e))
            })?;
            debug!(locale = %code, path = %path.display(), "loaded locale table");
            catalog.insert(&code, table);
        }

        catalog.with_default_locale(default_locale)
    }

    /// Change the default locale, which must have a table
    pub fn with_default_locale(mut self, code: &str) -> QuantaResult<Self> {
        if !self.locales.contains_key(code) {
            return Err(QuantaError::invalid_config(
                "locales",
                format!("default locale '{}' has no table", code),
            ));
        }
        self.default_locale = code.to_string();
        Ok(self)
    }

    pub fn with_locale(mut self, code: &str, table: LocaleTable) -> Self {
        self.insert(code, table);
        self
    }

    pub fn insert(&mut self, code: &str, table: LocaleTable) {
        self.locales.insert(code.to_string(), table);
    }

    pub fn codes(&self) -> Vec<&str> {
        self.locales.keys().map(|s| s.as_str()).collect()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.locales.contains_key(code)
    }

    /// Resolve a requested locale to the code actually served: exact
    /// match, then the language part (`es-MX` to `es`), then the default
    pub fn resolve<'a>(&'a self, requested: &'a str) -> &'a str {
        if self.locales.contains_key(requested) {
            return requested;
        }
        if let Some((language, _)) = requested.split_once(['-', '_']) {
            if self.locales.contains_key(language) {
                debug!(requested, served = language, "locale resolved to language");
                return language;
            }
        }
        warn!(requested, served = %self.default_locale, "unknown locale, using default");
        &self.default_locale
    }

    /// Table for a locale, with the same fallbacks as `resolve`
    pub fn table(&self, locale: &str) -> &LocaleTable {
        let code = self.resolve(locale);
        self.locales
            .get(code)
            .or_else(|| self.locales.get(&self.default_locale))
            .unwrap_or(&*EMPTY_TABLE)
    }

    pub fn formatter(&self, locale: &str, style: NumberStyle) -> Formatter<'_> {
        Formatter::new(self.table(locale), style)
    }

    /// Template text from this catalog, trying the default locale second
    pub fn template(&self, locale: &str, key: &str) -> Option<&str> {
        let code = self.resolve(locale);
        self.locales
            .get(code)
            .and_then(|t| t.string(key))
            .or_else(|| self.locales.get(&self.default_locale).and_then(|t| t.string(key)))
    }

    /// Render a catalog template. A key missing everywhere yields an empty
    /// string and a warning.
    pub fn render(&self, key: &str, locale: &str, args: &TemplateArgs) -> String {
        self.render_with(None, key, locale, args)
    }

    /// Template text with calculator templates consulted before the
    /// catalog's own.
    ///
    /// Lookup order: overrides for the locale, catalog for the locale,
    /// overrides for the default locale, catalog for the default locale.
    pub fn template_with<'a>(&'a self, overrides: Option<&'a Templates>, key: &str, locale: &str) -> Option<&'a str> {
        let code = self.resolve(locale);
        let from_overrides = |code: &str| {
            overrides
                .and_then(|o| o.get(code))
                .and_then(|t| t.get(key))
                .map(|s| s.as_str())
        };
        let from_catalog = |code: &str| self.locales.get(code).and_then(|t| t.string(key));

        from_overrides(code)
            .or_else(|| from_catalog(code))
            .or_else(|| from_overrides(self.default_locale.as_str()))
            .or_else(|| from_catalog(self.default_locale.as_str()))
    }

    /// Render with calculator templates first. A key missing everywhere
    /// yields an empty string and a warning.
    pub fn render_with(&self, overrides: Option<&Templates>, key: &str, locale: &str, args: &TemplateArgs) -> String {
        match self.template_with(overrides, key, locale) {
            Some(text) => substitute(text, args),
            None => {
                let err = QuantaError::missing_translation(locale, key);
                warn!(code = %err.code, locale, key, "{}", err.message);
                String::new()
            }
        }
    }
}

static EMPTY_TABLE: LazyLock<LocaleTable> = LazyLock::new(LocaleTable::default);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::args;

    #[test]
    fn test_builtin_locales() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.codes(), vec!["de", "en", "es"]);
        assert_eq!(catalog.default_locale, "en");
    }

    #[test]
    fn test_builtin_duration_labels() {
        let catalog = Catalog::builtin();
        for code in catalog.codes() {
            let table = catalog.table(code);
            for symbol in ["day", "h", "min", "s"] {
                assert!(table.units.contains_key(symbol), "{} lacks {}", code, symbol);
            }
        }
    }

    #[test]
    fn test_resolve_fallbacks() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.resolve("es"), "es");
        assert_eq!(catalog.resolve("es-MX"), "es");
        assert_eq!(catalog.resolve("de_AT"), "de");
        assert_eq!(catalog.resolve("fr"), "en");
    }

    #[test]
    fn test_render_falls_back_to_default_locale() {
        let catalog = Catalog::empty("en")
            .with_locale("en", LocaleTable::default().with_string("hello", "Hello {name}"))
            .with_locale("es", LocaleTable::default());
        let a = args([("name", "Ana")]);
        assert_eq!(catalog.render("hello", "es", &a), "Hello Ana");
    }

    #[test]
    fn test_missing_key_is_empty() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.render("no.such.key", "en", &TemplateArgs::new()), "");
        assert_eq!(catalog.render("no.such.key", "xx", &TemplateArgs::new()), "");
    }

    #[test]
    fn test_overrides_first() {
        let catalog = Catalog::empty("en")
            .with_locale("en", LocaleTable::default().with_string("title", "Catalog"));
        let mut overrides = Templates::new();
        overrides
            .entry("en".into())
            .or_default()
            .insert("title".into(), "Calculator {n}".into());

        let a = args([("n", "1")]);
        assert_eq!(catalog.render_with(Some(&overrides), "title", "en", &a), "Calculator 1");
        assert_eq!(catalog.render_with(None, "title", "en", &a), "Catalog");
    }

    #[test]
    fn test_locale_specific_override_beats_default_catalog() {
        let catalog = Catalog::builtin();
        let mut overrides = Templates::new();
        overrides.entry("es".into()).or_default().insert("k".into(), "hola".into());
        overrides.entry("en".into()).or_default().insert("k".into(), "hello".into());
        assert_eq!(catalog.render_with(Some(&overrides), "k", "es", &TemplateArgs::new()), "hola");
        assert_eq!(catalog.render_with(Some(&overrides), "k", "fr", &TemplateArgs::new()), "hello");
    }

    #[test]
    fn test_default_locale_must_exist() {
        assert!(Catalog::builtin().with_default_locale("fr").is_err());
        assert!(Catalog::builtin().with_default_locale("de").is_ok());
    }

    #[test]
    fn test_load_dir() {
        let dir = std::env::temp_dir().join(format!("quanta-locales-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("fr.json"),
            r#"{ "number": { "decimal": ",", "group": " " }, "strings": { "hello": "Bonjour" } }"#,
        )
        .unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let catalog = Catalog::load_dir(&dir, "fr").unwrap();
        assert_eq!(catalog.default_locale, "fr");
        assert!(catalog.contains("en"));
        assert_eq!(catalog.render("hello", "fr", &TemplateArgs::new()), "Bonjour");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_dir_rejects_bad_json() {
        let dir = std::env::temp_dir().join(format!("quanta-bad-locales-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("en.json"), "{ not json").unwrap();
        let err = Catalog::load_dir(&dir, "en").unwrap_err();
        assert_eq!(err.code, quanta_core::codes::INVALID_CONFIG);
        fs::remove_dir_all(&dir).unwrap();
    }
}
