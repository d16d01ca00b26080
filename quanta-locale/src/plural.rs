//! Plural rules

use serde::{Serialize, Deserialize};

/// Grammatical category chosen for a count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralCategory {
    One,
    Other,
}

/// How a locale picks between singular and plural labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluralRule {
    /// Exactly 1 is singular, everything else plural (en, es, de)
    #[default]
    OneOther,
    /// No grammatical number: always the `other` form
    Invariant,
}

impl PluralRule {
    pub fn category(&self, count: f64) -> PluralCategory {
        match self {
            PluralRule::OneOther if count.abs() == 1.0 => PluralCategory::One,
            _ => PluralCategory::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_other() {
        let rule = PluralRule::OneOther;
        assert_eq!(rule.category(1.0), PluralCategory::One);
        assert_eq!(rule.category(-1.0), PluralCategory::One);
        assert_eq!(rule.category(0.0), PluralCategory::Other);
        assert_eq!(rule.category(2.0), PluralCategory::Other);
        assert_eq!(rule.category(1.5), PluralCategory::Other);
    }

    #[test]
    fn test_invariant() {
        assert_eq!(PluralRule::Invariant.category(1.0), PluralCategory::Other);
    }

    #[test]
    fn test_serde_names() {
        let rule: PluralRule = serde_json::from_str("\"one_other\"").unwrap();
        assert_eq!(rule, PluralRule::OneOther);
        let rule: PluralRule = serde_json::from_str("\"invariant\"").unwrap();
        assert_eq!(rule, PluralRule::Invariant);
    }
}
