//! Calculator Registry

use crate::{Calculator, CalculatorMeta};
use quanta_core::{QuantaError, QuantaResult, Value};
use quanta_units::UnitRegistry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Central calculator registry
pub struct CalculatorRegistry {
    calculators: HashMap<String, Arc<dyn Calculator>>,
}

impl CalculatorRegistry {
    pub fn new() -> Self {
        Self {
            calculators: HashMap::new(),
        }
    }

    pub fn with_calculator<C: Calculator + 'static>(mut self, c: C) -> Self {
        let id = c.meta().id.to_lowercase();
        self.calculators.insert(id, Arc::new(c));
        self
    }

    pub fn get(&self, id: &str) -> Option<&dyn Calculator> {
        self.calculators.get(&id.to_lowercase()).map(|c| c.as_ref())
    }

    /// Look up a calculator, suggesting close ids on a miss
    pub fn lookup(&self, id: &str) -> QuantaResult<&dyn Calculator> {
        if let Some(c) = self.get(id) {
            return Ok(c);
        }
        let similar = self.find_similar(id);
        let mut err = QuantaError::unknown_calculator(id);
        if !similar.is_empty() {
            let suggestions: Vec<&str> = similar.iter().take(3).map(|s| s.as_str()).collect();
            err = err.with_suggestion(format!("Similar: {}", suggestions.join(", ")));
        }
        Err(err)
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }

    /// Ids of every registered calculator, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.calculators.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn metas(&self) -> Vec<CalculatorMeta> {
        self.ids()
            .into_iter()
            .filter_map(|id| self.get(id))
            .map(|c| c.meta())
            .collect()
    }

    /// Calculator summaries, optionally for one category
    pub fn list(&self, category: Option<&str>) -> Value {
        let calcs: Vec<Value> = self
            .metas()
            .into_iter()
            .filter(|meta| category.map_or(true, |c| meta.category == c))
            .map(|meta| {
                let mut obj = BTreeMap::new();
                obj.insert("id".to_string(), Value::Text(meta.id.to_string()));
                obj.insert("name".to_string(), Value::Text(meta.name.to_string()));
                obj.insert("description".to_string(), Value::Text(meta.description.to_string()));
                obj.insert("category".to_string(), Value::Text(meta.category.to_string()));
                Value::Object(obj)
            })
            .collect();
        Value::List(calcs)
    }

    /// Check every config against the unit registry. Run once at startup so
    /// broken unit or visibility references never reach a request.
    pub fn validate(&self, units: &UnitRegistry) -> QuantaResult<()> {
        for id in self.ids() {
            let Some(calc) = self.get(id) else { continue };
            let config = calc.config();
            if config.id.to_lowercase() != id {
                return Err(QuantaError::invalid_config(
                    id,
                    format!("config id '{}' does not match calculator id", config.id),
                ));
            }
            config.validate(units)?;
        }
        Ok(())
    }

    /// Find calculator ids similar to the given name
    fn find_similar(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self
            .calculators
            .keys()
            .filter_map(|id| {
                let score = Self::similarity_score(&name_lower, id);
                if score > 0 {
                    Some((id.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        // Highest score first, ties by id
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(id, _)| id).collect()
    }

    /// Similarity between a query and a calculator id
    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        // Shared words of snake_case ids
        let query_words: HashSet<&str> = query.split(['_', '-', ' ']).filter(|w| !w.is_empty()).collect();
        score += candidate.split('_').filter(|w| query_words.contains(w)).count() * 40;

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();

        // Mostly unrelated letters do not count as similar
        if score == 0 && common * 2 < candidate_chars.len() {
            return 0;
        }
        score += common * 2;

        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 {
            score += 5 - len_diff;
        }

        score
    }
}

impl Default for CalculatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
