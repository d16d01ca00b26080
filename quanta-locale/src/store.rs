//! Swappable catalog store
//!
//! Readers take an `Arc` snapshot once per calculation; a reload replaces
//! the whole catalog in one pointer swap, so a render never mixes tables
//! from two catalogs.

use std::sync::{Arc, RwLock};
use tracing::info;
use crate::catalog::Catalog;

#[derive(Debug)]
pub struct LocaleStore {
    current: RwLock<Arc<Catalog>>,
}

impl Default for LocaleStore {
    fn default() -> Self {
        LocaleStore::new(Catalog::builtin())
    }
}

impl LocaleStore {
    pub fn new(catalog: Catalog) -> Self {
        LocaleStore {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Current catalog
    pub fn snapshot(&self) -> Arc<Catalog> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the catalog, returning the previous one
    pub fn swap(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        info!(locales = next.locales.len(), default = %next.default_locale, "locale catalog replaced");
        std::mem::replace(&mut *guard, next)
    }
}
