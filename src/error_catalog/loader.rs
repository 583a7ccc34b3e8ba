use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_lock::OnceCell;

use crate::error_catalog::catalog::ErrorCatalog;
use crate::error_catalog::error::{invalid_argument, CatalogResult};
use crate::error_catalog::source::CatalogSource;

type LoadSlot = Arc<OnceCell<CatalogResult<Arc<ErrorCatalog>>>>;

/// Memoized catalog loads keyed by locale.
///
/// Each slot stores the outcome of a single load, successful or not, so
/// callers racing on the same locale share one fetch and a failed locale is
/// not retried for the lifetime of the cache. Clones share the same slots.
#[derive(Clone, Default)]
pub struct CatalogCache {
    slots: Arc<Mutex<HashMap<String, LoadSlot>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, LoadSlot>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot(&self, locale: &str) -> LoadSlot {
        self.lock()
            .entry(locale.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Returns the catalog for `locale` if a load already completed successfully.
    pub fn cached(&self, locale: &str) -> Option<Arc<ErrorCatalog>> {
        let slot = self.lock().get(locale).cloned()?;
        slot.get()?.as_ref().ok().cloned()
    }

    /// Number of locales that have been requested, including in-flight and failed ones.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every memoized load. In-flight loads finish into detached slots.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Loads and memoizes error catalogs per locale.
#[derive(Clone)]
pub struct CatalogLoader {
    source: Arc<dyn CatalogSource>,
    cache: CatalogCache,
}

impl CatalogLoader {
    pub fn new(source: Arc<dyn CatalogSource>, cache: CatalogCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Resolves the catalog for `locale`, fetching and parsing it at most once.
    ///
    /// The locale is used verbatim as the memoization key: `"en"` and `"EN"`
    /// are distinct entries.
    pub async fn load(&self, locale: &str) -> CatalogResult<Arc<ErrorCatalog>> {
        if locale.trim().is_empty() {
            return Err(invalid_argument("locale must not be empty"));
        }

        let slot = self.cache.slot(locale);
        let result = slot
            .get_or_init(|| async {
                let loaded = self.fetch_and_parse(locale).await;
                if let Err(err) = &loaded {
                    log::warn!("error catalog for locale `{locale}` unavailable: {err}");
                }
                loaded
            })
            .await;
        result.clone()
    }

    async fn fetch_and_parse(&self, locale: &str) -> CatalogResult<Arc<ErrorCatalog>> {
        let document = self.source.fetch(locale).await?;
        let catalog = ErrorCatalog::from_yaml_str(&document)?;
        log::debug!(
            "loaded error catalog for locale `{locale}` with {} messages",
            catalog.len()
        );
        Ok(Arc::new(catalog))
    }
}
