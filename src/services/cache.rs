// src/services/cache.rs
use std::collections::HashMap;
use std::sync::Mutex;

use log::{debug, error, info};

use crate::models::{Period, PriceSeries};
use crate::services::source::{normalize_symbol, FetchError, PriceSource};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub period: Period,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, period: Period) -> Self {
        CacheKey {
            symbol: symbol.into(),
            period,
        }
    }
}

/// Storage for fetched price series, keyed by (symbol, period).
pub trait PriceCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<PriceSeries>;
    fn insert(&self, key: CacheKey, series: PriceSeries);
}

/// Process-lifetime cache with no eviction.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<CacheKey, PriceSeries>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        InMemoryCache::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PriceCache for InMemoryCache {
    fn get(&self, key: &CacheKey) -> Option<PriceSeries> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn insert(&self, key: CacheKey, series: PriceSeries) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, series);
    }
}

/// A price source behind a memoizing cache. Unresolvable symbols and unreachable
/// sources are logged and reported as an empty series; only faults in the data
/// itself come back as errors. Nothing is cached for either.
pub struct CachedSource<S, C> {
    source: S,
    cache: C,
}

impl<S: PriceSource, C: PriceCache> CachedSource<S, C> {
    pub fn new(source: S, cache: C) -> Self {
        CachedSource { source, cache }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub async fn fetch_or_empty(
        &self,
        raw_symbol: &str,
        period: Period,
    ) -> Result<PriceSeries, FetchError> {
        let symbol = match normalize_symbol(raw_symbol) {
            Ok(symbol) => symbol,
            Err(e) => {
                error!("Rejected fetch request: {}", e);
                return Ok(PriceSeries::empty());
            }
        };

        let key = CacheKey::new(symbol.clone(), period);
        if let Some(series) = self.cache.get(&key) {
            debug!("Cache hit for {} ({})", symbol, period);
            return Ok(series);
        }

        match self.source.fetch(&symbol, period).await {
            Ok(series) if series.is_empty() => {
                error!("{} returned no rows for {} ({})", self.source.name(), symbol, period);
                Ok(series)
            }
            Ok(series) => {
                info!("Caching {} rows for {} ({})", series.len(), symbol, period);
                self.cache.insert(key, series.clone());
                Ok(series)
            }
            Err(e) if e.is_fault() => {
                error!("Malformed data for {} ({}) from {}: {}", symbol, period, self.source.name(), e);
                Err(e)
            }
            Err(e) => {
                error!("Failed to fetch {} ({}) from {}: {}", symbol, period, self.source.name(), e);
                Ok(PriceSeries::empty())
            }
        }
    }
}
