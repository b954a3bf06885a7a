//! Lazily loaded, memoized symbol constraint cache.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::application::ports::{ExchangeError, ExchangePort};
use crate::domain::filters::SymbolFilters;
use crate::domain::symbol::Symbol;

#[derive(Debug, Default)]
struct CacheState {
    filters: HashMap<String, SymbolFilters>,
    loaded: bool,
}

/// Symbol → constraint-model cache over one exchange-metadata fetch.
///
/// Owned by the engine instance, not process-wide. The mutex is held
/// across the metadata fetch, so concurrent `ensure` calls collapse into
/// a single in-flight request (single-flight) and every caller observes
/// the same post-load state. Entries are never evicted; only an explicit
/// `force` refresh replaces them.
#[derive(Debug, Default)]
pub struct FilterCache {
    state: Mutex<CacheState>,
}

impl FilterCache {
    /// Create an empty, unloaded cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache if it has not been loaded yet.
    ///
    /// No-op when already loaded and `force` is false. Otherwise performs
    /// one metadata fetch, builds a constraint model per returned symbol,
    /// and replaces the cache contents wholesale.
    ///
    /// # Errors
    ///
    /// Propagates the transport error when the metadata fetch fails; the
    /// cache stays unloaded in that case.
    pub async fn ensure<E>(&self, exchange: &E, force: bool) -> Result<(), ExchangeError>
    where
        E: ExchangePort + ?Sized,
    {
        let mut state = self.state.lock().await;
        if state.loaded && !force {
            return Ok(());
        }

        let info = exchange.exchange_info().await?;
        let mut filters = HashMap::with_capacity(info.symbols.len());
        for entry in &info.symbols {
            let model = SymbolFilters::from_filter_entries(Symbol::new(&entry.symbol), &entry.filters);
            filters.insert(model.symbol().as_str().to_string(), model);
        }

        tracing::info!(symbols = filters.len(), "Symbol filters loaded");
        state.filters = filters;
        state.loaded = true;
        Ok(())
    }

    /// Look up the constraint model for a symbol.
    ///
    /// Case-insensitive (symbols normalize to uppercase). Returns `None`
    /// for unknown symbols or an unloaded cache; absence means "skip
    /// normalization", never a fatal condition.
    pub async fn get(&self, symbol: &Symbol) -> Option<SymbolFilters> {
        self.state.lock().await.filters.get(symbol.as_str()).cloned()
    }

    /// Whether the cache has been populated.
    pub async fn is_loaded(&self) -> bool {
        self.state.lock().await.loaded
    }

    /// Number of cached symbols.
    pub async fn len(&self) -> usize {
        self.state.lock().await.filters.len()
    }

    /// True if no symbols are cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::stub_exchange::StubExchange;
    use rust_decimal_macros::dec;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn ensure_loads_once() {
        let exchange = StubExchange::default();
        let cache = FilterCache::new();

        cache.ensure(&exchange, false).await.unwrap();
        cache.ensure(&exchange, false).await.unwrap();

        assert_eq!(exchange.info_calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_loaded().await);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn force_refetches() {
        let exchange = StubExchange::default();
        let cache = FilterCache::new();

        cache.ensure(&exchange, false).await.unwrap();
        cache.ensure(&exchange, true).await.unwrap();

        assert_eq!(exchange.info_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn get_is_case_insensitive() {
        let exchange = StubExchange::default();
        let cache = FilterCache::new();
        cache.ensure(&exchange, false).await.unwrap();

        let filters = cache.get(&Symbol::new("btcusdt")).await.unwrap();
        assert_eq!(filters.tick_size(), dec!(0.10));
    }

    #[tokio::test]
    async fn get_unknown_symbol_is_absent() {
        let exchange = StubExchange::default();
        let cache = FilterCache::new();
        cache.ensure(&exchange, false).await.unwrap();

        assert!(cache.get(&Symbol::new("DOGEUSDT")).await.is_none());
    }

    #[tokio::test]
    async fn get_before_load_is_absent() {
        let cache = FilterCache::new();
        assert!(cache.get(&Symbol::new("BTCUSDT")).await.is_none());
        assert!(!cache.is_loaded().await);
    }

    #[tokio::test]
    async fn ensure_failure_leaves_cache_unloaded() {
        let exchange = StubExchange::default();
        exchange.fail_exchange_info.store(true, Ordering::SeqCst);
        let cache = FilterCache::new();

        assert!(cache.ensure(&exchange, false).await.is_err());
        assert!(!cache.is_loaded().await);

        // A later successful load still works.
        exchange.fail_exchange_info.store(false, Ordering::SeqCst);
        cache.ensure(&exchange, false).await.unwrap();
        assert!(cache.is_loaded().await);
    }

    #[tokio::test]
    async fn concurrent_ensure_single_flight() {
        use std::sync::Arc;

        let exchange = Arc::new(StubExchange::default());
        let cache = Arc::new(FilterCache::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let exchange = Arc::clone(&exchange);
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.ensure(exchange.as_ref(), false).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(exchange.info_calls.load(Ordering::SeqCst), 1);
    }
}
