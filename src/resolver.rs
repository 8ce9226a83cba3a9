//! Translation resolution: cache, reachability and provider chain behind one
//! total operation.

use crate::cache::PersistentCache;
use crate::i18n::{Language, MetricsReport, TranslationMetrics};
use crate::providers::ProviderChain;
use crate::reachability::ReachabilityMonitor;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Resolves source text into a target language.
///
/// [`resolve`](Self::resolve) never fails: whenever no translation is
/// available (offline, every provider failed) the source text is returned.
/// Concurrent resolutions of the same text each run the provider chain; only
/// the cache write converges.
pub struct TranslationResolver {
    cache: Mutex<PersistentCache>,
    reachability: ReachabilityMonitor,
    chain: ProviderChain,
    metrics: TranslationMetrics,
}

impl TranslationResolver {
    pub fn new(
        cache: PersistentCache,
        reachability: ReachabilityMonitor,
        chain: ProviderChain,
    ) -> Self {
        Self {
            cache: Mutex::new(cache),
            reachability,
            chain,
            metrics: TranslationMetrics::new(),
        }
    }

    /// Best available text for `text` in `target`.
    pub async fn resolve(&self, text: &str, target: Language) -> String {
        if target.is_canonical() {
            return text.to_string();
        }

        if let Some(cached) = self.cached(text, target) {
            self.metrics.record_cache_hit();
            return cached;
        }
        self.metrics.record_cache_miss();

        if !self.reachability.is_online() {
            self.metrics.record_offline_fallback();
            debug!("Offline, leaving text untranslated for {}", target);
            return text.to_string();
        }

        let report = self.chain.run(text, target).await;
        let failures = report.failures();
        for _ in &report.attempts {
            self.metrics.record_provider_call();
        }
        for _ in 0..failures {
            self.metrics.record_provider_failure();
        }

        match report.into_translation() {
            Some(translated) => {
                self.lock_cache().put(text, target, translated.clone());
                translated
            }
            None => {
                self.metrics.record_chain_exhausted();
                debug!(
                    "No provider could translate text into {} ({} failed)",
                    target, failures
                );
                text.to_string()
            }
        }
    }

    /// Cached translation without touching the network.
    pub fn cached(&self, text: &str, language: Language) -> Option<String> {
        self.lock_cache().get(text, language).map(str::to_string)
    }

    /// Remove every cached translation, including the durable copy.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    pub fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }

    pub fn reachability(&self) -> &ReachabilityMonitor {
        &self.reachability
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    pub fn metrics_report(&self) -> MetricsReport {
        self.metrics.report()
    }

    // The guard is never held across an await point.
    fn lock_cache(&self) -> MutexGuard<'_, PersistentCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::providers::{PlaceholderProvider, ProviderError, TranslationProvider};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Provider answering with a fixed value, or failing when `answer` is None.
    struct Fixed {
        answer: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TranslationProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn translate(
            &self,
            _text: &str,
            _source: Language,
            _target: Language,
        ) -> Result<Option<String>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answer {
                Some(answer) => Ok(Some(answer.to_string())),
                None => Err(ProviderError::Malformed("scripted failure".to_string())),
            }
        }
    }

    fn fixed(answer: Option<&'static str>) -> (Fixed, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Fixed {
                answer,
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn resolver_with(chain: ProviderChain, store: MemoryStore, online: bool) -> TranslationResolver {
        TranslationResolver::new(
            PersistentCache::load(store),
            ReachabilityMonitor::new(online),
            chain,
        )
    }

    #[tokio::test]
    async fn test_default_language_is_identity() {
        let (provider, calls) = fixed(Some("never"));
        let chain = ProviderChain::new(Language::ENGLISH).with_provider(provider);
        let resolver = resolver_with(chain, MemoryStore::new(), true);

        assert_eq!(resolver.resolve("Save", Language::ENGLISH).await, "Save");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(resolver.metrics().cache_misses(), 0);
        assert_eq!(resolver.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_second_resolve_is_cache_hit() {
        let (provider, calls) = fixed(Some("حفظ"));
        let chain = ProviderChain::new(Language::ENGLISH).with_provider(provider);
        let resolver = resolver_with(chain, MemoryStore::new(), true);

        assert_eq!(resolver.resolve("Save", Language::ARABIC).await, "حفظ");
        assert_eq!(resolver.resolve("Save", Language::ARABIC).await, "حفظ");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.metrics().cache_hits(), 1);
    }

    #[tokio::test]
    async fn test_normalized_texts_share_entry() {
        let (provider, calls) = fixed(Some("مرحبا"));
        let chain = ProviderChain::new(Language::ENGLISH).with_provider(provider);
        let resolver = resolver_with(chain, MemoryStore::new(), true);

        resolver.resolve("Hello", Language::ARABIC).await;
        assert_eq!(resolver.resolve("  hello  ", Language::ARABIC).await, "مرحبا");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_offline_returns_source_without_provider_calls() {
        let (provider, calls) = fixed(Some("حفظ"));
        let chain = ProviderChain::new(Language::ENGLISH).with_provider(provider);
        let resolver = resolver_with(chain, MemoryStore::new(), false);

        assert_eq!(resolver.resolve("Save", Language::ARABIC).await, "Save");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(resolver.metrics().offline_fallbacks(), 1);
        assert_eq!(resolver.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_offline_still_serves_cache_hits() {
        let store = MemoryStore::with_payload(r#"{"save": {"ar": "حفظ"}}"#);
        let resolver = resolver_with(ProviderChain::new(Language::ENGLISH), store, false);

        assert_eq!(resolver.resolve("Save", Language::ARABIC).await, "حفظ");
    }

    #[tokio::test]
    async fn test_reconnect_enables_providers() {
        let (provider, calls) = fixed(Some("حفظ"));
        let chain = ProviderChain::new(Language::ENGLISH).with_provider(provider);
        let resolver = resolver_with(chain, MemoryStore::new(), false);

        assert_eq!(resolver.resolve("Save", Language::ARABIC).await, "Save");
        resolver.reachability().set_online(true);
        assert_eq!(resolver.resolve("Save", Language::ARABIC).await, "حفظ");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_to_second_provider_is_cached() {
        let (first, _) = fixed(None);
        let (second, _) = fixed(Some("X"));
        let store = MemoryStore::new();
        let chain = ProviderChain::new(Language::ENGLISH)
            .with_provider(first)
            .with_provider(second);
        let resolver = resolver_with(chain, store.clone(), true);

        assert_eq!(resolver.resolve("Save", Language::ARABIC).await, "X");
        assert_eq!(resolver.cached("save", Language::ARABIC).as_deref(), Some("X"));
        assert!(store.payload().is_some());

        let report = resolver.metrics_report();
        assert_eq!(report.provider_calls, 2);
        assert_eq!(report.provider_failures, 1);
    }

    #[tokio::test]
    async fn test_exhausted_chain_returns_source_and_caches_nothing() {
        let (first, _) = fixed(None);
        let store = MemoryStore::new();
        let chain = ProviderChain::new(Language::ENGLISH)
            .with_provider(first)
            .with_provider(PlaceholderProvider::new("microsoft"));
        let resolver = resolver_with(chain, store.clone(), true);

        assert_eq!(resolver.resolve("Save", Language::ARABIC).await, "Save");
        assert_eq!(resolver.cache_len(), 0);
        assert!(store.payload().is_none());
        assert_eq!(resolver.metrics().chains_exhausted(), 1);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_new_lookup() {
        let (provider, calls) = fixed(Some("حفظ"));
        let store = MemoryStore::new();
        let chain = ProviderChain::new(Language::ENGLISH).with_provider(provider);
        let resolver = resolver_with(chain, store.clone(), true);

        resolver.resolve("Save", Language::ARABIC).await;
        resolver.clear_cache();

        assert!(resolver.cached("Save", Language::ARABIC).is_none());
        assert!(store.payload().is_none());

        resolver.resolve("Save", Language::ARABIC).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_text_resolves() {
        let resolver = resolver_with(
            ProviderChain::new(Language::ENGLISH),
            MemoryStore::new(),
            true,
        );

        assert_eq!(resolver.resolve("", Language::ARABIC).await, "");
    }
}
