//! Translation metrics and observability module.
//!
//! Counters for the resolution pipeline: cache hits and misses, provider
//! calls and failures, offline fallbacks and exhausted provider chains. Each
//! resolver owns one instance.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Translation pipeline counters.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Lookups answered from the persistent cache
    cache_hits: AtomicUsize,

    /// Lookups not found in the persistent cache
    cache_misses: AtomicUsize,

    /// Individual provider invocations
    provider_calls: AtomicUsize,

    /// Provider invocations that errored, panicked or returned a malformed response
    provider_failures: AtomicUsize,

    /// Resolutions short-circuited because the network was unreachable
    offline_fallbacks: AtomicUsize,

    /// Resolutions where no provider produced a translation
    chains_exhausted: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_call(&self) {
        self.provider_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_offline_fallback(&self) {
        self.offline_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chain_exhausted(&self) {
        self.chains_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn provider_calls(&self) -> usize {
        self.provider_calls.load(Ordering::Relaxed)
    }

    pub fn provider_failures(&self) -> usize {
        self.provider_failures.load(Ordering::Relaxed)
    }

    pub fn offline_fallbacks(&self) -> usize {
        self.offline_fallbacks.load(Ordering::Relaxed)
    }

    pub fn chains_exhausted(&self) -> usize {
        self.chains_exhausted.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.provider_calls();
        let failures = self.provider_failures();
        let provider_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            provider_calls: calls,
            provider_failures: failures,
            provider_success_rate,
            offline_fallbacks: self.offline_fallbacks(),
            chains_exhausted: self.chains_exhausted(),
        }
    }
}

/// Snapshot of the translation counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub provider_calls: usize,
    pub provider_failures: usize,

    /// Provider success rate as a percentage (0-100)
    pub provider_success_rate: f64,

    pub offline_fallbacks: usize,
    pub chains_exhausted: usize,
}
