//! Service metrics and observability.
//!
//! Process-wide counters for model cache behavior and translation outcomes.
//! These are ambient observability, not part of the wire contract; binaries
//! log the report, tests assert on it.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global service metrics singleton.
pub struct ServiceMetrics {
    /// Number of times a requested model was already in the cache
    cache_hits: AtomicUsize,

    /// Number of times a requested model had to be loaded
    cache_misses: AtomicUsize,

    /// Number of successful backend model loads
    model_loads: AtomicUsize,

    /// Number of failed or timed-out model loads
    load_failures: AtomicUsize,

    /// Number of successful per-language translations
    translations: AtomicUsize,

    /// Number of failed per-language translations
    translation_failures: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<ServiceMetrics> = OnceLock::new();

impl ServiceMetrics {
    fn new() -> Self {
        ServiceMetrics {
            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
            model_loads: AtomicUsize::new(0),
            load_failures: AtomicUsize::new(0),
            translations: AtomicUsize::new(0),
            translation_failures: AtomicUsize::new(0),
        }
    }

    /// Get the global service metrics instance.
    pub fn global() -> &'static ServiceMetrics {
        METRICS.get_or_init(ServiceMetrics::new)
    }

    /// Record a cache hit (engine already loaded).
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss (load required).
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful backend model load.
    pub fn record_model_load(&self) {
        self.model_loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed or timed-out model load.
    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful per-language translation.
    pub fn record_translation(&self) {
        self.translations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed per-language translation.
    pub fn record_translation_failure(&self) {
        self.translation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn model_loads(&self) -> usize {
        self.model_loads.load(Ordering::Relaxed)
    }

    pub fn load_failures(&self) -> usize {
        self.load_failures.load(Ordering::Relaxed)
    }

    pub fn translations(&self) -> usize {
        self.translations.load(Ordering::Relaxed)
    }

    pub fn translation_failures(&self) -> usize {
        self.translation_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_lookups = hits + misses;
        let cache_hit_rate = if total_lookups > 0 {
            (hits as f64 / total_lookups as f64) * 100.0
        } else {
            0.0
        };

        let ok = self.translations();
        let failed = self.translation_failures();
        let attempts = ok + failed;
        let translation_success_rate = if attempts > 0 {
            (ok as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            model_loads: self.model_loads(),
            load_failures: self.load_failures(),
            translations: ok,
            translation_failures: failed,
            translation_success_rate,
        }
    }
}

/// Metrics report containing current service statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Number of cache hits
    pub cache_hits: usize,

    /// Number of cache misses
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    /// Number of successful model loads
    pub model_loads: usize,

    /// Number of failed model loads
    pub load_failures: usize,

    /// Number of successful per-language translations
    pub translations: usize,

    /// Number of failed per-language translations
    pub translation_failures: usize,

    /// Translation success rate as a percentage (0-100)
    pub translation_success_rate: f64,
}
