//! Bounded, lazily populated cache of translation engines.
//!
//! The cache holds at most `capacity` loaded engines. A requested language
//! that is not loaded triggers a backend load; concurrent requests for the
//! same language coalesce onto a single load whose outcome (success or
//! failure) is broadcast to every waiter. When an insert would exceed
//! capacity, the least-recently-used engine is evicted, except that preload
//! languages are never evicted: with a preload set at or above capacity the
//! cache may briefly hold `loaded preload + 1` engines.
//!
//! A language code that is not in the registry cannot reach this module at
//! all: [`get_or_load`](ModelCache::get_or_load) takes a validated
//! [`Language`], so an unregistered code can never produce an engine.
//!
//! Locking: all interior state sits behind one `parking_lot::Mutex` that is
//! only ever held for map bookkeeping, never across an await. Loads run
//! outside the lock, so `status()` and cache hits stay responsive while a
//! model downloads.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::{Engine, ModelBackend};
use crate::error::TranslateError;
use crate::lang::Language;
use crate::metrics::ServiceMetrics;

/// Outcome of a coalesced load, broadcast to every waiter.
#[derive(Clone)]
enum LoadState {
    Pending,
    Done(Result<Arc<Engine>, TranslateError>),
}

/// What a caller found under the lock.
enum Role {
    /// Another task is loading this language; await its broadcast.
    Waiter(watch::Receiver<LoadState>),
    /// This task owns the load and must broadcast the outcome.
    Loader(watch::Sender<LoadState>),
}

struct CacheEntry {
    engine: Arc<Engine>,
    last_used: Instant,
}

#[derive(Default)]
struct CacheInner {
    engines: HashMap<&'static str, CacheEntry>,
    /// In-flight loads by language code. An entry whose sender is gone marks
    /// a loader that was cancelled mid-load; the next caller replaces it.
    loading: HashMap<&'static str, watch::Receiver<LoadState>>,
}

/// Snapshot of the cache for introspection endpoints.
#[derive(Debug, Clone)]
pub struct CacheStatus {
    /// Codes of currently loaded engines, sorted.
    pub loaded_codes: Vec<String>,
    /// Configured capacity.
    pub capacity: usize,
    /// Configured preload set, in preload order.
    pub preload_codes: Vec<String>,
}

/// Bounded store of loaded translation engines, shared across requests.
pub struct ModelCache {
    backend: Arc<dyn ModelBackend>,
    capacity: usize,
    preload_codes: Vec<String>,
    load_timeout: Duration,
    inner: Mutex<CacheInner>,
}

impl ModelCache {
    /// Create a cache over `backend` using the cache-related fields of
    /// `config` (capacity, preload set, per-load timeout).
    pub fn new(backend: Arc<dyn ModelBackend>, config: &Config) -> Self {
        ModelCache {
            backend,
            capacity: config.cache_capacity,
            preload_codes: config.preload_languages.clone(),
            load_timeout: config.model_load_timeout(),
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Get the engine for `language`, loading it if necessary.
    ///
    /// Concurrent callers for the same language share a single backend load
    /// and all receive its outcome. Failures are not cached: the next call
    /// after a failed load starts a fresh attempt.
    ///
    /// # Errors
    /// `LoadFailed` if the backend cannot produce the model, `LoadTimeout`
    /// if the load exceeds the configured bound.
    pub async fn get_or_load(&self, language: Language) -> Result<Arc<Engine>, TranslateError> {
        let code = language.code();

        loop {
            let role = {
                let mut inner = self.inner.lock();

                if let Some(entry) = inner.engines.get_mut(code) {
                    entry.last_used = Instant::now();
                    ServiceMetrics::global().record_cache_hit();
                    debug!("Cache hit for '{}'", code);
                    return Ok(entry.engine.clone());
                }

                // A receiver whose sender is gone belongs to a cancelled
                // loader; replace it instead of waiting forever.
                let live = inner
                    .loading
                    .get(code)
                    .filter(|rx| rx.has_changed().is_ok())
                    .cloned();
                match live {
                    Some(rx) => Role::Waiter(rx),
                    None => {
                        let (tx, rx) = watch::channel(LoadState::Pending);
                        inner.loading.insert(code, rx);
                        Role::Loader(tx)
                    }
                }
            };

            match role {
                Role::Loader(tx) => return self.run_load(language, tx).await,
                Role::Waiter(mut rx) => {
                    debug!("Joining in-flight load for '{}'", code);
                    match rx.wait_for(|s| matches!(s, LoadState::Done(_))).await {
                        Ok(state) => {
                            if let LoadState::Done(result) = &*state {
                                return result.clone();
                            }
                        }
                        Err(_) => {
                            // Loader cancelled without broadcasting; retry,
                            // possibly becoming the new loader.
                            continue;
                        }
                    }
                }
            }
        }
    }

    /// Execute the load this task owns, publish the outcome, and keep the
    /// maps consistent.
    async fn run_load(
        &self,
        language: Language,
        tx: watch::Sender<LoadState>,
    ) -> Result<Arc<Engine>, TranslateError> {
        let code = language.code();
        let metrics = ServiceMetrics::global();
        metrics.record_cache_miss();
        info!("Cache miss for '{}', loading model", code);

        let started = Instant::now();
        let result = match tokio::time::timeout(self.load_timeout, self.backend.load(language)).await
        {
            Ok(Ok(handle)) => {
                metrics.record_model_load();
                info!(
                    "Model for '{}' ready in {:.1}s",
                    code,
                    started.elapsed().as_secs_f64()
                );
                Ok(Arc::new(Engine::new(language, handle)))
            }
            Ok(Err(e)) => {
                metrics.record_load_failure();
                warn!("Model load for '{}' failed: {}", code, e);
                Err(e)
            }
            Err(_) => {
                metrics.record_load_failure();
                warn!(
                    "Model load for '{}' timed out after {}s",
                    code,
                    self.load_timeout.as_secs()
                );
                Err(TranslateError::LoadTimeout(self.load_timeout.as_secs()))
            }
        };

        // Maps first, broadcast second: once the lock drops the in-flight
        // entry is gone, so a caller arriving after the broadcast starts a
        // fresh load instead of reading a finished channel.
        let evicted = {
            let mut inner = self.inner.lock();
            inner.loading.remove(code);
            match &result {
                Ok(engine) => self.insert_and_evict(&mut inner, code, engine.clone()),
                Err(_) => Vec::new(),
            }
        };

        let _ = tx.send(LoadState::Done(result.clone()));

        // Close evicted engines off the request path.
        for engine in evicted {
            tokio::spawn(async move { engine.close().await });
        }

        result
    }

    /// Insert `engine`, evicting least-recently-used non-preload engines
    /// while over capacity. Returns the engines removed.
    fn insert_and_evict(
        &self,
        inner: &mut CacheInner,
        code: &'static str,
        engine: Arc<Engine>,
    ) -> Vec<Arc<Engine>> {
        let mut evicted = Vec::new();

        while inner.engines.len() >= self.capacity {
            let victim = inner
                .engines
                .iter()
                .filter(|(c, _)| !self.is_preload(c))
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(c, _)| *c);

            match victim {
                Some(victim_code) => {
                    if let Some(entry) = inner.engines.remove(victim_code) {
                        info!("Evicting model '{}' to make room for '{}'", victim_code, code);
                        evicted.push(entry.engine);
                    }
                }
                // Only preload languages are loaded; let the insert overshoot.
                None => break,
            }
        }

        inner.engines.insert(
            code,
            CacheEntry {
                engine,
                last_used: Instant::now(),
            },
        );
        evicted
    }

    fn is_preload(&self, code: &str) -> bool {
        self.preload_codes.iter().any(|c| c == code)
    }

    /// Load the configured preload set, one language at a time. Individual
    /// failures are logged and tolerated; returns how many loads succeeded.
    pub async fn preload(&self) -> usize {
        let mut loaded = 0;

        for code in self.preload_codes.clone() {
            match Language::from_code(&code) {
                Ok(language) => match self.get_or_load(language).await {
                    Ok(_) => loaded += 1,
                    Err(e) => warn!("Preload of '{}' failed: {}", code, e),
                },
                Err(e) => warn!("Preload of '{}' skipped: {}", code, e),
            }
        }

        if !self.preload_codes.is_empty() {
            if loaded == self.preload_codes.len() {
                info!("✓ Preloaded {} priority language models", loaded);
            } else {
                warn!(
                    "Preloaded {}/{} priority language models",
                    loaded,
                    self.preload_codes.len()
                );
            }
        }

        loaded
    }

    /// Snapshot the cache state. Never blocked by an in-flight load.
    pub fn status(&self) -> CacheStatus {
        let inner = self.inner.lock();
        let mut loaded_codes: Vec<String> =
            inner.engines.keys().map(|c| c.to_string()).collect();
        loaded_codes.sort_unstable();

        CacheStatus {
            loaded_codes,
            capacity: self.capacity,
            preload_codes: self.preload_codes.clone(),
        }
    }

    /// Close every cached engine and forget in-flight bookkeeping. Used on
    /// process shutdown.
    pub async fn shutdown(&self) {
        let engines: Vec<Arc<Engine>> = {
            let mut inner = self.inner.lock();
            inner.loading.clear();
            inner.engines.drain().map(|(_, entry)| entry.engine).collect()
        };

        for engine in engines {
            engine.close().await;
        }
    }
}
