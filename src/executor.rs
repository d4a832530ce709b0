//! Sequential translation fan-out with an overall request deadline.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use crate::cache::ModelCache;
use crate::classifier::Category;
use crate::error::TranslateError;
use crate::lang::Language;
use crate::metrics::ServiceMetrics;
use crate::schema::TranslationMap;

/// Outcome of one fan-out pass.
#[derive(Debug)]
pub struct ExecutionReport {
    /// `en` plus each successful target, in request order.
    pub translations: TranslationMap,

    /// Failed targets and their causes.
    pub errors: BTreeMap<String, TranslateError>,
}

impl ExecutionReport {
    /// Whether at least one target beyond the source echo succeeded.
    pub fn any_translated(&self) -> bool {
        self.translations.len() > 1
    }
}

/// Translates into targets one at a time against the shared model cache.
///
/// The model daemon serves a single inference at a time, so targets are
/// processed sequentially under one overall deadline rather than in
/// parallel.
pub struct TranslationExecutor {
    cache: Arc<ModelCache>,
    deadline: Duration,
}

impl TranslationExecutor {
    pub fn new(cache: Arc<ModelCache>, deadline: Duration) -> Self {
        TranslationExecutor { cache, deadline }
    }

    /// Translate `text` into each of `targets`, stopping work at the
    /// deadline.
    ///
    /// Duplicates in `targets` are attempted once. Targets that fail, or
    /// that the deadline cuts off, are recorded per language; the report
    /// always carries the source text under `en`.
    pub async fn execute(
        &self,
        text: &str,
        targets: &[Language],
        category: Category,
    ) -> ExecutionReport {
        let deadline = Instant::now() + self.deadline;

        let mut report = ExecutionReport {
            translations: TranslationMap::new(),
            errors: BTreeMap::new(),
        };
        report.translations.insert("en", text);

        info!(
            "Translating {} chars ({}) into {} languages",
            text.chars().count(),
            category,
            targets.len()
        );

        let mut seen = HashSet::new();
        for language in targets {
            if !seen.insert(language.code()) {
                continue;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(
                    "Deadline exhausted before '{}' was attempted",
                    language.code()
                );
                report
                    .errors
                    .insert(language.code().to_string(), TranslateError::DeadlineExceeded);
                ServiceMetrics::global().record_translation_failure();
                continue;
            }

            match timeout(remaining, self.translate_one(*language, text)).await {
                Ok(Ok(translated)) => {
                    debug!("✓ Translated into '{}'", language.code());
                    report.translations.insert(language.code(), translated);
                    ServiceMetrics::global().record_translation();
                }
                Ok(Err(e)) => {
                    warn!("Translation into '{}' failed: {}", language.code(), e);
                    report.errors.insert(language.code().to_string(), e);
                    ServiceMetrics::global().record_translation_failure();
                }
                Err(_) => {
                    warn!("Deadline hit while translating into '{}'", language.code());
                    report
                        .errors
                        .insert(language.code().to_string(), TranslateError::DeadlineExceeded);
                    ServiceMetrics::global().record_translation_failure();
                }
            }
        }

        if report.errors.is_empty() {
            info!(
                "✓ Translated into {} languages",
                report.translations.len() - 1
            );
        } else {
            warn!(
                "Translated into {} languages, {} failed",
                report.translations.len() - 1,
                report.errors.len()
            );
        }

        report
    }

    async fn translate_one(
        &self,
        language: Language,
        text: &str,
    ) -> Result<String, TranslateError> {
        let engine = self.cache.get_or_load(language).await?;
        engine.translate(text).await
    }
}
