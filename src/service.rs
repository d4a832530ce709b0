//! Request orchestration: validate, classify, fan out, assemble.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::warn;

use crate::cache::ModelCache;
use crate::classifier::classify;
use crate::config::Config;
use crate::error::ServiceError;
use crate::executor::TranslationExecutor;
use crate::lang::{Language, LanguageRegistry};
use crate::schema::{
    LanguageInfo, LanguagesResponse, ResponseMetadata, StatusResponse, TranslateRequest,
    TranslateResponse,
};

/// Transport-independent core of the service.
///
/// The CLI and the worker queue both drive this type; an HTTP handler would
/// sit on top of it the same way, pairing its errors with
/// [`ServiceError::http_status`].
pub struct TranslationService {
    cache: Arc<ModelCache>,
    executor: TranslationExecutor,
    max_text_length: usize,
    started_at: Instant,
}

impl TranslationService {
    pub fn new(cache: Arc<ModelCache>, config: &Config) -> Self {
        TranslationService {
            executor: TranslationExecutor::new(cache.clone(), config.request_deadline()),
            cache,
            max_text_length: config.max_text_length,
            started_at: Instant::now(),
        }
    }

    /// Handle one translation request end to end.
    ///
    /// The text is trimmed, validated, classified, then translated into
    /// every requested target.
    ///
    /// # Errors
    /// Validation failures ([`ServiceError::is_validation`]) are rejected
    /// before any model access. `TranslationFailed` is returned only when
    /// every target failed; a partial failure is a success whose
    /// `per_language_errors` names the targets that did not make it.
    pub async fn translate(
        &self,
        request: &TranslateRequest,
    ) -> Result<TranslateResponse, ServiceError> {
        let text = request.text.trim();
        let targets = match self.validate(text, &request.languages) {
            Ok(targets) => targets,
            Err(e) => {
                warn!("Rejected translation request: {}", e);
                return Err(e);
            }
        };

        let category = classify(text);
        let report = self.executor.execute(text, &targets, category).await;

        if !report.errors.is_empty() && !report.any_translated() {
            warn!("All {} target languages failed", report.errors.len());
            return Err(ServiceError::TranslationFailed {
                errors: report.errors,
            });
        }

        let json_output = report
            .translations
            .to_pretty_json()
            .map_err(|e| ServiceError::Internal(format!("could not render translations: {e}")))?;

        let per_language_errors: BTreeMap<String, String> = report
            .errors
            .iter()
            .map(|(code, e)| (code.clone(), e.to_string()))
            .collect();

        let models_loaded = self.cache.status().loaded_codes.len();

        Ok(TranslateResponse {
            success: true,
            original_text: text.to_string(),
            detected_category: category,
            translations: report.translations,
            json_output,
            per_language_errors,
            target_languages: targets.iter().map(|l| l.code().to_string()).collect(),
            timestamp: Utc::now(),
            metadata: ResponseMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                models_loaded,
                processing_language: "en".to_string(),
            },
        })
    }

    /// Check the trimmed text and resolve target codes against the registry.
    ///
    /// Returns the targets deduplicated in request order. All invalid codes
    /// are collected into one `UnknownLanguages` error, not just the first.
    fn validate(&self, text: &str, codes: &[String]) -> Result<Vec<Language>, ServiceError> {
        if text.is_empty() {
            return Err(ServiceError::EmptyText);
        }

        let got = text.chars().count();
        if got > self.max_text_length {
            return Err(ServiceError::TextTooLong {
                max: self.max_text_length,
                got,
            });
        }

        if codes.is_empty() {
            return Err(ServiceError::NoLanguagesSelected);
        }

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        let mut unknown: Vec<String> = Vec::new();
        for code in codes {
            match Language::from_code(code) {
                Ok(language) => {
                    if seen.insert(language.code()) {
                        targets.push(language);
                    }
                }
                Err(_) => {
                    if !unknown.iter().any(|c| c == code) {
                        unknown.push(code.clone());
                    }
                }
            }
        }

        if !unknown.is_empty() {
            return Err(ServiceError::UnknownLanguages { codes: unknown });
        }

        Ok(targets)
    }

    /// Health and cache snapshot. Never touches the model backend.
    pub fn status(&self) -> StatusResponse {
        let cache = self.cache.status();
        let registry = LanguageRegistry::get();

        // Degraded when a preload set was configured but none of it is
        // resident, which is what an unreachable model daemon looks like.
        let degraded = !cache.preload_codes.is_empty()
            && !cache
                .preload_codes
                .iter()
                .any(|code| cache.loaded_codes.contains(code));

        let models_loaded = cache.loaded_codes.len();

        StatusResponse {
            status: if degraded { "ERROR" } else { "OK" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            models_loaded,
            supported_languages: registry.total(),
            available_models: cache.loaded_codes,
            preload_languages: cache.preload_codes,
            uptime_secs: self.started_at.elapsed().as_secs(),
            timestamp: Utc::now(),
        }
    }

    /// Registry dump plus which of it is currently loaded.
    pub fn languages(&self) -> LanguagesResponse {
        let cache = self.cache.status();
        let registry = LanguageRegistry::get();

        let supported_languages: BTreeMap<String, LanguageInfo> = registry
            .list_all()
            .into_iter()
            .map(|config| {
                (
                    config.code.to_string(),
                    LanguageInfo {
                        name: config.name.to_string(),
                        model: config.model.to_string(),
                    },
                )
            })
            .collect();

        let total_loaded = cache.loaded_codes.len();

        LanguagesResponse {
            supported_languages,
            loaded_models: cache.loaded_codes,
            default_languages: registry
                .default_priority_codes()
                .iter()
                .map(|c| c.to_string())
                .collect(),
            priority_languages: cache.preload_codes,
            total_available: registry.total(),
            total_loaded,
        }
    }
}
