//! Wire-level request and response types.
//!
//! These are the serde-ready shapes a transport layer (HTTP handler, CLI,
//! message consumer) exchanges with the service. The service itself never
//! frames HTTP; callers pair these types with
//! [`ServiceError::http_status`](crate::error::ServiceError::http_status)
//! to wire their own transport.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::classifier::Category;
use crate::error::ServiceError;

/// A translation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    /// English monitoring message to classify and translate.
    pub text: String,

    /// Target language codes, in the order translations should appear.
    #[serde(default)]
    pub languages: Vec<String>,
}

/// Map of language code to translated text that preserves insertion order.
///
/// JSON objects from this service list `en` first and then the targets in
/// caller order, so downstream diffs and logs stay stable. A plain
/// `HashMap`/`BTreeMap` would reorder the keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMap {
    entries: Vec<(String, String)>,
}

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a translation, replacing in place if the code already exists.
    pub fn insert(&mut self, code: impl Into<String>, text: impl Into<String>) {
        let code = code.into();
        let text = text.into();
        if let Some(entry) = self.entries.iter_mut().find(|(c, _)| *c == code) {
            entry.1 = text;
        } else {
            self.entries.push((code, text));
        }
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, t)| t.as_str())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|(c, _)| c == code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Language codes in insertion order.
    pub fn codes(&self) -> Vec<&str> {
        self.entries.iter().map(|(c, _)| c.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, t)| (c.as_str(), t.as_str()))
    }

    /// Pretty-printed JSON rendering (two-space indent, UTF-8 as-is).
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for TranslationMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, text) in &self.entries {
            map.serialize_entry(code, text)?;
        }
        map.end()
    }
}

/// Metadata block attached to every successful translation response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    /// Service version.
    pub version: String,

    /// Number of models loaded at response time.
    pub models_loaded: usize,

    /// Source language of all processing.
    pub processing_language: String,
}

/// Successful translation response.
#[derive(Debug, Clone, Serialize)]
pub struct TranslateResponse {
    /// Always `true` on this type; failures use [`ErrorResponse`].
    pub success: bool,

    pub original_text: String,

    pub detected_category: Category,

    /// `en` plus every successfully translated target, in request order.
    pub translations: TranslationMap,

    /// The `translations` object pretty-printed, ready for embedding into
    /// logging pipelines as a string payload.
    pub json_output: String,

    /// Languages that failed, with human-readable causes. Omitted when all
    /// targets succeeded.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub per_language_errors: BTreeMap<String, String>,

    /// Target codes as requested (deduplicated, order preserved).
    pub target_languages: Vec<String>,

    pub timestamp: DateTime<Utc>,

    pub metadata: ResponseMetadata,
}

/// Failure envelope for a whole request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,

    pub error: String,

    /// Per-language causes when the failure itemizes them.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub per_language_errors: BTreeMap<String, String>,
}

impl ErrorResponse {
    pub fn from_error(err: &ServiceError) -> Self {
        let per_language_errors = err
            .per_language_errors()
            .map(|errors| {
                errors
                    .iter()
                    .map(|(code, e)| (code.clone(), e.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        ErrorResponse {
            success: false,
            error: err.to_string(),
            per_language_errors,
        }
    }
}

/// Health/status snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// `"OK"`, or `"ERROR"` when a non-empty preload set has nothing loaded.
    pub status: String,

    pub version: String,

    /// Number of models currently loaded.
    pub models_loaded: usize,

    /// Total number of supported target languages.
    pub supported_languages: usize,

    /// Codes of currently loaded models, sorted.
    pub available_models: Vec<String>,

    /// Configured preload set.
    pub preload_languages: Vec<String>,

    pub uptime_secs: u64,

    pub timestamp: DateTime<Utc>,
}

/// Description of one supported language in the languages listing.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageInfo {
    pub name: String,
    pub model: String,
}

/// Supported-languages listing.
#[derive(Debug, Clone, Serialize)]
pub struct LanguagesResponse {
    /// All supported targets keyed by code.
    pub supported_languages: BTreeMap<String, LanguageInfo>,

    /// Codes of currently loaded models, sorted.
    pub loaded_models: Vec<String>,

    /// Built-in default preload set.
    pub default_languages: Vec<String>,

    /// Operative preload set (may differ from the defaults via config).
    pub priority_languages: Vec<String>,

    pub total_available: usize,

    pub total_loaded: usize,
}
