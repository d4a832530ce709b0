//! Error taxonomy for the translation service.
//!
//! Two layers:
//!
//! - [`TranslateError`] describes what went wrong for a *single* target
//!   language (model load, inference, deadline). It is `Clone` so that every
//!   caller waiting on a coalesced model load can receive the one attempt's
//!   outcome, and so the executor can record it per language without aborting
//!   the rest of the request.
//! - [`ServiceError`] describes why a whole request was rejected or failed.
//!   Validation variants are raised before any model access and never reach
//!   the cache or executor.

use std::collections::BTreeMap;

use thiserror::Error;

/// Failure scoped to one target language.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The requested code is not in the language registry.
    #[error("unsupported language code '{0}'")]
    UnsupportedLanguage(String),

    /// The backend could not download or initialize the model.
    #[error("model load failed: {0}")]
    LoadFailed(String),

    /// The model load did not finish within the configured bound.
    #[error("model load timed out after {0}s")]
    LoadTimeout(u64),

    /// The model was available but inference on it failed.
    #[error("inference failed: {0}")]
    InferenceFailed(String),

    /// The overall request deadline elapsed before this language completed.
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl TranslateError {
    /// True for the timeout-shaped failures (load timeout, request deadline).
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            TranslateError::LoadTimeout(_) | TranslateError::DeadlineExceeded
        )
    }
}

/// Failure of a whole `translate` request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("no text provided for translation")]
    EmptyText,

    #[error("text exceeds maximum length of {max} characters (got {got})")]
    TextTooLong { max: usize, got: usize },

    #[error("no target languages selected")]
    NoLanguagesSelected,

    #[error("invalid language codes: {}", .codes.join(", "))]
    UnknownLanguages { codes: Vec<String> },

    /// Every requested language failed; the map itemizes the causes.
    #[error("translation failed for all requested languages")]
    TranslationFailed {
        errors: BTreeMap<String, TranslateError>,
    },

    /// Unexpected fault in the orchestration layer itself.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// True for request-shape errors rejected before any model access.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ServiceError::EmptyText
                | ServiceError::TextTooLong { .. }
                | ServiceError::NoLanguagesSelected
                | ServiceError::UnknownLanguages { .. }
        )
    }

    /// HTTP status a transport layer should map this error to.
    ///
    /// Validation errors are the caller's fault (400). A total failure where
    /// every per-language cause was a timeout maps to 504; any other total
    /// failure or internal fault maps to 500.
    pub fn http_status(&self) -> u16 {
        match self {
            e if e.is_validation() => 400,
            ServiceError::TranslationFailed { errors }
                if !errors.is_empty() && errors.values().all(TranslateError::is_timeout) =>
            {
                504
            }
            _ => 500,
        }
    }

    /// Per-language causes, if this error carries any.
    pub fn per_language_errors(&self) -> Option<&BTreeMap<String, TranslateError>> {
        match self {
            ServiceError::TranslationFailed { errors } => Some(errors),
            _ => None,
        }
    }
}
