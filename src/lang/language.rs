//! Language type: validated target-language representation.
//!
//! A `Language` can only be constructed from a code present in the registry,
//! so every instance is guaranteed to carry a real model identifier. Code that
//! holds a `Language` never needs to re-validate.

use crate::error::TranslateError;
use crate::lang::{LanguageConfig, LanguageRegistry};

/// A validated translation target language.
#[derive(Debug, Clone, Copy)]
pub struct Language {
    config: &'static LanguageConfig,
}

impl Language {
    /// Create a Language from a language code string.
    ///
    /// # Arguments
    /// * `code` - The ISO 639-1 language code (e.g., "de", "es")
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is in the registry
    /// * `Err(TranslateError::UnsupportedLanguage)` otherwise (including "en",
    ///   which is the source language, not a target)
    pub fn from_code(code: &str) -> Result<Language, TranslateError> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) => Ok(Language { config }),
            None => Err(TranslateError::UnsupportedLanguage(code.to_string())),
        }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.config.code
    }

    /// Get the display name of the language.
    pub fn name(&self) -> &'static str {
        self.config.name
    }

    /// Get the OPUS-MT model identifier for this language pair.
    pub fn model(&self) -> &'static str {
        self.config.model
    }

    /// Whether this language belongs to the default preload set.
    pub fn is_priority(&self) -> bool {
        self.config.priority
    }

    /// Get the full language configuration.
    pub fn config(&self) -> &'static LanguageConfig {
        self.config
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.config.code == other.config.code
    }
}

impl Eq for Language {}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.config.code)
    }
}
