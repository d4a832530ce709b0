//! Language registry: single source of truth for all supported target
//! languages.
//!
//! Every language the service can translate into is declared here together
//! with its OPUS-MT model identifier. The registry uses a singleton pattern
//! with `OnceLock` for thread-safe initialization and access. English is the
//! source language and deliberately has no entry; requesting "en" as a target
//! is a validation error.

use std::sync::OnceLock;

/// Configuration for a supported target language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "de", "es", "fr")
    pub code: &'static str,

    /// Display name of the language (e.g., "Deutsch", "Español")
    pub name: &'static str,

    /// Identifier of the OPUS-MT model serving this language pair
    pub model: &'static str,

    /// Whether this language belongs to the default preload set
    pub priority: bool,
}

/// Global language registry singleton.
///
/// Contains all supported target languages and provides methods to query
/// them. Initialized once on first access and immutable thereafter.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Arguments
    /// * `code` - The ISO 639-1 language code (e.g., "de", "es")
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the code is unknown (including "en", the source language)
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all supported languages, in registry order.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Get the languages flagged for preloading at startup.
    pub fn list_priority(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.priority).collect()
    }

    /// Codes of the default preload set, in registry order.
    pub fn default_priority_codes(&self) -> Vec<&'static str> {
        self.languages
            .iter()
            .filter(|lang| lang.priority)
            .map(|lang| lang.code)
            .collect()
    }

    /// Check if a language code is supported as a translation target.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// Number of supported target languages.
    pub fn total(&self) -> usize {
        self.languages.len()
    }
}

/// Default language configurations.
///
/// Models are from Helsinki-NLP's OPUS-MT project; all of them run on a local
/// inference daemon, so text never leaves the host. The set can be extended
/// by adding rows here.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "da",
            name: "Danish",
            model: "Helsinki-NLP/opus-mt-en-da",
            priority: false,
        },
        LanguageConfig {
            code: "de",
            name: "Deutsch",
            model: "Helsinki-NLP/opus-mt-en-de",
            priority: true,
        },
        LanguageConfig {
            code: "el",
            name: "Greek",
            model: "Helsinki-NLP/opus-mt-en-el",
            priority: false,
        },
        LanguageConfig {
            code: "es",
            name: "Español",
            model: "Helsinki-NLP/opus-mt-en-es",
            priority: true,
        },
        LanguageConfig {
            code: "fr",
            name: "Français",
            model: "Helsinki-NLP/opus-mt-en-fr",
            priority: true,
        },
        LanguageConfig {
            code: "hr",
            name: "Croatian",
            model: "Helsinki-NLP/opus-mt-en-hr",
            priority: false,
        },
        LanguageConfig {
            code: "it",
            name: "Italiano",
            model: "Helsinki-NLP/opus-mt-en-it",
            priority: false,
        },
        LanguageConfig {
            code: "pt",
            name: "Português",
            // The standard en-pt pair is only released in the tc-big line.
            model: "Helsinki-NLP/opus-mt-tc-big-en-pt",
            priority: false,
        },
        LanguageConfig {
            code: "uk",
            name: "Ukrainian",
            model: "Helsinki-NLP/opus-mt-en-uk",
            priority: false,
        },
    ]
}
