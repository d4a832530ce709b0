//! Target-language support.
//!
//! All language-related logic lives here:
//!
//! - `registry`: single source of truth for supported languages and their
//!   OPUS-MT model identifiers
//! - `language`: validated `Language` type that can only be built from
//!   registry codes
//!
//! # Example
//!
//! ```rust
//! use alert_babel::lang::{Language, LanguageRegistry};
//!
//! let german = Language::from_code("de").unwrap();
//! assert_eq!(german.model(), "Helsinki-NLP/opus-mt-en-de");
//!
//! // "en" is the source language, not a target
//! assert!(LanguageRegistry::get().get_by_code("en").is_none());
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
