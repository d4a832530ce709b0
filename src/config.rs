use std::time::Duration;

use anyhow::{bail, ensure, Context, Result};

use crate::lang::LanguageRegistry;

#[derive(Debug, Clone)]
pub struct Config {
    // Model backend
    pub opus_server_url: String,

    // Cache
    pub cache_capacity: usize,
    pub preload_languages: Vec<String>,

    // Request limits
    pub max_text_length: usize,
    pub request_deadline_secs: u64,
    pub model_load_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let cache_capacity: usize = std::env::var("MODEL_CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        ensure!(cache_capacity >= 1, "MODEL_CACHE_CAPACITY must be at least 1");

        let preload_raw =
            std::env::var("PRELOAD_LANGUAGES").unwrap_or_else(|_| "de,es,fr".to_string());
        let preload_languages =
            parse_preload_list(&preload_raw).context("invalid PRELOAD_LANGUAGES")?;

        Ok(Self {
            // Model backend - local OPUS-MT inference daemon
            opus_server_url: std::env::var("OPUS_SERVER_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8090".to_string()),

            cache_capacity,
            preload_languages,

            // Request limits
            max_text_length: std::env::var("MAX_TEXT_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            request_deadline_secs: std::env::var("REQUEST_DEADLINE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            model_load_timeout_secs: std::env::var("MODEL_LOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        })
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }

    pub fn model_load_timeout(&self) -> Duration {
        Duration::from_secs(self.model_load_timeout_secs)
    }
}

/// Parse a comma-separated preload list, validating every code against the
/// registry. Blank entries are skipped, duplicates collapse to the first
/// occurrence. An empty result is allowed and disables preloading.
fn parse_preload_list(raw: &str) -> Result<Vec<String>> {
    let registry = LanguageRegistry::get();
    let mut codes: Vec<String> = Vec::new();

    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if !registry.is_supported(code) {
            bail!("unsupported language code '{code}'");
        }
        if !codes.iter().any(|c| c == code) {
            codes.push(code.to_string());
        }
    }

    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "OPUS_SERVER_URL",
            "MODEL_CACHE_CAPACITY",
            "PRELOAD_LANGUAGES",
            "MAX_TEXT_LENGTH",
            "REQUEST_DEADLINE_SECS",
            "MODEL_LOAD_TIMEOUT_SECS",
        ] {
            std::env::remove_var(key);
        }
    }

    // ==================== Default Tests ====================

    #[test]
    #[serial(env)]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().expect("defaults should work");

        assert_eq!(config.opus_server_url, "http://127.0.0.1:8090");
        assert_eq!(config.cache_capacity, 5);
        assert_eq!(config.preload_languages, vec!["de", "es", "fr"]);
        assert_eq!(config.max_text_length, 1000);
        assert_eq!(config.request_deadline_secs, 30);
        assert_eq!(config.model_load_timeout_secs, 60);
    }

    #[test]
    #[serial(env)]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("OPUS_SERVER_URL", "http://10.0.0.7:9000");
        std::env::set_var("MODEL_CACHE_CAPACITY", "2");
        std::env::set_var("PRELOAD_LANGUAGES", "uk,pt");
        std::env::set_var("MAX_TEXT_LENGTH", "500");
        std::env::set_var("REQUEST_DEADLINE_SECS", "5");
        std::env::set_var("MODEL_LOAD_TIMEOUT_SECS", "10");

        let config = Config::from_env().expect("overrides should parse");
        assert_eq!(config.opus_server_url, "http://10.0.0.7:9000");
        assert_eq!(config.cache_capacity, 2);
        assert_eq!(config.preload_languages, vec!["uk", "pt"]);
        assert_eq!(config.max_text_length, 500);
        assert_eq!(config.request_deadline(), Duration::from_secs(5));
        assert_eq!(config.model_load_timeout(), Duration::from_secs(10));

        clear_env();
    }

    #[test]
    #[serial(env)]
    fn test_unparseable_numbers_fall_back_to_defaults() {
        clear_env();
        std::env::set_var("MODEL_CACHE_CAPACITY", "lots");
        std::env::set_var("MAX_TEXT_LENGTH", "-3");

        let config = Config::from_env().expect("should fall back");
        assert_eq!(config.cache_capacity, 5);
        assert_eq!(config.max_text_length, 1000);

        clear_env();
    }

    // ==================== Validation Tests ====================

    #[test]
    #[serial(env)]
    fn test_zero_capacity_is_rejected() {
        clear_env();
        std::env::set_var("MODEL_CACHE_CAPACITY", "0");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("MODEL_CACHE_CAPACITY"));

        clear_env();
    }

    #[test]
    #[serial(env)]
    fn test_unknown_preload_code_is_rejected() {
        clear_env();
        std::env::set_var("PRELOAD_LANGUAGES", "de,xx");

        let err = Config::from_env().unwrap_err();
        assert!(format!("{err:#}").contains("PRELOAD_LANGUAGES"));

        clear_env();
    }

    #[test]
    #[serial(env)]
    fn test_empty_preload_list_is_allowed() {
        clear_env();
        std::env::set_var("PRELOAD_LANGUAGES", "");

        let config = Config::from_env().expect("empty preload is valid");
        assert!(config.preload_languages.is_empty());

        clear_env();
    }

    // ==================== Preload Parsing Tests ====================

    #[test]
    fn test_parse_preload_trims_and_dedupes() {
        let codes = parse_preload_list(" de , es ,de,, fr ").unwrap();
        assert_eq!(codes, vec!["de", "es", "fr"]);
    }

    #[test]
    fn test_parse_preload_rejects_english() {
        assert!(parse_preload_list("en").is_err());
    }
}
