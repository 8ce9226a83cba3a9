use crate::cache::FileStore;
use crate::i18n::Language;
use crate::providers::{DEFAULT_GOOGLE_TRANSLATE_URL, DEFAULT_LIBRETRANSLATE_URL};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Language
    pub initial_language: Language,

    // Cache
    pub cache_dir: PathBuf,

    // Providers
    pub google_translate_url: String,
    pub libretranslate_url: String,
    pub libretranslate_api_key: Option<String>,
    pub provider_timeout: Duration,

    // Reachability
    pub connectivity_probe_url: Option<String>,
    pub connectivity_probe_interval: Duration,
    pub start_offline: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let initial_language = match std::env::var("INITIAL_LANGUAGE") {
            Ok(code) => Language::from_code(code.trim())
                .with_context(|| format!("INITIAL_LANGUAGE '{}' is not supported", code))?,
            Err(_) => Language::canonical(),
        };

        Ok(Self {
            initial_language,

            cache_dir: std::env::var("TRANSLATION_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| FileStore::default_dir()),

            google_translate_url: std::env::var("GOOGLE_TRANSLATE_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_TRANSLATE_URL.to_string()),
            libretranslate_url: std::env::var("LIBRETRANSLATE_URL")
                .unwrap_or_else(|_| DEFAULT_LIBRETRANSLATE_URL.to_string()),
            libretranslate_api_key: std::env::var("LIBRETRANSLATE_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            provider_timeout: Duration::from_secs(
                std::env::var("PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),

            connectivity_probe_url: std::env::var("CONNECTIVITY_PROBE_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            connectivity_probe_interval: Duration::from_secs(
                std::env::var("CONNECTIVITY_PROBE_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|secs: &u64| *secs > 0)
                    .unwrap_or(30),
            ),
            start_offline: std::env::var("START_OFFLINE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "INITIAL_LANGUAGE",
        "TRANSLATION_CACHE_DIR",
        "GOOGLE_TRANSLATE_URL",
        "LIBRETRANSLATE_URL",
        "LIBRETRANSLATE_API_KEY",
        "PROVIDER_TIMEOUT_SECS",
        "CONNECTIVITY_PROBE_URL",
        "CONNECTIVITY_PROBE_INTERVAL_SECS",
        "START_OFFLINE",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().expect("Defaults should load");

        assert_eq!(config.initial_language, Language::ENGLISH);
        assert_eq!(config.google_translate_url, DEFAULT_GOOGLE_TRANSLATE_URL);
        assert_eq!(config.libretranslate_url, DEFAULT_LIBRETRANSLATE_URL);
        assert!(config.libretranslate_api_key.is_none());
        assert_eq!(config.provider_timeout, Duration::from_secs(10));
        assert!(config.connectivity_probe_url.is_none());
        assert_eq!(config.connectivity_probe_interval, Duration::from_secs(30));
        assert!(!config.start_offline);
        assert!(config.cache_dir.ends_with("smart-translate"));
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("INITIAL_LANGUAGE", "ar");
        std::env::set_var("TRANSLATION_CACHE_DIR", "/tmp/tr-cache");
        std::env::set_var("LIBRETRANSLATE_API_KEY", "key-123");
        std::env::set_var("PROVIDER_TIMEOUT_SECS", "3");
        std::env::set_var("CONNECTIVITY_PROBE_URL", "https://example.com");
        std::env::set_var("START_OFFLINE", "true");

        let config = Config::from_env().expect("Overrides should load");
        clear_env();

        assert_eq!(config.initial_language, Language::ARABIC);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/tr-cache"));
        assert_eq!(config.libretranslate_api_key.as_deref(), Some("key-123"));
        assert_eq!(config.provider_timeout, Duration::from_secs(3));
        assert_eq!(
            config.connectivity_probe_url.as_deref(),
            Some("https://example.com")
        );
        assert!(config.start_offline);
    }

    #[test]
    #[serial]
    fn test_unsupported_initial_language_is_rejected() {
        clear_env();
        std::env::set_var("INITIAL_LANGUAGE", "fr");

        let result = Config::from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("INITIAL_LANGUAGE"));
    }

    #[test]
    #[serial]
    fn test_invalid_numbers_fall_back_to_defaults() {
        clear_env();
        std::env::set_var("PROVIDER_TIMEOUT_SECS", "soon");
        std::env::set_var("CONNECTIVITY_PROBE_INTERVAL_SECS", "0");

        let config = Config::from_env().expect("Should load");
        clear_env();

        assert_eq!(config.provider_timeout, Duration::from_secs(10));
        assert_eq!(config.connectivity_probe_interval, Duration::from_secs(30));
    }
}
