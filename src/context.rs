//! Application-root translation context.
//!
//! Owns the resolver (and through it the cache) plus the language signal.
//! The application builds one at startup and hands it to whatever creates
//! bindings; nothing in the crate keeps ambient global state.

use crate::binding::{SmartText, TextBinding};
use crate::cache::{FileStore, PersistentCache};
use crate::config::Config;
use crate::i18n::Language;
use crate::providers::ProviderChain;
use crate::reachability::ReachabilityMonitor;
use crate::resolver::TranslationResolver;
use crate::signal::LanguageSignal;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Background connectivity probe, aborted when the last context clone drops.
#[derive(Debug)]
struct ProbeTask(JoinHandle<()>);

impl Drop for ProbeTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Clone)]
pub struct TranslationContext {
    resolver: Arc<TranslationResolver>,
    signal: LanguageSignal,
    probe: Option<Arc<ProbeTask>>,
}

impl TranslationContext {
    pub fn new(resolver: TranslationResolver, signal: LanguageSignal) -> Self {
        Self {
            resolver: Arc::new(resolver),
            signal,
            probe: None,
        }
    }

    /// Wire the standard provider chain, file cache and reachability monitor.
    ///
    /// When a probe URL is configured and the context does not start offline,
    /// the periodic connectivity probe runs for as long as the context lives.
    /// Must be called inside a tokio runtime in that case.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.provider_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let store = FileStore::in_dir(&config.cache_dir);
        info!("Translation cache at {}", store.path().display());

        let chain = ProviderChain::standard(
            client.clone(),
            config.google_translate_url.clone(),
            config.libretranslate_url.clone(),
            config.libretranslate_api_key.clone(),
        );
        let resolver = TranslationResolver::new(
            PersistentCache::load(store),
            ReachabilityMonitor::new(!config.start_offline),
            chain,
        );

        let mut context = Self::new(resolver, LanguageSignal::new(config.initial_language));

        if let (Some(url), false) = (&config.connectivity_probe_url, config.start_offline) {
            info!(
                "Probing {} every {}s for connectivity",
                url,
                config.connectivity_probe_interval.as_secs()
            );
            let handle = context.resolver.reachability().spawn_probe(
                client,
                url.clone(),
                config.connectivity_probe_interval,
            );
            context.probe = Some(Arc::new(ProbeTask(handle)));
        }

        Ok(context)
    }

    pub fn resolver(&self) -> &Arc<TranslationResolver> {
        &self.resolver
    }

    pub fn signal(&self) -> &LanguageSignal {
        &self.signal
    }

    pub fn current_language(&self) -> Language {
        self.signal.current()
    }

    pub fn switch_to(&self, language: Language) {
        self.signal.switch_to(language);
    }

    /// Resolve `text` against the current language.
    pub async fn resolve(&self, text: &str) -> String {
        self.resolver.resolve(text, self.signal.current()).await
    }

    /// Live string binding (placeholders, titles, other non-element text).
    pub fn bind(&self, text: impl Into<String>) -> TextBinding {
        TextBinding::new(text, self.resolver.clone(), &self.signal)
    }

    /// Live element binding.
    pub fn smart_text(&self, text: impl Into<String>) -> SmartText {
        SmartText::new(text, self.resolver.clone(), &self.signal)
    }

    pub fn clear_cache(&self) {
        self.resolver.clear_cache();
    }
}
