//! Translation providers and the ordered fallback chain.
//!
//! Each provider turns `(text, source, target)` into an optional translation.
//! The chain asks them in priority order and stops at the first usable answer.
//! A provider that errors, returns a malformed body, returns blank text or
//! panics is logged and skipped; the chain itself never fails.

use crate::i18n::Language;
use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_GOOGLE_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_LIBRETRANSLATE_URL: &str = "https://libretranslate.de/translate";

/// Failure of a single provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("provider panicked")]
    Panicked,
}

/// A translation back-end.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Short identifier used in logs and chain reports.
    fn name(&self) -> &str;

    /// Translate `text` from `source` into `target`.
    ///
    /// `Ok(None)` means the provider has no answer.
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<Option<String>, ProviderError>;
}

/// Result of asking one provider.
#[derive(Debug)]
pub enum ProviderOutcome {
    Translated(String),
    Absent,
    Failed(ProviderError),
}

impl ProviderOutcome {
    fn from_result(result: Result<Option<String>, ProviderError>) -> Self {
        match result {
            Ok(Some(text)) if !text.trim().is_empty() => ProviderOutcome::Translated(text),
            Ok(_) => ProviderOutcome::Absent,
            Err(e) => ProviderOutcome::Failed(e),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ProviderOutcome::Failed(_))
    }
}

/// One provider invocation inside a chain run.
#[derive(Debug)]
pub struct ProviderAttempt {
    pub provider: String,
    pub outcome: ProviderOutcome,
}

/// Every attempt made during one chain run, in order.
#[derive(Debug, Default)]
pub struct ChainReport {
    pub attempts: Vec<ProviderAttempt>,
}

impl ChainReport {
    /// The translation that ended the run, if any.
    pub fn into_translation(self) -> Option<String> {
        self.attempts
            .into_iter()
            .find_map(|attempt| match attempt.outcome {
                ProviderOutcome::Translated(text) => Some(text),
                _ => None,
            })
    }

    pub fn failures(&self) -> usize {
        self.attempts
            .iter()
            .filter(|attempt| attempt.outcome.is_failure())
            .count()
    }
}

/// Providers in priority order.
pub struct ProviderChain {
    source: Language,
    providers: Vec<Box<dyn TranslationProvider>>,
}

impl ProviderChain {
    /// Empty chain translating out of `source`.
    pub fn new(source: Language) -> Self {
        Self {
            source,
            providers: Vec::new(),
        }
    }

    /// Append a provider with the lowest priority so far.
    pub fn with_provider(mut self, provider: impl TranslationProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Google Translate, then the Microsoft placeholder, then LibreTranslate.
    pub fn standard(
        client: reqwest::Client,
        google_url: impl Into<String>,
        libretranslate_url: impl Into<String>,
        libretranslate_api_key: Option<String>,
    ) -> Self {
        Self::new(Language::canonical())
            .with_provider(GoogleTranslateProvider::new(client.clone(), google_url))
            .with_provider(PlaceholderProvider::new("microsoft"))
            .with_provider(LibreTranslateProvider::new(
                client,
                libretranslate_url,
                libretranslate_api_key,
            ))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// First usable translation of `text` into `target`, or `None`.
    pub async fn attempt(&self, text: &str, target: Language) -> Option<String> {
        self.run(text, target).await.into_translation()
    }

    /// Walk the chain and report every attempt made.
    ///
    /// Stops at the first provider that yields a translation; each provider
    /// is asked at most once.
    pub async fn run(&self, text: &str, target: Language) -> ChainReport {
        let mut report = ChainReport::default();

        for provider in &self.providers {
            let call = provider.translate(text, self.source, target);
            let result = match AssertUnwindSafe(call).catch_unwind().await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Panicked),
            };
            let outcome = ProviderOutcome::from_result(result);

            match &outcome {
                ProviderOutcome::Translated(_) => {
                    debug!("{} translated text into {}", provider.name(), target);
                }
                ProviderOutcome::Absent => {
                    debug!("{} had no translation into {}", provider.name(), target);
                }
                ProviderOutcome::Failed(e) => {
                    warn!("{} translation into {} failed: {}", provider.name(), target, e);
                }
            }

            let done = matches!(outcome, ProviderOutcome::Translated(_));
            report.attempts.push(ProviderAttempt {
                provider: provider.name().to_string(),
                outcome,
            });
            if done {
                break;
            }
        }

        report
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
    Err(ProviderError::Status { status, body })
}

// ==================== Google Translate ====================

/// Public Google Translate endpoint (`client=gtx`).
///
/// The response is a nested JSON array; `data[0]` lists sentence segments
/// whose first element is the translated sentence.
pub struct GoogleTranslateProvider {
    client: reqwest::Client,
    url: String,
}

impl GoogleTranslateProvider {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

fn parse_google_response(body: &serde_json::Value) -> Result<String, ProviderError> {
    let segments = body
        .get(0)
        .and_then(|segments| segments.as_array())
        .ok_or_else(|| ProviderError::Malformed("missing segment list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|text| text.as_str()))
        .collect();

    if translated.is_empty() {
        return Err(ProviderError::Malformed(
            "segment list contained no text".to_string(),
        ));
    }

    Ok(translated)
}

#[async_trait]
impl TranslationProvider for GoogleTranslateProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<Option<String>, ProviderError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("client", "gtx"),
                ("sl", source.code()),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let body: serde_json::Value = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        parse_google_response(&body).map(Some)
    }
}

// ==================== LibreTranslate ====================

#[derive(Debug, Serialize)]
struct LibreTranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LibreTranslateResponse {
    translated_text: Option<String>,
}

/// LibreTranslate `/translate` endpoint.
pub struct LibreTranslateProvider {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl LibreTranslateProvider {
    pub fn new(client: reqwest::Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl TranslationProvider for LibreTranslateProvider {
    fn name(&self) -> &str {
        "libretranslate"
    }

    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<Option<String>, ProviderError> {
        let request = LibreTranslateRequest {
            q: text,
            source: source.code(),
            target: target.code(),
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self.client.post(&self.url).json(&request).send().await?;

        let body: LibreTranslateResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(body.translated_text)
    }
}

// ==================== Placeholder ====================

/// A provider slot that is not wired up yet. Always answers `None`.
pub struct PlaceholderProvider {
    name: String,
}

impl PlaceholderProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl TranslationProvider for PlaceholderProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(
        &self,
        _text: &str,
        _source: Language,
        _target: Language,
    ) -> Result<Option<String>, ProviderError> {
        Ok(None)
    }
}
