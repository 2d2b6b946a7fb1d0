use std::time::Duration;

use anyhow::Result;
use log::{error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::TranslationBackend;
use crate::errors::ProviderError;
use async_trait::async_trait;

/// Client for the Google Translate v2 batch API
#[derive(Debug)]
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// API key passed as the `key` query parameter
    api_key: String,
    /// API endpoint URL
    endpoint: String,
    /// Maximum number of retry attempts after the first try
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
    /// Ceiling for the backoff delay in milliseconds
    backoff_ceiling_ms: u64,
}

/// Translation request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    /// Texts to translate
    q: &'a [String],
    /// Source language code
    source: &'a str,
    /// Target language code
    target: &'a str,
    /// Keep the API from HTML-escaping the payload
    format: &'static str,
}

/// Top-level translation response
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    /// Response payload wrapper
    data: Option<TranslateData>,
}

/// Response payload
#[derive(Debug, Deserialize)]
struct TranslateData {
    /// One entry per input text, in input order
    translations: Option<Vec<Translation>>,
}

/// A single translation result
#[derive(Debug, Deserialize)]
struct Translation {
    /// The translated text
    #[serde(rename = "translatedText")]
    translated_text: String,

    /// Source language the API detected, when it differs from `source`
    #[serde(rename = "detectedSourceLanguage")]
    #[allow(dead_code)]
    detected_source_language: Option<String>,
}

impl GoogleTranslate {
    /// Default public endpoint
    pub const DEFAULT_ENDPOINT: &'static str =
        "https://translation.googleapis.com/language/translate/v2";

    /// Create a new client with default retry settings
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, 3, 250, 30_000, 30)
    }

    /// Create a new client with explicit retry and timeout settings
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        max_retries: u32,
        backoff_base_ms: u64,
        backoff_ceiling_ms: u64,
        timeout_secs: u64,
    ) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: if endpoint.is_empty() {
                Self::DEFAULT_ENDPOINT.to_string()
            } else {
                endpoint
            },
            max_retries,
            backoff_base_ms,
            backoff_ceiling_ms,
        }
    }

    /// Build the request URL with the API key attached
    fn request_url(&self) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint: {}", e)))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Backoff delay for a given attempt: base delay doubling, capped
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let ms = self
            .backoff_base_ms
            .saturating_mul(1u64 << exp)
            .min(self.backoff_ceiling_ms);
        Duration::from_millis(ms)
    }

    /// Issue one translation request without retrying
    async fn request_once(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let url = self.request_url()?;
        let body = TranslateRequest {
            q: texts,
            source: source_lang,
            target: target_lang,
            format: "text",
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let translations = parsed
            .data
            .and_then(|d| d.translations)
            .filter(|t| !t.is_empty())
            .ok_or(ProviderError::NoTranslations {
                expected: texts.len(),
            })?;

        if translations.len() != texts.len() {
            return Err(ProviderError::CountMismatch {
                sent: texts.len(),
                received: translations.len(),
            });
        }

        Ok(translations.into_iter().map(|t| t.translated_text).collect())
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslate {
    /// Translate a batch with retry logic.
    ///
    /// Transient failures (5xx, 429, network errors) are retried with
    /// exponential backoff up to the configured attempt count. Other client
    /// errors fail fast: retrying a 400 only re-pays for the same rejection.
    async fn translate_batch(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            match self.request_once(texts, source_lang, target_lang).await {
                Ok(translations) => return Ok(translations),
                Err(e) if e.is_transient() => {
                    warn!(
                        "Translation request failed ({}) - attempt {}/{}",
                        e,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    error!("Translation request failed permanently: {}", e);
                    return Err(e);
                }
            }

            attempt += 1;
            if attempt <= self.max_retries {
                tokio::time::sleep(self.backoff_delay(attempt)).await;
            }
        }

        Err(last_error.unwrap_or(ProviderError::RequestFailed(format!(
            "request failed after {} attempts",
            self.max_retries + 1
        ))))
    }
}
