use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::file_utils::FileManager;
use crate::language_utils;
use crate::localized_text::DEFAULT_LOCALE_PRIORITY;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Entity type name used in the result file name (e.g. "district")
    pub entity: String,

    /// Localized-text field names to backfill
    pub fields: Vec<String>,

    /// Source-locale priority order: primary, secondary, tertiary
    #[serde(default = "default_locale_priority")]
    pub locale_priority: Vec<String>,

    /// Target locale to fill in (e.g. "ru_RU")
    pub target_locale: String,

    /// Directory holding the progress and result files
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Translation API config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Job execution config
    #[serde(default)]
    pub job: JobConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation API settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// API endpoint URL; empty means the public default
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// API key, appended as the `key` query parameter
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Retry attempts after the first try
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff time in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Ceiling for the backoff delay in milliseconds
    #[serde(default = "default_retry_backoff_ceiling_ms")]
    pub retry_backoff_ceiling_ms: u64,

    /// Fixed delay between consecutive API calls in milliseconds
    #[serde(default = "default_courtesy_delay_ms")]
    pub courtesy_delay_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            retry_backoff_ceiling_ms: default_retry_backoff_ceiling_ms(),
            courtesy_delay_ms: default_courtesy_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Job execution settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobConfig {
    /// Distinct strings per API request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum concurrent batch requests
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Write the progress and result files every N completed batches
    #[serde(default = "default_checkpoint_every_batches")]
    pub checkpoint_every_batches: usize,

    /// Re-translate cells whose target locale is already filled
    #[serde(default)]
    pub force: bool,

    /// Run the pipeline against the offline backend, writing nothing
    #[serde(default)]
    pub dry_run: bool,

    /// Print the backlog summary and exit without translating
    #[serde(default)]
    pub plan_only: bool,

    /// Retry items one at a time after a batch-level failure
    #[serde(default = "default_true")]
    pub retry_individual_items: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            checkpoint_every_batches: default_checkpoint_every_batches(),
            force: false,
            dry_run: false,
            plan_only: false,
            retry_individual_items: default_true(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_locale_priority() -> Vec<String> {
    DEFAULT_LOCALE_PRIORITY.clone()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_retry_count() -> u32 {
    3 // 4 attempts total
}

fn default_retry_backoff_ms() -> u64 {
    250 // doubled on each retry
}

fn default_retry_backoff_ceiling_ms() -> u64 {
    30_000
}

fn default_courtesy_delay_ms() -> u64 {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_batch_size() -> usize {
    50
}

fn default_concurrency() -> usize {
    3 // observed safe range is 1-5
}

fn default_checkpoint_every_batches() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = FileManager::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;
        Ok(config)
    }

    /// Save the configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;
        std::fs::write(&path, content)
            .map_err(|e| anyhow!("Failed to write config file: {}", e))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.entity.trim().is_empty() {
            return Err(anyhow!("Entity name must not be empty"));
        }
        if self.fields.is_empty() {
            return Err(anyhow!("At least one localized-text field is required"));
        }
        if self.locale_priority.is_empty() {
            return Err(anyhow!("Locale priority must name at least one locale"));
        }

        // Every configured locale must carry a language the API understands
        language_utils::validate_locale(&self.target_locale)
            .map_err(|e| anyhow!("Invalid target locale: {}", e))?;
        for locale in &self.locale_priority {
            language_utils::validate_locale(locale)
                .map_err(|e| anyhow!("Invalid priority locale: {}", e))?;
        }

        if self.job.batch_size == 0 {
            return Err(anyhow!("batch_size must be at least 1"));
        }
        if self.job.concurrency == 0 || self.job.concurrency > 16 {
            return Err(anyhow!("concurrency must be between 1 and 16"));
        }
        if self.job.checkpoint_every_batches == 0 {
            return Err(anyhow!("checkpoint_every_batches must be at least 1"));
        }

        // Offline modes do not touch the API, everything else needs a key
        if !self.job.dry_run && !self.job.plan_only && self.translation.api_key.is_empty() {
            return Err(anyhow!(
                "Translation API key is required (config api_key or LOCFILL_API_KEY)"
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            entity: "district".to_string(),
            fields: vec!["name".to_string()],
            locale_priority: default_locale_priority(),
            target_locale: "en_US".to_string(),
            output_dir: default_output_dir(),
            translation: TranslationConfig::default(),
            job: JobConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
