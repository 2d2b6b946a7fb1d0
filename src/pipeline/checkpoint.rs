/*!
 * Progress checkpointing.
 *
 * A small JSON file records how far a run has progressed so a killed job
 * resumes instead of re-paying for finished work. The file is written
 * atomically after every checkpointed batch; its presence means a resumable
 * job is in flight, its absence means the job never started or finished
 * cleanly. Individual translation failures are recorded here and do not
 * halt the run.
 */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::file_utils::FileManager;

/// A recorded per-item translation failure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    /// Locale the translation was for
    pub target_locale: String,
    /// SHA-256 of the source text, so the record stays small and log-safe
    pub text_sha256: String,
    /// Error message from the provider
    pub error: String,
}

/// The durable progress record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationProgress {
    /// Deduplicated strings processed so far, across resumed runs
    pub processed_count: usize,
    /// Backlog size recorded when the job first started
    pub total_count: usize,
    /// Id of the last entity touched by a processed batch
    pub last_processed_id: Option<String>,
    /// When the job first started
    pub start_time: DateTime<Utc>,
    /// When the checkpoint was last written
    pub last_update_time: DateTime<Utc>,
    /// Per-item failures recorded without halting the run
    #[serde(default)]
    pub failures: Vec<FailureRecord>,
}

impl TranslationProgress {
    fn new(total_count: usize) -> Self {
        let now = Utc::now();
        Self {
            processed_count: 0,
            total_count,
            last_processed_id: None,
            start_time: now,
            last_update_time: now,
            failures: Vec::new(),
        }
    }

    /// Completion as a percentage, for progress reporting
    pub fn percent_complete(&self) -> f64 {
        if self.total_count == 0 {
            return 100.0;
        }
        (self.processed_count as f64 / self.total_count as f64) * 100.0
    }

    /// Whether every backlog item has been processed
    pub fn is_complete(&self) -> bool {
        self.processed_count >= self.total_count
    }
}

/// Hex SHA-256 of a source text, used in failure records
pub fn text_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// File-backed checkpoint store.
///
/// All mutation goes through one store instance owned by the run's single
/// consumer loop, so no two workers ever write the file concurrently.
#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
    progress: TranslationProgress,
    resumed: bool,
}

impl ProgressStore {
    /// Load an existing checkpoint to resume from, or initialize a fresh one.
    ///
    /// `backlog_size` is only used when no checkpoint exists; a resumed run
    /// keeps the totals and start time of the original one.
    pub fn load_or_init<P: AsRef<Path>>(path: P, backlog_size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if FileManager::file_exists(&path) {
            let progress: TranslationProgress = FileManager::read_json(&path)
                .with_context(|| format!("Failed to load progress file: {:?}", path))?;
            return Ok(Self {
                path,
                progress,
                resumed: true,
            });
        }

        Ok(Self {
            path,
            progress: TranslationProgress::new(backlog_size),
            resumed: false,
        })
    }

    /// Whether this store picked up a checkpoint from a previous run
    pub fn resumed(&self) -> bool {
        self.resumed
    }

    /// Current progress snapshot
    pub fn progress(&self) -> &TranslationProgress {
        &self.progress
    }

    /// Account for a processed batch of `items` deduplicated strings
    pub fn record_batch(&mut self, items: usize, last_processed_id: Option<String>) {
        self.progress.processed_count += items;
        if last_processed_id.is_some() {
            self.progress.last_processed_id = last_processed_id;
        }
        self.progress.last_update_time = Utc::now();
    }

    /// Record a per-item failure without halting the run
    pub fn record_failure(&mut self, target_locale: &str, source_text: &str, error: &str) {
        self.progress.failures.push(FailureRecord {
            target_locale: target_locale.to_string(),
            text_sha256: text_hash(source_text),
            error: error.to_string(),
        });
    }

    /// Write the checkpoint atomically (write-temp-then-rename)
    pub fn save(&self) -> Result<()> {
        FileManager::write_json_atomic(&self.path, &self.progress)
    }

    /// Delete the checkpoint after a clean, complete run.
    ///
    /// Absence of the file is the signal that no resume is pending.
    pub fn finish(&self) -> Result<()> {
        FileManager::remove_if_exists(&self.path)
    }
}
