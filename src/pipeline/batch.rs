/*!
 * Batch execution over the translation backend.
 *
 * Batches are pulled by a fixed number of concurrent workers, bounding
 * in-flight API requests. Completion order across workers is not
 * guaranteed; every completed batch is handed to a single consumer
 * callback, so checkpoint and result mutation never happen concurrently.
 * A batch whose API call exhausts its retries is downgraded to per-item
 * calls so one bad string does not sacrifice the whole batch.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use log::warn;
use tokio::sync::Semaphore;

use crate::dedup::TextGroup;
use crate::providers::TranslationBackend;

/// Outcome for one deduplicated source string
#[derive(Debug, Clone)]
pub struct GroupResult {
    /// The group the outcome belongs to, with its fan-out owners
    pub group: TextGroup,
    /// The translation, or the provider error message
    pub translation: Result<String, String>,
}

/// Bounded-concurrency runner over prepared batches
pub struct BatchRunner {
    /// The translation backend to call
    backend: Arc<dyn TranslationBackend>,
    /// Maximum number of concurrent batch requests
    concurrency: usize,
    /// Fixed delay inserted after every API call, success or failure
    courtesy_delay: Duration,
    /// Whether to retry items one at a time after a batch-level failure
    retry_individual_items: bool,
}

impl BatchRunner {
    /// Create a new runner
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        concurrency: usize,
        courtesy_delay_ms: u64,
        retry_individual_items: bool,
    ) -> Self {
        Self {
            backend,
            concurrency: concurrency.max(1),
            courtesy_delay: Duration::from_millis(courtesy_delay_ms),
            retry_individual_items,
        }
    }

    /// Run all batches and feed each completed batch to `on_batch`.
    ///
    /// `on_batch` receives the batch index and per-group outcomes; it runs
    /// on the consumer side of the stream, one batch at a time. An error
    /// from it (checkpoint write failure, for example) aborts the run.
    pub async fn run<F>(
        &self,
        batches: Vec<Vec<TextGroup>>,
        target_lang: &str,
        mut on_batch: F,
    ) -> Result<()>
    where
        F: FnMut(usize, Vec<GroupResult>) -> Result<()>,
    {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let mut completed = stream::iter(batches.into_iter().enumerate())
            .map(|(batch_index, batch)| {
                let backend = Arc::clone(&self.backend);
                let semaphore = Arc::clone(&semaphore);
                let target_lang = target_lang.to_string();
                let courtesy_delay = self.courtesy_delay;
                let retry_individual_items = self.retry_individual_items;

                async move {
                    let results = match semaphore.acquire().await {
                        Ok(_permit) => {
                            translate_batch_with_recovery(
                                backend.as_ref(),
                                batch,
                                &target_lang,
                                courtesy_delay,
                                retry_individual_items,
                            )
                            .await
                        }
                        // Unreachable while the runner owns the semaphore,
                        // but a closed pool reads as failed groups, not a panic
                        Err(closed) => batch
                            .into_iter()
                            .map(|group| GroupResult {
                                group,
                                translation: Err(closed.to_string()),
                            })
                            .collect(),
                    };
                    (batch_index, results)
                }
            })
            .buffer_unordered(self.concurrency);

        while let Some((batch_index, results)) = completed.next().await {
            on_batch(batch_index, results)?;
        }

        Ok(())
    }
}

/// Translate one batch, falling back to per-item calls on batch failure
async fn translate_batch_with_recovery(
    backend: &dyn TranslationBackend,
    batch: Vec<TextGroup>,
    target_lang: &str,
    courtesy_delay: Duration,
    retry_individual_items: bool,
) -> Vec<GroupResult> {
    if batch.is_empty() {
        return Vec::new();
    }

    // Grouping discipline: a batch never mixes source languages
    let source_lang = batch[0].source_lang.clone();
    debug_assert!(batch.iter().all(|g| g.source_lang == source_lang));

    let texts: Vec<String> = batch.iter().map(|g| g.text.clone()).collect();
    let batch_result = backend.translate_batch(&texts, &source_lang, target_lang).await;
    tokio::time::sleep(courtesy_delay).await;

    match batch_result {
        Ok(translations) => batch
            .into_iter()
            .zip(translations)
            .map(|(group, translation)| GroupResult {
                group,
                translation: Ok(translation),
            })
            .collect(),
        Err(batch_error) if retry_individual_items && batch.len() > 1 => {
            warn!(
                "Batch of {} failed ({}), retrying items individually",
                batch.len(),
                batch_error
            );

            let mut results = Vec::with_capacity(batch.len());
            for group in batch {
                let single = [group.text.clone()];
                let outcome = backend
                    .translate_batch(&single, &source_lang, target_lang)
                    .await;
                tokio::time::sleep(courtesy_delay).await;

                results.push(GroupResult {
                    translation: match outcome {
                        Ok(mut translations) if !translations.is_empty() => {
                            Ok(translations.remove(0))
                        }
                        Ok(_) => Err("empty translation returned".to_string()),
                        Err(e) => Err(e.to_string()),
                    },
                    group,
                });
            }
            results
        }
        Err(batch_error) => {
            let message = batch_error.to_string();
            batch
                .into_iter()
                .map(|group| GroupResult {
                    group,
                    translation: Err(message.clone()),
                })
                .collect()
        }
    }
}
