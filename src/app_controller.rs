use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::dedup::{self, TextGroup};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::localized_text::LocalizedText;
use crate::pipeline::{BacklogPlan, BatchRunner, EntityRecord, PlanStats, ProgressStore, ResultStore, plan_backlog};
use crate::providers::{GoogleTranslate, MockTranslator, TranslationBackend};

// @module: Application controller for the translation pipeline

/// Summary of one pipeline run, returned for reporting and tests
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Scan counters from the planning pass
    pub plan: PlanStats,
    /// Whether a previous checkpoint was picked up
    pub resumed: bool,
    /// Distinct source strings in this run's backlog
    pub distinct_strings: usize,
    /// Batches sent (or that would be sent, for plan-only)
    pub batches: usize,
    /// Cells that received a translation
    pub updated_cells: usize,
    /// Deduplicated strings translated successfully
    pub translated_groups: usize,
    /// Deduplicated strings that failed after batch and per-item retries
    pub failed_groups: usize,
    /// Entities now present in the result file
    pub completed_entities: usize,
    /// Whether the run stopped after planning
    pub plan_only: bool,
}

/// Main application controller for the backfill pipeline
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Run the pipeline over one input export file
    pub async fn run(&self, input_file: PathBuf) -> Result<RunReport> {
        let backend: Arc<dyn TranslationBackend> = if self.config.job.dry_run {
            Arc::new(MockTranslator::new())
        } else {
            Arc::new(GoogleTranslate::new_with_config(
                self.config.translation.api_key.clone(),
                self.config.translation.endpoint.clone(),
                self.config.translation.retry_count,
                self.config.translation.retry_backoff_ms,
                self.config.translation.retry_backoff_ceiling_ms,
                self.config.translation.timeout_secs,
            ))
        };
        self.run_with_backend(input_file, backend).await
    }

    /// Run the pipeline with an explicit backend (used by tests and dry runs)
    pub async fn run_with_backend(
        &self,
        input_file: PathBuf,
        backend: Arc<dyn TranslationBackend>,
    ) -> Result<RunReport> {
        let start_time = std::time::Instant::now();
        let target_locale = self.config.target_locale.clone();
        let target_lang = language_utils::api_language_code(&target_locale)?;
        let persist = !self.config.job.dry_run;

        // Local I/O failures here are fatal; the run never starts half-blind
        let entities = self.load_entities(&input_file)?;

        let output_dir = Path::new(&self.config.output_dir);
        if persist {
            FileManager::ensure_dir(output_dir)?;
        }

        let result_path = FileManager::result_file_path(output_dir, &self.config.entity, &target_locale);
        let progress_path = FileManager::progress_file_path(output_dir, &target_locale);

        let mut results = ResultStore::load(&result_path)?;

        // Plan: recomputed fresh every run, which is what makes reruns idempotent
        let plan = plan_backlog(
            &entities,
            &self.config.fields,
            &target_locale,
            &self.config.locale_priority,
            results.completed_ids(),
            self.config.job.force,
        );
        let groups = dedup::group_tasks(plan.tasks.clone());
        let batches = dedup::into_batches(groups.clone(), self.config.job.batch_size);

        self.log_plan(&plan, &groups, &batches);

        if self.config.job.plan_only {
            return Ok(RunReport {
                plan: plan.stats,
                resumed: false,
                distinct_strings: groups.len(),
                batches: batches.len(),
                updated_cells: 0,
                translated_groups: 0,
                failed_groups: 0,
                completed_entities: results.len(),
                plan_only: true,
            });
        }

        let mut progress = ProgressStore::load_or_init(&progress_path, groups.len())?;
        if progress.resumed() {
            info!(
                "Resuming: {}/{} strings already processed ({:.1}%)",
                progress.progress().processed_count,
                progress.progress().total_count,
                progress.progress().percent_complete()
            );
        }

        if groups.is_empty() {
            info!("Backlog is empty, nothing to translate");
            if persist {
                results.save()?;
                progress.finish()?;
            }
            return Ok(RunReport {
                plan: plan.stats,
                resumed: progress.resumed(),
                distinct_strings: 0,
                batches: 0,
                updated_cells: 0,
                translated_groups: 0,
                failed_groups: 0,
                completed_entities: results.len(),
                plan_only: false,
            });
        }

        // Working copies of the snapshots and how many cells each still owes
        let mut snapshots: HashMap<String, EntityRecord> =
            entities.into_iter().map(|e| (e.id.clone(), e)).collect();
        let mut pending_cells: HashMap<String, usize> = HashMap::new();
        for task in &plan.tasks {
            *pending_cells.entry(task.entity_id.clone()).or_insert(0) += 1;
        }

        let progress_bar = ProgressBar::new(batches.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style);
        progress_bar.set_message("Translating");

        let runner = BatchRunner::new(
            backend,
            self.config.job.concurrency,
            self.config.translation.courtesy_delay_ms,
            self.config.job.retry_individual_items,
        );

        let checkpoint_every = self.config.job.checkpoint_every_batches.max(1);
        let priority = self.config.locale_priority.clone();
        let mut updated_cells = 0usize;
        let mut translated_groups = 0usize;
        let mut failed_groups = 0usize;
        let mut completed_batches = 0usize;
        let mut newly_completed: HashSet<String> = HashSet::new();

        let pb = progress_bar.clone();
        runner
            .run(batches.clone(), &target_lang, |_batch_index, group_results| {
                let mut last_processed_id = None;
                let items = group_results.len();

                for result in group_results {
                    match result.translation {
                        Ok(translated) => {
                            translated_groups += 1;
                            for owner in &result.group.owners {
                                if let Some(entity) = snapshots.get_mut(&owner.entity_id) {
                                    let cell =
                                        LocalizedText::from_value(entity.data.get(&owner.field));
                                    let updated = cell.with_translation(
                                        &target_locale,
                                        &translated,
                                        &priority,
                                    );
                                    entity.data.insert(owner.field.clone(), updated.to_value());
                                    updated_cells += 1;
                                    last_processed_id = Some(owner.entity_id.clone());

                                    let remaining =
                                        pending_cells.entry(owner.entity_id.clone()).or_insert(1);
                                    *remaining = remaining.saturating_sub(1);
                                    if *remaining == 0 {
                                        newly_completed.insert(owner.entity_id.clone());
                                    }
                                }
                            }
                        }
                        Err(error) => {
                            failed_groups += 1;
                            progress.record_failure(&target_locale, &result.group.text, &error);
                        }
                    }
                }

                progress.record_batch(items, last_processed_id);
                completed_batches += 1;
                pb.inc(1);

                if persist && completed_batches % checkpoint_every == 0 {
                    for id in newly_completed.drain() {
                        if let Some(entity) = snapshots.get(&id) {
                            results.upsert(&id, entity.data.clone());
                        }
                    }
                    results.save()?;
                    progress.save()?;
                }

                Ok(())
            })
            .await?;

        progress_bar.finish_and_clear();

        // Final flush for entities completed since the last checkpoint
        for id in newly_completed.drain() {
            if let Some(entity) = snapshots.get(&id) {
                results.upsert(&id, entity.data.clone());
            }
        }
        if persist {
            results.save()?;

            // Failures carried over from an interrupted run were re-queued by
            // this plan, so only this run's outcome decides cleanliness
            if failed_groups == 0 && progress.progress().is_complete() {
                progress.finish()?;
            } else {
                progress.save()?;
            }
        }

        let report = RunReport {
            plan: plan.stats,
            resumed: progress.resumed(),
            distinct_strings: groups.len(),
            batches: batches.len(),
            updated_cells,
            translated_groups,
            failed_groups,
            completed_entities: results.len(),
            plan_only: false,
        };
        self.log_summary(&report, progress.progress().failures.as_slice(), start_time.elapsed());

        Ok(report)
    }

    /// Read and parse the input export; any failure here aborts the run
    fn load_entities(&self, input_file: &Path) -> Result<Vec<EntityRecord>> {
        if !input_file.exists() {
            return Err(anyhow::anyhow!(
                "Input file does not exist: {:?}",
                input_file
            ));
        }
        let content = FileManager::read_to_string(input_file)?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse input file: {:?}", input_file))?;
        Ok(EntityRecord::parse_all(value)?)
    }

    fn log_plan(&self, plan: &BacklogPlan, groups: &[TextGroup], batches: &[Vec<TextGroup>]) {
        let stats = &plan.stats;
        info!(
            "Backlog for {} -> {}: {} cells across {} entities ({} distinct strings, {} batches)",
            self.config.entity,
            self.config.target_locale,
            stats.queued_cells,
            stats.total_entities,
            groups.len(),
            batches.len()
        );
        info!(
            "Skipped: {} already translated, {} empty source, {} completed entities",
            stats.skipped_already_translated_cells,
            stats.skipped_empty_source_cells,
            stats.skipped_completed_entities
        );
        if stats.malformed_cells > 0 {
            warn!("{} cells were malformed and left untouched", stats.malformed_cells);
        }
        if stats.legacy_bare_cells > 0 {
            info!(
                "{} legacy bare-string cells will be upgraded to the structured form",
                stats.legacy_bare_cells
            );
        }
        let saved = stats.queued_cells.saturating_sub(groups.len());
        if saved > 0 {
            info!("Dedup saves {} API strings", saved);
        }
    }

    fn log_summary(
        &self,
        report: &RunReport,
        failures: &[crate::pipeline::FailureRecord],
        elapsed: std::time::Duration,
    ) {
        info!(
            "Run complete in {:.1}s: {} strings translated, {} failed, {} cells updated, {} entities in result file",
            elapsed.as_secs_f64(),
            report.translated_groups,
            report.failed_groups,
            report.updated_cells,
            report.completed_entities
        );
        if !failures.is_empty() {
            warn!("{} recorded failures, first {}:", failures.len(), failures.len().min(5));
            for failure in failures.iter().take(5) {
                warn!(
                    "  [{}] {}: {}",
                    failure.target_locale,
                    &failure.text_sha256[..12.min(failure.text_sha256.len())],
                    failure.error
                );
            }
        }
    }
}
