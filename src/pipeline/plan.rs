/*!
 * Backlog planning.
 *
 * A plan is a fresh scan of the input snapshots: for every entity and every
 * configured field, decide whether the target locale is missing and, if so,
 * emit a translation task. Nothing is persisted; the plan is recomputed on
 * every run, which is what makes re-running idempotent. Skipped cells are
 * counted rather than dropped silently.
 */

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::dedup::TranslationTask;
use crate::errors::PipelineError;
use crate::language_utils;
use crate::localized_text::LocalizedText;

/// One entity snapshot from the input export
#[derive(Debug, Clone)]
pub struct EntityRecord {
    /// Entity id, stringified
    pub id: String,
    /// All fields of the snapshot, localized or not
    pub data: Map<String, Value>,
}

impl EntityRecord {
    /// Parse a record from one element of the input array.
    ///
    /// The `id` field may be a string or a number; anything else is a
    /// malformed input, which is fatal for the whole run.
    pub fn from_value(value: Value) -> Result<Self, PipelineError> {
        let Value::Object(data) = value else {
            return Err(PipelineError::MalformedInput(
                "entity snapshot is not an object".to_string(),
            ));
        };

        let id = match data.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(PipelineError::MalformedInput(
                    "entity snapshot has no usable id".to_string(),
                ));
            }
        };

        Ok(Self { id, data })
    }

    /// Parse the whole input document, which must be a JSON array
    pub fn parse_all(value: Value) -> Result<Vec<Self>, PipelineError> {
        let Value::Array(items) = value else {
            return Err(PipelineError::MalformedInput(
                "input document is not a JSON array".to_string(),
            ));
        };

        items.into_iter().map(Self::from_value).collect()
    }
}

/// Counters describing what the planner saw and why cells were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanStats {
    /// Entities scanned
    pub total_entities: usize,
    /// Entities skipped because they are already in the result file
    pub skipped_completed_entities: usize,
    /// Cells queued for translation
    pub queued_cells: usize,
    /// Cells whose target locale was already filled
    pub skipped_already_translated_cells: usize,
    /// Cells with no usable source text
    pub skipped_empty_source_cells: usize,
    /// Cells that were present but unparseable
    pub malformed_cells: usize,
    /// Queued cells that were legacy bare strings (migration + backfill)
    pub legacy_bare_cells: usize,
}

/// Result of a backlog scan
#[derive(Debug, Clone)]
pub struct BacklogPlan {
    /// One task per cell missing the target locale
    pub tasks: Vec<TranslationTask>,
    /// Scan counters
    pub stats: PlanStats,
}

/// Scan entities for cells that need translating into `target_locale`.
///
/// `completed_ids` are entities already present in the result accumulator;
/// they are skipped wholesale. `force` re-queues cells whose target locale
/// is already filled (and ignores `completed_ids`), re-translating
/// everything that has a source text.
pub fn plan_backlog(
    entities: &[EntityRecord],
    fields: &[String],
    target_locale: &str,
    priority: &[String],
    completed_ids: &HashSet<String>,
    force: bool,
) -> BacklogPlan {
    let mut tasks = Vec::new();
    let mut stats = PlanStats {
        total_entities: entities.len(),
        ..PlanStats::default()
    };

    for entity in entities {
        if !force && completed_ids.contains(&entity.id) {
            stats.skipped_completed_entities += 1;
            continue;
        }

        for field in fields {
            let cell = LocalizedText::from_value(entity.data.get(field));

            if cell.is_malformed() {
                stats.malformed_cells += 1;
                continue;
            }
            if matches!(cell, LocalizedText::Missing) {
                continue;
            }

            let source = cell.source_text(priority);
            if source.trim().is_empty() {
                stats.skipped_empty_source_cells += 1;
                continue;
            }

            let needed = cell.needs_translation(target_locale, priority);
            if !needed && !force {
                stats.skipped_already_translated_cells += 1;
                continue;
            }

            let Some(source_locale) = cell.source_locale(priority) else {
                stats.skipped_empty_source_cells += 1;
                continue;
            };
            let Ok(source_lang) = language_utils::api_language_code(source_locale) else {
                stats.malformed_cells += 1;
                continue;
            };

            if cell.is_bare() {
                stats.legacy_bare_cells += 1;
            }
            stats.queued_cells += 1;
            tasks.push(TranslationTask {
                entity_id: entity.id.clone(),
                field: field.clone(),
                source_text: source.to_string(),
                source_lang,
            });
        }
    }

    BacklogPlan { tasks, stats }
}
