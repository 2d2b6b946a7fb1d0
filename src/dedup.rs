/*!
 * Text deduplication for translation tasks.
 *
 * The translation API is billed and throttled per request, so identical
 * source strings across many rows (common for template-like content) must
 * be translated once and fanned back out to every owner. Two texts that
 * differ only in surrounding whitespace or CRLF vs LF line endings are the
 * same key. Groups are additionally keyed by source language because a
 * batch request is (source, target) scoped and must never mix languages.
 */

use std::collections::HashMap;

/// One cell that needs translation: which entity, which field, and the
/// source text it will be translated from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTask {
    /// Id of the owning entity
    pub entity_id: String,
    /// Name of the localized-text field on that entity
    pub field: String,
    /// Source text as stored, before normalization
    pub source_text: String,
    /// API language code of the source text (e.g. `ko`)
    pub source_lang: String,
}

/// A cell waiting for a deduplicated translation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOwner {
    /// Id of the owning entity
    pub entity_id: String,
    /// Field to fan the translation out to
    pub field: String,
}

/// All tasks sharing one normalized source string
#[derive(Debug, Clone)]
pub struct TextGroup {
    /// Normalized source text sent to the API
    pub text: String,
    /// API language code shared by every task in the group
    pub source_lang: String,
    /// Every (entity, field) cell that receives the translation
    pub owners: Vec<TaskOwner>,
}

/// Normalize a source string for dedup keying: trim and fold CRLF to LF
pub fn normalize_text(text: &str) -> String {
    text.trim().replace("\r\n", "\n")
}

/// Group tasks by normalized text and source language.
///
/// Group order is deterministic: groups appear in the order their first
/// owner appeared in the input, so batch assembly (and therefore resume
/// offsets) is stable across runs over the same input.
pub fn group_tasks(tasks: Vec<TranslationTask>) -> Vec<TextGroup> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<TextGroup> = Vec::new();

    for task in tasks {
        let normalized = normalize_text(&task.source_text);
        if normalized.is_empty() {
            continue;
        }

        let key = (normalized.clone(), task.source_lang.clone());
        let owner = TaskOwner {
            entity_id: task.entity_id,
            field: task.field,
        };

        match index.get(&key) {
            Some(&pos) => groups[pos].owners.push(owner),
            None => {
                index.insert(key, groups.len());
                groups.push(TextGroup {
                    text: normalized,
                    source_lang: task.source_lang,
                    owners: vec![owner],
                });
            }
        }
    }

    groups
}

/// Split groups into batches of at most `batch_size` groups, never mixing
/// source languages within one batch
pub fn into_batches(groups: Vec<TextGroup>, batch_size: usize) -> Vec<Vec<TextGroup>> {
    let batch_size = batch_size.max(1);
    let mut by_lang: HashMap<String, Vec<TextGroup>> = HashMap::new();
    let mut lang_order: Vec<String> = Vec::new();

    for group in groups {
        if !by_lang.contains_key(&group.source_lang) {
            lang_order.push(group.source_lang.clone());
        }
        by_lang.entry(group.source_lang.clone()).or_default().push(group);
    }

    let mut batches = Vec::new();
    for lang in lang_order {
        let groups = by_lang.remove(&lang).unwrap_or_default();
        for chunk in groups.chunks(batch_size) {
            batches.push(chunk.to_vec());
        }
    }

    batches
}
