/*!
 * Result accumulation.
 *
 * The result file is a single JSON array of fully-translated entity
 * snapshots, one object per entity. It is rewritten whole, atomically,
 * after every checkpoint rather than appended to, because consumers expect
 * a valid JSON array at all times, including after an unclean shutdown.
 * Ids already present are the skip set for the next run.
 */

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::errors::PipelineError;
use crate::file_utils::FileManager;

/// File-backed, id-deduplicated accumulator of translated entity snapshots
#[derive(Debug)]
pub struct ResultStore {
    path: PathBuf,
    entries: Vec<Value>,
    ids: HashSet<String>,
}

impl ResultStore {
    /// Load existing results, or start empty when the file does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries: Vec<Value> = if FileManager::file_exists(&path) {
            FileManager::read_json(&path)
                .with_context(|| format!("Failed to load result file: {:?}", path))?
        } else {
            Vec::new()
        };

        let mut ids = HashSet::new();
        for entry in &entries {
            let id = entry_id(entry).ok_or_else(|| {
                PipelineError::MalformedInput(format!(
                    "result file {:?} contains an entry without an id",
                    path
                ))
            })?;
            ids.insert(id);
        }

        Ok(Self { path, entries, ids })
    }

    /// Ids of entities already fully translated in a previous run
    pub fn completed_ids(&self) -> &HashSet<String> {
        &self.ids
    }

    /// Number of accumulated snapshots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been accumulated yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace the snapshot for one entity.
    ///
    /// Replacement keeps the original position so the file order stays
    /// append-only stable across resumed runs.
    pub fn upsert(&mut self, id: &str, snapshot: Map<String, Value>) {
        let value = Value::Object(snapshot);
        if self.ids.contains(id) {
            if let Some(existing) = self
                .entries
                .iter_mut()
                .find(|e| entry_id(e).as_deref() == Some(id))
            {
                *existing = value;
            }
        } else {
            self.ids.insert(id.to_string());
            self.entries.push(value);
        }
    }

    /// Rewrite the whole file atomically
    pub fn save(&self) -> Result<()> {
        FileManager::write_json_atomic(&self.path, &self.entries)
    }

    /// The accumulated snapshots, in insertion order
    pub fn entries(&self) -> &[Value] {
        &self.entries
    }
}

/// Stringified id of a snapshot, matching the planner's id handling
fn entry_id(entry: &Value) -> Option<String> {
    match entry.get("id") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
