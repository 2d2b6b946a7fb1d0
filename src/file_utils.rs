use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

// @module: File and path utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read and deserialize a JSON file
    pub fn read_json<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T> {
        let content = Self::read_to_string(&path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON file: {:?}", path.as_ref()))
    }

    /// Serialize and write JSON atomically: write to a temp file in the
    /// same directory, then rename over the target.
    ///
    /// A crash mid-write leaves the previous valid version in place; a
    /// stray temp file never shadows the real one.
    pub fn write_json_atomic<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
        let path = path.as_ref();
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        Self::ensure_dir(parent)?;

        let content = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize JSON for: {:?}", path))?;

        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in: {:?}", parent))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temp file for: {:?}", path))?;
        temp.flush()?;
        temp.persist(path)
            .with_context(|| format!("Failed to move temp file into place: {:?}", path))?;

        Ok(())
    }

    /// Delete a file, tolerating it already being gone
    pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove file: {:?}", path))?;
        }
        Ok(())
    }

    /// Path of the progress checkpoint for a target locale
    pub fn progress_file_path<P: AsRef<Path>>(output_dir: P, target_locale: &str) -> PathBuf {
        output_dir
            .as_ref()
            .join(format!("translation-progress-{}.json", target_locale))
    }

    /// Path of the accumulated result file for an entity type and target locale
    pub fn result_file_path<P: AsRef<Path>>(
        output_dir: P,
        entity: &str,
        target_locale: &str,
    ) -> PathBuf {
        output_dir
            .as_ref()
            .join(format!("translated-{}-{}.json", entity, target_locale))
    }
}
