/*!
 * Common test utilities for the locfill test suite
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{Value, json};
use tempfile::TempDir;

use locfill::Config;
use locfill::file_utils::FileManager;

/// Initialize logging for tests; honors RUST_LOG, safe to call repeatedly
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Writes a JSON export file into the given directory
pub fn write_export(dir: &Path, filename: &str, value: &Value) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, serde_json::to_string_pretty(value)?)?;
    Ok(file_path)
}

/// A small district export with a duplicated source string
pub fn district_export() -> Value {
    json!([
        {"id": "1", "name": {"ko_KR": "강남구"}},
        {"id": "2", "name": {"ko_KR": "강남구"}},
        {"id": "3", "name": {"ko_KR": "서초구"}}
    ])
}

/// Pipeline configuration pointed at a test output directory.
///
/// Courtesy delay is zeroed so tests do not sleep between mock calls.
pub fn test_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.entity = "district".to_string();
    config.fields = vec!["name".to_string()];
    config.target_locale = "ru_RU".to_string();
    config.output_dir = output_dir.to_string_lossy().into_owned();
    config.translation.courtesy_delay_ms = 0;
    config
}

/// Reads the result file for an entity/locale pair as a JSON array
pub fn read_results(output_dir: &Path, entity: &str, locale: &str) -> Result<Vec<Value>> {
    let path = FileManager::result_file_path(output_dir, entity, locale);
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Path of the progress file for a locale
pub fn progress_path(output_dir: &Path, locale: &str) -> PathBuf {
    FileManager::progress_file_path(output_dir, locale)
}

/// Looks up one entry by id in a result array
pub fn entry_by_id<'a>(entries: &'a [Value], id: &str) -> &'a Value {
    entries
        .iter()
        .find(|e| e["id"] == id)
        .unwrap_or_else(|| panic!("no result entry with id {}", id))
}
