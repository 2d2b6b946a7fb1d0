/*!
 * # locfill - Localized-Text Translation Backfill
 *
 * A Rust library for backfilling missing locales in JSON exports of
 * entities with localized-text fields.
 *
 * ## Features
 *
 * - Scan entity snapshots for localized-text cells missing a target locale
 * - Tolerate the legacy bare-string form and migrate it on write
 * - Deduplicate identical source strings before calling the API
 * - Batch translation with retry, backoff and per-item fallback
 * - Checkpoint progress after every batch for kill-and-resume
 * - Accumulate fully-translated snapshots in an always-valid JSON array
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `localized_text`: The localized-text cell format and its edge cases
 * - `dedup`: Task grouping and batch construction
 * - `pipeline`: Planning, batch execution, checkpointing and results:
 *   - `pipeline::plan`: Backlog scanning
 *   - `pipeline::batch`: Bounded-concurrency batch execution
 *   - `pipeline::checkpoint`: Durable progress records
 *   - `pipeline::results`: Result file accumulation
 * - `providers`: Translation backends:
 *   - `providers::google`: Google Translate v2 client
 *   - `providers::mock`: Scriptable offline backend
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Locale and ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod dedup;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod localized_text;
pub mod pipeline;
pub mod providers;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunReport};
pub use errors::{AppError, PipelineError, ProviderError};
pub use localized_text::LocalizedText;
pub use providers::{GoogleTranslate, MockTranslator, TranslationBackend};
