// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod dedup;
mod errors;
mod file_utils;
mod language_utils;
mod localized_text;
mod pipeline;
mod providers;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// locfill - localized-text translation backfill
///
/// Scans entity exports for localized-text cells missing a target locale,
/// translates the missing strings in batches and writes fully-translated
/// snapshots to a result file. Progress is checkpointed after every batch,
/// so a killed run resumes where it left off.
#[derive(Parser, Debug)]
#[command(name = "locfill")]
#[command(version = "0.1.0")]
#[command(about = "Batch translation backfill for localized-text fields")]
#[command(long_about = "locfill scans a JSON export of entities for localized-text fields
missing a target locale, translates the missing strings in deduplicated
batches and accumulates fully-translated snapshots in a result file.

EXAMPLES:
    locfill districts.json -t ru_RU                  # Backfill Russian
    locfill districts.json -t ru_RU --plan-only      # Show the backlog and exit
    locfill districts.json -t ru_RU --dry-run        # Offline rehearsal, writes nothing
    locfill districts.json -t ru_RU --force          # Re-translate filled cells too
    locfill --log-level debug districts.json -t ru_RU

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically. The API key can be
    given in the config file, with --api-key, or via LOCFILL_API_KEY.

RESUMING:
    Progress lives in <output-dir>/translation-progress-<locale>.json and is
    deleted on clean completion. Re-running the same command resumes; cells
    already translated are never paid for twice.")]
struct CommandLineOptions {
    /// Input JSON export (an array of entity snapshots)
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Entity type name, used in the result file name
    #[arg(short, long)]
    entity: Option<String>,

    /// Localized-text field names to backfill (comma separated)
    #[arg(long, value_delimiter = ',')]
    fields: Option<Vec<String>>,

    /// Target locale to fill in (e.g. 'ru_RU')
    #[arg(short, long)]
    target_locale: Option<String>,

    /// Directory for the progress and result files
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Translation API key
    #[arg(long, env = "LOCFILL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Distinct strings per API request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Maximum concurrent batch requests
    #[arg(long)]
    concurrency: Option<usize>,

    /// Re-translate cells whose target locale is already filled
    #[arg(short, long)]
    force: bool,

    /// Run against an offline backend and write nothing
    #[arg(long)]
    dry_run: bool,

    /// Print the backlog summary and exit without translating
    #[arg(long)]
    plan_only: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    // Load or create configuration
    let config_path = &cli.config_path;
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config file: {}", config_path))?
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );
        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config: {}", config_path))?;
        info!("Default config written to '{}'", config_path);
        config
    };

    // Override config with CLI options if provided
    if let Some(entity) = &cli.entity {
        config.entity = entity.clone();
    }
    if let Some(fields) = &cli.fields {
        config.fields = fields.clone();
    }
    if let Some(target_locale) = &cli.target_locale {
        config.target_locale = target_locale.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(api_key) = &cli.api_key {
        config.translation.api_key = api_key.clone();
    }
    if let Some(batch_size) = cli.batch_size {
        config.job.batch_size = batch_size;
    }
    if let Some(concurrency) = cli.concurrency {
        config.job.concurrency = concurrency;
    }
    if cli.force {
        config.job.force = true;
    }
    if cli.dry_run {
        config.job.dry_run = true;
    }
    if cli.plan_only {
        config.job.plan_only = true;
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    log::set_max_level(level_filter(&config.log_level));

    config.validate()?;

    let controller = Controller::with_config(config)?;
    controller.run(cli.input_file).await?;

    Ok(())
}
