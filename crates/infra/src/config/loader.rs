//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required variable is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CAREBOOK_SLOT_GRANULARITY_MINUTES`: Step between slot starts (required)
//! - `CAREBOOK_BUFFER_POLICY`: `symmetric`, `before_only` or `after_only`
//! - `CAREBOOK_MAX_RECURRENCE_OCCURRENCES`: Cap for open-ended series
//! - `CAREBOOK_SEARCH_HORIZON_DAYS`: Days searched by `next_available`
//! - `CAREBOOK_LOG_LEVEL`: `EnvFilter` directive
//! - `CAREBOOK_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./carebook.json` or `./carebook.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use carebook_domain::constants::{
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_RECURRENCE_OCCURRENCES, DEFAULT_SEARCH_HORIZON_DAYS,
};
use carebook_domain::{
    BufferPolicy, CarebookError, Config, LoggingConfig, Result, SchedulingConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variable is missing or a value is invalid, falls back to a config file.
///
/// # Errors
/// Returns `CarebookError::Config` (or `InvalidGranularity`) if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A loaded value fails validation
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `CAREBOOK_SLOT_GRANULARITY_MINUTES` must be present; every other
/// variable falls back to its default.
///
/// # Errors
/// Returns `CarebookError::Config` if the required variable is missing or a
/// value cannot be parsed, and the validation error if the result is invalid.
pub fn load_from_env() -> Result<Config> {
    let slot_granularity_minutes = env_var("CAREBOOK_SLOT_GRANULARITY_MINUTES")
        .and_then(|s| parse_value(&s, "slot granularity"))?;
    let buffer_policy =
        env_parse("CAREBOOK_BUFFER_POLICY", BufferPolicy::default(), "buffer policy")?;
    let max_recurrence_occurrences = env_parse(
        "CAREBOOK_MAX_RECURRENCE_OCCURRENCES",
        DEFAULT_MAX_RECURRENCE_OCCURRENCES,
        "max recurrence occurrences",
    )?;
    let search_horizon_days =
        env_parse("CAREBOOK_SEARCH_HORIZON_DAYS", DEFAULT_SEARCH_HORIZON_DAYS, "search horizon")?;

    let config = Config {
        scheduling: SchedulingConfig {
            slot_granularity_minutes,
            buffer_policy,
            max_recurrence_occurrences,
            search_horizon_days,
        },
        logging: LoggingConfig {
            level: std::env::var("CAREBOOK_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
            json: env_bool("CAREBOOK_LOG_JSON", false),
        },
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Sections and fields missing from the file take their defaults.
///
/// # Errors
/// Returns `CarebookError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
///
/// and the validation error if a value is out of range.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CarebookError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CarebookError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CarebookError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CarebookError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CarebookError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CarebookError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent, and the executable's
/// directory for `config.{json,toml}` and `carebook.{json,toml}`.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
        candidates.extend([cwd.join("../config.json"), cwd.join("../config.toml")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> [PathBuf; 4] {
    [
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("carebook.json"),
        dir.join("carebook.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `CarebookError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        CarebookError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable, using `default` when unset
fn env_parse<T>(key: &str, default: T, label: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(&raw, label),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(raw: &str, label: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| CarebookError::Config(format!("Invalid {label}: {e}")))
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
