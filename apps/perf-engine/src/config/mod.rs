//! Configuration module for the performance engine.
//!
//! Provides YAML configuration loading, validation, and environment
//! variable interpolation for the data, range, window, sampling, parallel,
//! report and logging settings.
//!
//! # Usage
//!
//! ```rust,ignore
//! use perf_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("perf.yaml"))?;
//!
//! println!("close prices: {}", config.data.close_csv);
//! ```

mod data;
mod observability;
mod parallel;
mod report;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use data::{DataConfig, RangeConfig, RollingConfig, SamplingConfig};
pub use observability::{LogFormat, LoggingConfig, ObservabilityConfig};
pub use parallel::ParallelConfig;
pub use report::{ReportConfig, ReportFormat};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Close-price input and cleaning.
    #[serde(default)]
    pub data: DataConfig,
    /// Date range for `stats` and `resolve`.
    #[serde(default)]
    pub range: RangeConfig,
    /// Trailing lookbacks (rows) for window evaluation.
    #[serde(default = "default_lookbacks")]
    pub lookbacks: Vec<usize>,
    /// Moving-window statistics.
    #[serde(default)]
    pub rolling: RollingConfig,
    /// Train / validation / test split and random sample slices.
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Parallel window evaluation.
    #[serde(default)]
    pub parallel: ParallelConfig,
    /// Report output.
    #[serde(default)]
    pub report: ReportConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            range: RangeConfig::default(),
            lookbacks: default_lookbacks(),
            rolling: RollingConfig::default(),
            sampling: SamplingConfig::default(),
            parallel: ParallelConfig::default(),
            report: ReportConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn default_lookbacks() -> Vec<usize> {
    vec![15, 30, 60, 120, 240]
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is a constant pattern
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    config
        .range
        .query()
        .map_err(|e| ConfigError::ValidationError(format!("range: {e}")))?;

    if config.lookbacks.is_empty() {
        return Err(ConfigError::ValidationError(
            "lookbacks must not be empty".to_string(),
        ));
    }
    if let Some(n) = config.lookbacks.iter().find(|n| **n < 2) {
        return Err(ConfigError::ValidationError(format!(
            "lookbacks must all be >= 2, found {n}"
        )));
    }

    if config.rolling.window < 2 {
        return Err(ConfigError::ValidationError(
            "rolling.window must be >= 2".to_string(),
        ));
    }

    let sampling = &config.sampling;
    // fractions only; the row count is known once the range is resolved
    crate::windows::split_fractions(0, sampling.train, sampling.validation, sampling.test)
        .map_err(|e| ConfigError::ValidationError(format!("sampling: {e}")))?;
    if sampling.samples == 0 {
        return Err(ConfigError::ValidationError(
            "sampling.samples must be positive".to_string(),
        ));
    }
    if sampling.lookback < 2 || sampling.eval < 2 {
        return Err(ConfigError::ValidationError(
            "sampling.lookback and sampling.eval must be >= 2".to_string(),
        ));
    }

    if config.report.top_n == 0 {
        return Err(ConfigError::ValidationError(
            "report.top_n must be positive".to_string(),
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    let level = config.observability.logging.level.to_ascii_lowercase();
    if !valid_levels.contains(&level.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.level must be one of: {valid_levels:?}"
        )));
    }

    Ok(())
}
