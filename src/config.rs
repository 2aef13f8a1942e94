//! Configuration management for pmap-stats.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use pmap_stats::{AverageDivisor, OutputFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_OUTPUT_DIR: &str = "pmap-stats-out";
pub const DEFAULT_RUNS: usize = 1;
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HEADER_LINES: usize = 2;
pub const MAX_HEADER_LINES: usize = 16;

/// Effective configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Output
    #[serde(alias = "output-dir")]
    pub output_dir: Option<PathBuf>,
    #[serde(alias = "output-format")]
    pub output_format: Option<OutputFormat>,
    /// Write `<pid>.txt` with one row per mapping
    #[serde(alias = "write-mapping-rows")]
    pub write_mapping_rows: Option<bool>,
    /// Keep raw pmap output under `<run dir>/raw`
    #[serde(alias = "keep-raw-reports")]
    pub keep_raw_reports: Option<bool>,

    // Collection
    pub runs: Option<usize>,
    #[serde(alias = "command-timeout-secs")]
    pub command_timeout_secs: Option<u64>,
    #[serde(alias = "pmap-command")]
    pub pmap_command: Option<String>,
    #[serde(alias = "pidof-command")]
    pub pidof_command: Option<String>,

    // Parsing
    /// Lines skipped at the top of every report
    #[serde(alias = "header-lines")]
    pub header_lines: Option<usize>,
    /// "last-index" | "mapping-count"
    #[serde(alias = "average-divisor")]
    pub average_divisor: Option<AverageDivisor>,

    // Logging
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: Some(PathBuf::from(DEFAULT_OUTPUT_DIR)),
            output_format: Some(OutputFormat::Text),
            write_mapping_rows: Some(true),
            keep_raw_reports: Some(false),
            runs: Some(DEFAULT_RUNS),
            command_timeout_secs: Some(DEFAULT_COMMAND_TIMEOUT_SECS),
            pmap_command: Some("pmap".into()),
            pidof_command: Some("pidof".into()),
            header_lines: Some(DEFAULT_HEADER_LINES),
            average_divisor: Some(AverageDivisor::LastIndex),
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn runs(&self) -> usize {
        self.runs.unwrap_or(DEFAULT_RUNS)
    }

    pub fn command_timeout_secs(&self) -> u64 {
        self.command_timeout_secs
            .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS)
    }

    pub fn pmap_command(&self) -> &str {
        self.pmap_command.as_deref().unwrap_or("pmap")
    }

    pub fn pidof_command(&self) -> &str {
        self.pidof_command.as_deref().unwrap_or("pidof")
    }

    pub fn header_lines(&self) -> usize {
        self.header_lines.unwrap_or(DEFAULT_HEADER_LINES)
    }

    pub fn average_divisor(&self) -> AverageDivisor {
        self.average_divisor.unwrap_or_default()
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.unwrap_or_default()
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.runs == Some(0) {
        return Err("runs must be at least 1".into());
    }

    if cfg.command_timeout_secs == Some(0) {
        return Err("command_timeout_secs must be at least 1".into());
    }

    if let Some(n) = cfg.header_lines {
        if n > MAX_HEADER_LINES {
            return Err(format!(
                "header_lines is {}, expected at most {}",
                n, MAX_HEADER_LINES
            )
            .into());
        }
    }

    for (name, value) in [
        ("pmap_command", &cfg.pmap_command),
        ("pidof_command", &cfg.pidof_command),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(format!("{} must not be empty", name).into());
        }
    }

    if let Some(dir) = &cfg.output_dir {
        if dir.as_os_str().is_empty() {
            return Err("output_dir must not be empty".into());
        }
        if dir.is_file() {
            return Err(format!("output_dir is an existing file: {}", dir.display()).into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(dir) = &args.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if let Some(format) = args.output_format {
        config.output_format = Some(format);
    }
    if let Some(timeout) = args.timeout {
        config.command_timeout_secs = Some(timeout);
    }
    if args.average_over_count {
        config.average_divisor = Some(AverageDivisor::MappingCount);
    }
    if let Some(level) = &args.log_level {
        config.log_level = Some(format!("{:?}", level).to_lowercase());
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            // Try default locations
            let defaults = [
                "/etc/pmap-stats/config.yaml",
                "/etc/pmap-stats/config.yml",
                "./pmap-stats.yaml",
                "./pmap-stats.yml",
                "./pmap-stats.json",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)
        .map_err(|e| format!("cannot read config file {}: {}", path.display(), e))?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Serializes a configuration in the requested format
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
