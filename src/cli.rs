//! CLI arguments and subcommands for pmap-stats.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use pmap_stats::OutputFormat;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "pmap-stats",
    about = "Memory map statistics for every process of a program",
    long_about = "Memory map statistics for every process of a program.\n\n\
                  Resolves the PIDs of a running program, captures `pmap -x` for each of \
                  them and reports per-mapping sizes, permission counts, per-process \
                  totals and averages, and totals across the whole program.",
    version = "0.1.0",
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (overrides config file)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Directory that receives one sub-directory per run
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Result file format (overrides config)
    #[arg(long, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Timeout in seconds for each external command (pidof, pmap)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Average per-mapping values over the true mapping count
    #[arg(long)]
    pub average_over_count: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture and analyze memory maps of every process of a running program
    Analyze {
        /// Program name as understood by pidof
        program: String,

        /// Number of repeated runs (overrides config)
        #[arg(short = 'n', long)]
        runs: Option<usize>,

        /// Keep the raw pmap output of each process
        #[arg(long)]
        keep_raw: bool,

        /// Do not print per-process summaries
        #[arg(short = 'q', long)]
        quiet: bool,
    },

    /// Analyze a saved `pmap -x` report ("-" reads stdin)
    Parse {
        /// Report file
        file: PathBuf,

        /// Process id to label the report with
        #[arg(long, default_value = "file")]
        pid: String,

        /// Print the full report as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Validate configuration and external tool availability
    Check,
}
