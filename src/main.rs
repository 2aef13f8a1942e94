//! pmap-stats - version 0.1.0
//!
//! Memory map statistics collector with tracing logging.
//! This is the main entry point that resolves configuration and dispatches subcommands.

mod cli;
mod commands;
mod config;
mod process;

use clap::Parser;
use tracing::{debug, Level};

use cli::{Args, Commands};
use commands::{
    analyze::AnalyzeOptions, command_analyze, command_check, command_config, command_parse,
};
use config::{resolve_config, show_config, validate_effective_config, Config};

/// Maps the configured level name to a tracing level; `None` disables logging.
fn parse_log_level(name: &str) -> Option<Level> {
    match name.to_ascii_lowercase().as_str() {
        "off" => None,
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => Some(Level::INFO),
    }
}

/// Initializes tracing logging subsystem with configured log level.
/// `resolve_config` has already folded `--log-level` into the config.
fn setup_logging(config: &Config) {
    let name = config.log_level.as_deref().unwrap_or("info");
    let Some(log_level) = parse_log_level(name) else {
        return;
    };

    // Logs go to stderr so summaries on stdout stay clean
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    debug!("Logging initialized with level: {}", log_level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    let Some(command) = &args.command else {
        eprintln!("No command given, see --help");
        std::process::exit(2);
    };

    // Config generation works without a valid config
    if let Commands::Config {
        output,
        format,
        commented,
    } = command
    {
        return command_config(output.clone(), format.clone(), *commented);
    }

    let config = load_validated_config(&args)?;
    setup_logging(&config);

    match command {
        Commands::Analyze {
            program,
            runs,
            keep_raw,
            quiet,
        } => {
            let opts = AnalyzeOptions {
                program,
                runs: runs.unwrap_or_else(|| config.runs()),
                keep_raw: *keep_raw,
                quiet: *quiet,
            };
            if opts.runs == 0 {
                eprintln!("❌ --runs must be at least 1");
                std::process::exit(1);
            }
            command_analyze(opts, &config).await
        }

        Commands::Parse { file, pid, json } => command_parse(file, pid, *json, &config),

        Commands::Check => command_check(&config).await,

        Commands::Config { .. } => unreachable!("Config handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("off"), None);
        assert_eq!(parse_log_level("Warn"), Some(Level::WARN));
        assert_eq!(parse_log_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_log_level("bogus"), Some(Level::INFO));
    }

    #[test]
    fn test_cli_parses_analyze() {
        let args = Args::try_parse_from(["pmap-stats", "analyze", "nginx", "-n", "3"]).unwrap();
        match args.command {
            Some(Commands::Analyze { program, runs, .. }) => {
                assert_eq!(program, "nginx");
                assert_eq!(runs, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
