#![forbid(unsafe_code)]

mod commands;
mod config;
mod constants;
mod fs_utils;
mod profiles;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level as TraceLevel;
use tracing_subscriber::FmtSubscriber;

use config::ConfigManager;
use profiles::ProfileManager;

#[derive(Parser)]
#[command(name = "uhd-helper", version, about = "Switch which UHD image profile is active")]
struct Cli {
    /// Override the config file location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List known profiles
    List,
    /// Show the active profile and resolved paths
    Status,
    /// Activate a profile by id
    Apply { id: String },
    /// Create a new profile from the official baseline
    Add { display_name: String },
    /// Delete a profile and its folder
    Delete { id: String },
    /// Re-activate the official profile
    Reset,
    /// Fold untracked profile folders on disk into the catalog
    Refresh,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "warn".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "info" => TraceLevel::INFO,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::default_config_path);

    let mut manager = ProfileManager::new(ConfigManager::new(config_path));
    if let Err(err) = manager.initialize() {
        eprintln!("Failed to initialize: {err:#}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Command::List => {
            commands::list(&manager);
            Ok(())
        }
        Command::Status => {
            commands::status(&manager);
            Ok(())
        }
        Command::Apply { id } => commands::apply(&mut manager, &id),
        Command::Add { display_name } => commands::add(&mut manager, &display_name),
        Command::Delete { id } => commands::delete(&mut manager, &id),
        Command::Reset => commands::reset(&mut manager),
        Command::Refresh => commands::refresh(&mut manager),
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}
