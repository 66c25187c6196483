//! Cadenza CLI - offline front end for the cadenza audio engine.

mod commands;

use anyhow::Context;
use cadenza_config::{ConfigError, EngineConfig, paths};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cadenza")]
#[command(author, version, about = "Cadenza audio engine CLI", long_about = None)]
struct Cli {
    /// Engine config file (defaults to the user config path)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through one effect or a chain
    Process(commands::process::ProcessArgs),

    /// Print level and spectral measurements of a WAV file
    Analyze(commands::analyze::AnalyzeArgs),

    /// List available effects and their parameters
    Effects(commands::effects::EffectsArgs),

    /// Manage the indexed file records
    Files(commands::files::FilesArgs),

    /// Show or create the engine config
    Config(commands::config::ConfigArgs),
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn require(loaded: Result<EngineConfig, ConfigError>, path: &Path) -> anyhow::Result<EngineConfig> {
    let config = loaded.with_context(|| format!("failed to load config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(paths::default_config_path);
    let loaded = EngineConfig::load_or_default(&config_path);

    let level = loaded
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_tracing(&level);

    match cli.command {
        Commands::Process(args) => commands::process::run(args, &require(loaded, &config_path)?),
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Effects(args) => commands::effects::run(args, &require(loaded, &config_path)?),
        Commands::Files(args) => commands::files::run(args, &require(loaded, &config_path)?),
        // works even when the file is broken
        Commands::Config(args) => commands::config::run(args, &config_path),
    }
}
