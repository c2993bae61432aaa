//! stylemerge CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stylemerge_core::BuildMode;

mod commands;
mod disk;
mod minify;

#[derive(Parser)]
#[command(name = "stylemerge")]
#[command(version)]
#[command(about = "Merge application stylesheets into one bundle", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform, merge and emit a bundle from stylesheet files
    Bundle {
        /// Stylesheets, in bundle order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Build mode
        #[arg(short, long, value_enum, default_value_t = Mode::Development)]
        mode: Mode,

        /// Directory searched for the plugin configuration
        #[arg(long, default_value = ".")]
        config_dir: PathBuf,

        /// Directory the bundle is written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Diagnostic output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Show the plugin configuration that a bundle would use
    Config {
        /// Directory searched for the plugin configuration
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Development,
    Production,
}

impl From<Mode> for BuildMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Development => BuildMode::Development,
            Mode::Production => BuildMode::Production,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stylemerge=info,stylemerge_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bundle {
            files,
            mode,
            config_dir,
            out_dir,
            format,
        } => commands::bundle::execute(commands::bundle::BundleArgs {
            files,
            mode: mode.into(),
            config_dir,
            out_dir,
            format,
        }),
        Commands::Config { dir } => commands::config::execute(&dir),
    }
}
