//! Moodscan CLI: sentiment analysis for typed text, files, and camera captures.
//!
//! Usage:
//!   moodscan text <TEXT>             Analyze text directly
//!   moodscan file <PATH>             Analyze a text or image file
//!   moodscan camera --source <IMG>   Capture a frame and analyze it
//!   moodscan history                 List saved analyses
//!   moodscan delete <ID>             Delete a saved analysis
//!   moodscan config                  Show or initialize the config file
//!   moodscan check                   Check OCR and camera availability

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use moodscan_common::config::{config_file_path, AppConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "moodscan",
    about = "Classify the emotional tone of text, documents, and photos",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze text directly
    Text {
        /// The text to analyze
        text: String,
    },

    /// Analyze a file (images go through OCR)
    File {
        /// Path to the file
        path: PathBuf,
    },

    /// Run a capture session and analyze the confirmed frame
    Camera {
        /// Image served by the still-image camera
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Number of times to retake before confirming
        #[arg(long, default_value = "0")]
        retake: u32,
    },

    /// List saved analyses, newest first
    History {
        /// Only show records whose text or summary contains this
        #[arg(short, long)]
        search: Option<String>,

        /// Maximum number of records to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Delete a saved analysis
    Delete {
        /// Record ID
        id: Uuid,
    },

    /// Show the active configuration
    Config {
        /// Write the active configuration to the config file
        #[arg(long)]
        init: bool,
    },

    /// Check OCR engine and camera availability
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config_file_path);
    let mut config = AppConfig::load_from(&config_path);
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    moodscan_common::logging::init_logging(&config.logging);

    let ctx = commands::Context {
        config,
        config_path,
        json: cli.json,
    };

    match cli.command {
        Commands::Text { text } => commands::text::run(&ctx, text).await,
        Commands::File { path } => commands::file::run(&ctx, path).await,
        Commands::Camera { source, retake } => commands::camera::run(&ctx, source, retake).await,
        Commands::History { search, limit } => commands::history::run(&ctx, search, limit).await,
        Commands::Delete { id } => commands::delete::run(&ctx, id).await,
        Commands::Config { init } => commands::config::run(&ctx, init),
        Commands::Check => commands::check::run(&ctx).await,
    }
}
