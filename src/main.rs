mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use minirag_core::pipeline::CONFIG_FILE;
use minirag_core::RagConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "minirag")]
#[command(about = "Answer questions from your documents, or admit you can't", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Document to index, overriding the config
    #[arg(long, global = true)]
    docs: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the document once and answer questions interactively
    Chat,

    /// Answer a single question
    Ask {
        /// The question to answer
        question: String,

        /// Print the retrieved chunks and their scores
        #[arg(long)]
        sources: bool,
    },

    /// Show how the document is split into chunks
    Chunks {
        /// Maximum number of chunks to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the effective configuration
    Config,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Answers go to stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn find_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }

    let local = PathBuf::from(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|p| p.join("minirag").join("config.toml"))
        .filter(|p| p.is_file())
}

fn load_config(path: Option<&Path>, docs: Option<PathBuf>) -> anyhow::Result<RagConfig> {
    let mut config = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading config");
            RagConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => RagConfig::default(),
    };

    config.apply_env_overrides();
    if let Some(docs) = docs {
        config.documents.path = docs;
    }

    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = find_config_path(cli.config);
    let config = load_config(config_path.as_deref(), cli.docs)?;

    match cli.command {
        Commands::Chat => {
            commands::chat::run(config)?;
        }
        Commands::Ask { question, sources } => {
            commands::ask::run(&question, sources, config)?;
        }
        Commands::Chunks { limit } => {
            commands::chunks::run(limit, &config)?;
        }
        Commands::Config => {
            commands::config::run(config_path.as_deref(), &config)?;
        }
    }

    Ok(())
}
