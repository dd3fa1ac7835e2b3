use anagram_api::config::{AnagramConfig, ConfigSource};
use anagram_api::tracing_setup::init_tracing;
use anagram_api::{AppState, build_dictionary, build_storage, create_app};
use anagram_core::seed;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "anagram")]
#[command(about = "Anagram dictionary web service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve {
        /// Configuration file
        #[arg(short, long, env = "ANAGRAM_CONFIG_PATH")]
        config: Option<PathBuf>,
    },

    /// Bulk load a newline-delimited word list, replacing the buckets it touches
    Seed {
        /// Word list file
        #[arg(short, long)]
        word_list: PathBuf,

        /// Configuration file
        #[arg(short, long, env = "ANAGRAM_CONFIG_PATH")]
        config: Option<PathBuf>,
    },

    /// Describe the service
    Explain,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve { config: None }) {
        Command::Serve { config } => serve(config.as_deref()).await,
        Command::Seed { word_list, config } => seed_command(&word_list, config.as_deref()).await,
        Command::Explain => {
            explain_command();
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AnagramConfig> {
    let config = AnagramConfig::load(path)?.apply_env_overrides()?;
    config.validate()?;
    init_tracing(&config.logging)?;

    match &config.source {
        ConfigSource::File(path) => info!(path = %path.display(), "Loaded configuration"),
        ConfigSource::Defaults => warn!("No configuration file found, using built-in defaults"),
    }
    Ok(config)
}

async fn serve(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    info!(version = env!("CARGO_PKG_VERSION"), backend = ?config.storage.backend, "Starting anagram service");

    let storage = build_storage(&config.storage).await?;
    let dictionary = build_dictionary(&config, &storage);

    if let Some(path) = &config.dictionary.word_list_path {
        if let Some(report) = seed::seed_if_empty(&dictionary, path)
            .await
            .with_context(|| format!("Failed to seed dictionary from {}", path.display()))?
        {
            info!(keys = report.keys, words = report.words, "Dictionary seeded");
        }
    }

    let addr = config.server.bind_address()?;
    let app = create_app(AppState::new(dictionary), config.server.request_timeout());
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%addr, "Web server started successfully");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    storage.close().await;
    info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn seed_command(word_list: &Path, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let storage = build_storage(&config.storage).await?;
    let dictionary = build_dictionary(&config, &storage);

    let report = seed::seed_from_file(&dictionary, word_list)
        .await
        .with_context(|| format!("Failed to seed dictionary from {}", word_list.display()))?;

    storage.close().await;

    println!(
        "Loaded {} words under {} keys in {} batches",
        report.words, report.keys, report.batches
    );
    Ok(())
}

fn explain_command() {
    println!("Anagram dictionary service");
    println!("Words are grouped under a canonical key made of their sorted letters,");
    println!("so every anagram lookup is a single key fetch.");
    println!("\nEndpoints:");
    println!("  GET  /api/v1/similar?word=<word>   other dictionary words with the same letters");
    println!("  POST /api/v1/add-word              add {{\"word\": \"<word>\"}} to the dictionary");
    println!("  GET  /api/v1/stats[?from=&to=]     request count and average lookup time");
    println!("  GET  /health                       liveness and storage status");
}
