use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use sweep_core::{EngineConfig, SweepError};
use sweep_engine::DeletionEngine;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MAX_DIRECTORY_PROMPTS: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "sweep")]
#[command(about = "Delete every file with a given extension from a directory", long_about = None)]
struct Args {
    /// Directory to sweep
    directory: PathBuf,

    /// File extension to delete (including the dot)
    #[arg(short, long)]
    extension: Option<String>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Retries per file after the first attempt
    #[arg(long)]
    max_retries: Option<u32>,

    /// Per-attempt timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Path to a YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        EngineConfig::from_file(config_path)
            .with_context(|| format!("loading {}", config_path.display()))?
    } else {
        EngineConfig::default()
    };

    // Override with CLI args
    if let Some(extension) = args.extension {
        config.extension = extension;
    }
    if let Some(workers) = args.workers {
        config.worker_count = workers;
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.attempt_timeout_ms = timeout_ms;
    }

    let directory = validate_directory(args.directory).await?;
    let engine = DeletionEngine::with_std_remover(config)?;

    let cancel = engine.cancellation_token();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Received shutdown signal");
        cancel.cancel();
    });

    match engine.run_directory(&directory).await {
        Ok(report) => {
            println!(
                "All files with the extension {} deleted successfully ({} files).",
                engine.config().extension,
                report.succeeded()
            );
            Ok(())
        }
        Err(SweepError::DeletionFailed(combined)) => {
            eprintln!("Error deleting files: {}", combined);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Ask for a new path until one exists, giving up after a few tries
async fn validate_directory(mut directory: PathBuf) -> anyhow::Result<PathBuf> {
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    for _ in 0..MAX_DIRECTORY_PROMPTS {
        if is_directory(&directory).await {
            return Ok(directory);
        }

        stdout
            .write_all(b"Invalid directory. Please enter a valid directory path:\n")
            .await?;
        stdout.flush().await?;

        match stdin.next_line().await? {
            Some(line) => directory = PathBuf::from(line.trim()),
            None => break,
        }
    }

    if is_directory(&directory).await {
        return Ok(directory);
    }
    Err(SweepError::DirectoryNotFound(directory))
        .context("maximum retries reached for directory validation")
}

async fn is_directory(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}
