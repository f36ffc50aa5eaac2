use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use kartei_core::config::Config;
use kartei_engine::normalize;
use kartei_engine::progress::LogObserver;
use kartei_engine::BatchRunner;
use kartei_server::{AppState, ServerConfig};
use kartei_telemetry::{init_telemetry, MetricsRecorder, TelemetryConfig};

#[derive(Parser)]
#[command(name = "kartei", about = "German vocabulary flashcard generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process an input file into the text export, optionally packaging a deck
    Batch {
        /// One term per line
        #[arg(long, default_value = "input.txt")]
        input: PathBuf,
        /// Also build the .apkg deck package
        #[arg(long)]
        package: bool,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value_t = 8081)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry(&TelemetryConfig::default());

    let cli = Cli::parse();
    let config = Arc::new(Config::from_env()?);
    if !config.has_pronunciation_key() {
        tracing::warn!(
            "{} not set, recorded pronunciations will be skipped",
            kartei_core::config::PRONUNCIATION_KEY_VAR
        );
    }

    match cli.command {
        Command::Batch { input, package } => run_batch(config, &input, package).await,
        Command::Serve { port } => serve(config, port).await,
    }
}

async fn run_batch(config: Arc<Config>, input: &Path, package: bool) -> anyhow::Result<()> {
    let terms = normalize::read_input_file(input)?;
    if terms.is_empty() {
        tracing::warn!(path = %input.display(), "no terms found in input file");
        return Ok(());
    }

    tracing::info!(count = terms.len(), "terms to process");
    for (i, term) in terms.iter().enumerate() {
        tracing::info!("{:3}. {}", i + 1, term);
    }

    let metrics = Arc::new(MetricsRecorder::new());
    let runner =
        BatchRunner::from_config(Arc::clone(&config)).with_metrics(Arc::clone(&metrics));

    // Ctrl-C stops scheduling new terms; the in-flight one finishes.
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing current term then stopping");
            interrupt.cancel();
        }
    });

    let output = runner
        .run_to_outputs(&terms, &LogObserver, &cancel, package)
        .await?;

    tracing::info!(
        cards = output.cards.len(),
        dropped = metrics.get("terms_dropped"),
        export = %output.export_path.display(),
        "batch done"
    );
    if let Some(path) = output.package_path {
        tracing::info!(package = %path.display(), "deck package written");
    }
    Ok(())
}

async fn serve(config: Arc<Config>, port: u16) -> anyhow::Result<()> {
    let state = AppState::from_config(config);
    let handle = kartei_server::start(ServerConfig { port }, state).await?;
    tracing::info!(port = handle.port, "kartei server ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    Ok(())
}
