use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use voicescreen::config::AnalysisConfig;
use voicescreen::pipeline::VoiceAnalyzer;
use voicescreen::server::{serve, AppState};

/// Voice-perturbation screening service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the screening model artifact (JSON)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Analyze a single audio file and print the report as JSON, instead
    /// of serving HTTP
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(short, long, default_value = "0.0.0.0:8000")]
    bind: String,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if args.model.is_some() {
        config.model_path = args.model.clone();
    }

    let analyzer = VoiceAnalyzer::from_config(config).context("Failed to initialize analyzer")?;
    if !analyzer.model_loaded() {
        info!("Running in simulation mode (no model artifact)");
    }

    if let Some(input) = &args.input {
        let bytes = std::fs::read(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let report = analyzer.analyze(&bytes)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let addr: SocketAddr = args
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", args.bind))?;
    let state = AppState {
        analyzer: Arc::new(analyzer),
    };
    serve(state, addr).await
}
