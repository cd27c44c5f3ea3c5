use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use regwatch::config::{AppConfig, InferenceConfig};
use regwatch::inference::{CannedBackend, HostedBackend, InferenceBackend, ModelHandle};
use regwatch::server::{self, AppState};
use regwatch::{Classifier, Fetcher, Pipeline, Summarizer};

#[derive(Parser, Debug)]
#[command(name = "regwatch", about = "Telecom regulatory news watch service")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the HTTP listen port
    #[arg(long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = AppConfig::load(args.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    info!("Configuration loaded: {} feeds watched", config.feeds.len());

    let backend = build_backend(&config.inference)?;
    let models = Arc::new(ModelHandle::load(backend).await);

    let fetcher = Fetcher::new(config.fetch.clone());
    let classifier = Classifier::new(models.clone());
    let summarizer = Summarizer::new(models.clone());
    let pipeline = Arc::new(
        Pipeline::new(fetcher, classifier, summarizer)
            .with_inference_concurrency(config.inference.concurrency)
            .with_max_summary_length(config.inference.max_summary_length),
    );

    // PORT from the environment wins over both the flag and the file.
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .or(args.port)
        .unwrap_or(config.server.port);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, port)
        .parse()
        .context("Invalid listen address")?;

    let state = Arc::new(AppState {
        pipeline,
        feeds: config.feeds.clone(),
        models,
    });

    server::serve(addr, state).await?;
    Ok(())
}

fn build_backend(config: &InferenceConfig) -> anyhow::Result<Arc<dyn InferenceBackend>> {
    match config.backend.as_str() {
        "hosted" => {
            let mut backend = HostedBackend::new(
                &config.api_url,
                &config.classifier_model,
                &config.summarizer_model,
            )
            .with_timeout(Duration::from_secs(config.timeout_seconds));

            match std::env::var(&config.api_token_env) {
                Ok(token) if !token.is_empty() => {
                    backend = backend.with_api_token(token);
                }
                _ => {
                    warn!(
                        "{} not set, calling inference API without authentication",
                        config.api_token_env
                    );
                }
            }
            Ok(Arc::new(backend))
        }
        "canned" => Ok(Arc::new(CannedBackend::new())),
        other => anyhow::bail!("Unknown inference backend '{}'", other),
    }
}
