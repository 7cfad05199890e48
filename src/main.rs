use anyhow::Context;
use clap::Parser;
use echovision::config::Config;
use echovision::server::Server;
use echovision::stt::recognizer::RecognizerEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Live radio transcription server.
#[derive(Parser, Debug)]
#[command(name = "echovision", version, about)]
struct Args {
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address override
    #[arg(long)]
    host: Option<String>,

    /// Listen port override
    #[arg(long)]
    port: Option<u16>,

    /// Recognition model directory override
    #[arg(long)]
    model: Option<PathBuf>,

    /// Download the recognition model first if it is missing
    #[cfg(feature = "model-download")]
    #[arg(long)]
    download_model: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?
        .with_env_overrides();

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(model) = args.model {
        config.stt.model_path = model;
    }
    config.validate().context("invalid configuration")?;

    #[cfg(feature = "model-download")]
    if args.download_model {
        let path = echovision::stt::download::ensure_model(&config.stt.model_path, true)
            .await
            .context("model download failed")?;
        info!(path = %path.display(), "model ready");
    }

    let engine = load_engine(&config);
    match &engine {
        Some(engine) => info!(model = engine.model_name(), "recognition model loaded"),
        None => tracing::error!(
            model = %config.stt.model_path.display(),
            "no recognition model; sessions will be refused"
        ),
    }

    Server::new(config, engine).run().await?;
    Ok(())
}

fn init_logging() {
    let filter = std::env::var("ECHOVISION_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(feature = "vosk")]
fn load_engine(config: &Config) -> Option<Arc<dyn RecognizerEngine>> {
    match echovision::stt::vosk::VoskEngine::load(&config.stt.model_path, config.stream.sample_rate)
    {
        Ok(engine) => Some(Arc::new(engine)),
        Err(e) => {
            tracing::error!(error = %e, "model load failed");
            None
        }
    }
}

#[cfg(not(feature = "vosk"))]
fn load_engine(_config: &Config) -> Option<Arc<dyn RecognizerEngine>> {
    tracing::warn!("built without the vosk feature; no recognizer available");
    None
}
