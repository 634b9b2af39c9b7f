//! Groundtruth HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use groundtruth::capability::{Capabilities, RemoteModelService, RemoteServiceConfig};
use groundtruth::config::Config;
use groundtruth::embedding::{ClassifierConfig, EncoderConfig, NliClassifier, SentenceEncoder};
use groundtruth::entities::HeuristicEntityExtractor;
use groundtruth::gateway::{AppState, create_router};
use groundtruth::source::{HttpDocumentFetcher, SourcePolicy};
use groundtruth::verification::VerifierConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;
    let verifier_config = VerifierConfig::from_env()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "Groundtruth starting"
    );

    let capabilities = build_capabilities(&config, &verifier_config)?;
    tracing::info!(?capabilities, "Capabilities ready");

    let policy = SourcePolicy::new(config.blocked_domains.iter().cloned());
    let fetcher = Arc::new(HttpDocumentFetcher::new(
        config.fetch_timeout,
        policy.clone(),
    )?);

    let state = AppState::new(capabilities, verifier_config, policy, fetcher)?;
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Groundtruth shutdown complete");
    Ok(())
}

fn build_capabilities(
    config: &Config,
    verifier_config: &VerifierConfig,
) -> anyhow::Result<Capabilities> {
    if let Some(url) = &config.capability_url {
        tracing::info!(url = %url, "Using remote model service");
        // The aggregator bounds every call by the same timeout.
        let service = RemoteModelService::new(
            RemoteServiceConfig::new(url.clone()).with_timeout(verifier_config.call_timeout),
        )?;
        return Ok(Capabilities::remote(Arc::new(service)));
    }

    let classifier_config = match &config.classifier_path {
        Some(path) => ClassifierConfig::new(path.clone()),
        None => {
            tracing::warn!(
                "No GROUNDTRUTH_CLASSIFIER_PATH configured, running classifier in stub mode"
            );
            ClassifierConfig::stub()
        }
    };
    let encoder_config = match &config.encoder_path {
        Some(path) => EncoderConfig::new(path.clone()),
        None => {
            tracing::warn!("No GROUNDTRUTH_ENCODER_PATH configured, running encoder in stub mode");
            EncoderConfig::stub()
        }
    };

    Ok(Capabilities::new(
        Arc::new(NliClassifier::load(classifier_config)?),
        Arc::new(SentenceEncoder::load(encoder_config)?),
        Arc::new(HeuristicEntityExtractor::new()),
    ))
}

async fn run_health_check() -> i32 {
    let port = std::env::var("GROUNDTRUTH_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(5001);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
