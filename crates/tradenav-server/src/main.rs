//! TradeNavigator classifier service
//!
//! Serves HS code suggestions over HTTP, backed by a remote classification
//! model with local static-mapping and fallback tiers.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

use tradenav_server::{AppState, ConfigOverrides, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "tradenav-server")]
#[command(about = "TradeNavigator HS code classifier service", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", env = "TRADENAV_CONFIG")]
    config: PathBuf,

    /// Remote classification service endpoint
    #[arg(short, long, env = "TRADENAV_REMOTE_ENDPOINT")]
    remote_endpoint: Option<String>,

    /// Reference tables YAML file (replaces the built-in tables)
    #[arg(short, long)]
    tables: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            remote_endpoint: self.remote_endpoint.clone(),
            tables: self.tables.clone(),
            listen: self.listen.clone(),
            port: self.port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting TradeNavigator classifier service");

    let config = ServiceConfig::load(&cli.config, &cli.overrides())?;
    info!("Configuration loaded from {}", cli.config.display());
    info!(
        "Remote classifier: {}",
        config.classifier.remote.endpoint().unwrap_or("disabled")
    );

    let metrics_handle = init_metrics()?;

    let addr: SocketAddr = config.bind_address().parse()?;
    let state = AppState::new(config, Some(metrics_handle))?;

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    tradenav_server::serve(state, addr, shutdown).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("tradenav_server=debug,tradenav_classifiers=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("tradenav_server=info,tradenav_classifiers=info")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "tradenav_requests_total",
        "Total number of API requests by endpoint"
    );
    metrics::describe_counter!(
        "tradenav_classifications_total",
        "Total number of classifications by source tier"
    );
    metrics::describe_counter!(
        "tradenav_remote_failures_total",
        "Remote classifier failures by reason"
    );
    metrics::describe_histogram!(
        "tradenav_classify_latency_us",
        metrics::Unit::Microseconds,
        "Classification cascade latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
