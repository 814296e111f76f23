//! Ticker registry server
//!
//! Run with: cargo run -p tickers --features cli -- --config tickers.toml

use std::net::SocketAddr;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use eyre::WrapErr as _;
use serde::Deserialize;
use storage::StorageConfig;
use tickers::{DEFAULT_NAMESPACE, RegistryBuilder, RegistryConfig, SWEEP_INTERVAL, Sweeper};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[derive(Debug, Parser)]
#[command(name = "ticker-registry")]
#[command(about = "Global registry of collection ticker symbols")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,

    /// Address to listen on, overriding the configuration file
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct ServerConfig {
    bind: SocketAddr,
    namespace: String,
    sweep_interval_secs: u64,
    storage: StorageConfig,
    registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            namespace: DEFAULT_NAMESPACE.to_string(),
            sweep_interval_secs: SWEEP_INTERVAL.as_secs(),
            storage: StorageConfig::Memory,
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    fn load(path: Option<&Utf8PathBuf>) -> eyre::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading configuration from {path}"))?;
        toml_edit::de::from_str(&text).wrap_err_with(|| format!("parsing configuration in {path}"))
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_error::ErrorLayer::default());

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);

    let mut config = ServerConfig::load(args.config.as_ref())?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    let storage = config
        .storage
        .build()
        .await
        .wrap_err("opening ticker storage")?;
    tracing::info!(driver = storage.name(), namespace = %config.namespace, "Opened storage");

    let registry = RegistryBuilder::new()
        .storage(storage)
        .namespace(config.namespace)
        .config(config.registry)
        .build()?;

    let sweeper = Sweeper::spawn(
        registry.service().clone(),
        Duration::from_secs(config.sweep_interval_secs.max(1)),
    );

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .wrap_err_with(|| format!("binding {}", config.bind))?;
    tracing::info!("Ticker registry listening on http://{}", config.bind);

    axum::serve(listener, registry.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("serving ticker registry")?;

    sweeper.shutdown().await;
    Ok(())
}
