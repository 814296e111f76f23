//! Basic ticker registry server example
//!
//! Run with: cargo run -p tickers --example basic_server

use std::time::Duration;

use storage::MemoryStorage;
use tickers::{Mirror, MirrorError, RegistryBuilder, Sweeper, TickerRecord};

/// A mirror which only logs what it would have sent.
#[derive(Debug)]
struct LogMirror;

#[async_trait::async_trait]
impl Mirror for LogMirror {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn register(&self, record: &TickerRecord) -> Result<(), MirrorError> {
        tracing::info!(symbol = %record.symbol, address = %record.collection_address, "Would mirror registration");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Build the registry over an in-memory storage backend
    let registry = RegistryBuilder::new()
        .storage(MemoryStorage::new().into())
        .namespace("tickers")
        .mirror(LogMirror)
        .build()?;

    let sweeper = Sweeper::spawn(registry.service().clone(), Duration::from_secs(60));

    // Bind to address
    let addr = "127.0.0.1:5000";
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Ticker registry listening on http://{}", addr);
    tracing::info!("Try: curl http://{}/ticker/check/PEPE", addr);

    // Serve the registry
    axum::serve(listener, registry.router()).await?;

    sweeper.shutdown().await;
    Ok(())
}
