//! # Ticker Registry
//!
//! A global allocator for short, human-readable collection tickers. Each
//! symbol belongs to at most one collection, can be held briefly by a
//! reservation, and is refused when it is reserved by the platform or looks
//! too much like a symbol already in use.
//!
//! ## Features
//!
//! - Format, reserved-word, exact-match and similarity checks
//! - Time-limited reservations, swept in the background
//! - Owner-only cancellation
//! - Search and aggregate statistics
//! - Pluggable storage backend via the `storage` crate
//! - Optional mirror for forwarding registrations to a remote registry
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use storage::MemoryStorage;
//! use tickers::{RegistryBuilder, Sweeper};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = RegistryBuilder::new()
//!     .storage(MemoryStorage::new().into())
//!     .namespace("tickers")
//!     .build()?;
//!
//! let sweeper = Sweeper::spawn(registry.service().clone(), Duration::from_secs(300));
//! let app = registry.router();
//!
//! // Serve `app` with axum or any tower-compatible server
//! # sweeper.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod api;
mod clock;
mod config;
mod error;
mod mirror;
mod record;
mod reserved;
mod service;
mod similarity;
mod storage;
mod sweep;
mod ticker;

pub use crate::storage::TickerStorage;
pub use api::{DEFAULT_NAMESPACE, Registry, RegistryBuilder};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MAX_TICKER_LENGTH, MIN_TICKER_LENGTH, RESERVATION_TTL_MS, RegistryConfig};
pub use error::{RegistryError, RegistryResult};
pub use mirror::{Mirror, MirrorError};
pub use record::{TickerRecord, TickerStatus, normalize};
pub use reserved::ReservedWords;
pub use service::{Availability, FormatCheck, Outcome, RegistryService, RegistryStats};
pub use similarity::{SIMILARITY_THRESHOLD, levenshtein_distance, similarity, too_similar};
pub use sweep::{SWEEP_INTERVAL, Sweeper};
