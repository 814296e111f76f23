//! Ticker records as they are stored and served.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalize a caller-supplied symbol into its storage key.
///
/// Comparison between tickers always happens on this form.
pub fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Lifecycle state of a ticker record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickerStatus {
    /// Permanently registered to a collection.
    Active,

    /// Held temporarily, pending registration or expiry.
    Reserved,

    /// Retired by an administrator, still occupying the symbol.
    Inactive,
}

impl fmt::Display for TickerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickerStatus::Active => f.write_str("active"),
            TickerStatus::Reserved => f.write_str("reserved"),
            TickerStatus::Inactive => f.write_str("inactive"),
        }
    }
}

/// One claimed or reserved ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerRecord {
    /// Normalized symbol, unique across the registry.
    pub symbol: String,

    /// Display name of the claiming collection.
    pub collection_name: String,

    /// On-chain collection address, empty while reserved.
    pub collection_address: String,

    /// Wallet which made the claim.
    pub creator_wallet: String,

    /// Milliseconds since the Unix epoch of creation or last reservation.
    pub registered_at: i64,

    /// Lifecycle state.
    pub status: TickerStatus,
}

impl TickerRecord {
    /// A permanent registration.
    pub fn active(
        symbol: String,
        collection_name: impl Into<String>,
        collection_address: impl Into<String>,
        creator_wallet: impl Into<String>,
        registered_at: i64,
    ) -> Self {
        Self {
            symbol,
            collection_name: collection_name.into(),
            collection_address: collection_address.into(),
            creator_wallet: creator_wallet.into(),
            registered_at,
            status: TickerStatus::Active,
        }
    }

    /// A temporary hold, with a placeholder collection name and no address.
    pub fn reserved(symbol: String, creator_wallet: impl Into<String>, registered_at: i64) -> Self {
        Self {
            collection_name: format!("RESERVED_{symbol}"),
            symbol,
            collection_address: String::new(),
            creator_wallet: creator_wallet.into(),
            registered_at,
            status: TickerStatus::Reserved,
        }
    }

    /// Whether this is a reservation held by `wallet`.
    pub fn is_reserved_by(&self, wallet: &str) -> bool {
        self.status == TickerStatus::Reserved && self.creator_wallet == wallet
    }

    /// Whether this is a reservation older than `ttl_ms` at `now`.
    pub fn is_expired(&self, now: i64, ttl_ms: u64) -> bool {
        self.status == TickerStatus::Reserved
            && now.saturating_sub(self.registered_at) > i64::try_from(ttl_ms).unwrap_or(i64::MAX)
    }
}
