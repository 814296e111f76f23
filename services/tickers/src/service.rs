//! The registry service: every rule about who may claim which ticker.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::config::RegistryConfig;
use crate::error::RegistryResult;
use crate::record::{TickerRecord, TickerStatus, normalize};
use crate::reserved::ReservedWords;
use crate::similarity::too_similar;
use crate::storage::TickerStorage;

/// Result of checking a symbol's format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatCheck {
    /// Whether the symbol is well formed.
    pub valid: bool,

    /// The first rule the symbol broke.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FormatCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// Whether a symbol can be claimed, and why not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    /// Whether the symbol can be claimed right now.
    pub available: bool,

    /// User-facing explanation when unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Availability {
    fn available() -> Self {
        Self {
            available: true,
            reason: None,
        }
    }

    fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            available: false,
            reason: Some(reason.into()),
        }
    }
}

/// Result of a registration or reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Whether the claim was written.
    pub success: bool,

    /// User-facing description of what happened.
    pub message: String,

    #[serde(skip)]
    record: Option<TickerRecord>,
}

impl Outcome {
    fn success(record: TickerRecord, message: String) -> Self {
        Self {
            success: true,
            message,
            record: Some(record),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            record: None,
        }
    }

    /// The record that was written, on success.
    pub fn record(&self) -> Option<&TickerRecord> {
        self.record.as_ref()
    }
}

/// Aggregate counts over the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    /// Records of any status.
    pub total_registered: usize,
    /// Records with status `active`.
    pub active_tickers: usize,
    /// Records with status `reserved`.
    pub reserved_tickers: usize,
    /// Records with status `inactive`.
    pub inactive_tickers: usize,
    /// Size of the reserved-word list.
    pub reserved_word_count: usize,
}

/// How the store stands with respect to one claim.
#[derive(Debug)]
enum Verdict {
    /// Nobody holds the symbol or anything like it.
    Open,
    /// The claimant already holds a reservation on the symbol.
    Held,
    /// The claim must be refused, for this reason.
    Blocked(String),
}

#[derive(Debug)]
struct Inner {
    storage: TickerStorage,
    reserved: ReservedWords,
    config: RegistryConfig,
    clock: Arc<dyn Clock>,

    // Held across the availability re-check and the write of every mutation.
    writer: Mutex<()>,
}

/// The ticker registry.
///
/// Cloning is cheap and clones share state, so construct one per process and
/// hand clones to the HTTP layer and the sweeper. Mutations are serialized
/// through a single writer lock; reads never take it and may be momentarily
/// stale.
#[derive(Debug, Clone)]
pub struct RegistryService {
    inner: Arc<Inner>,
}

impl RegistryService {
    /// Create a registry on the wall clock.
    pub fn new(storage: TickerStorage, config: RegistryConfig) -> RegistryResult<Self> {
        Self::with_clock(storage, config, SystemClock)
    }

    /// Create a registry reading time from `clock`.
    pub fn with_clock<C>(storage: TickerStorage, config: RegistryConfig, clock: C) -> RegistryResult<Self>
    where
        C: Clock + 'static,
    {
        config.validate()?;
        let reserved = ReservedWords::with_extra(&config.additional_reserved);

        Ok(Self {
            inner: Arc::new(Inner {
                storage,
                reserved,
                config,
                clock: Arc::new(clock),
                writer: Mutex::new(()),
            }),
        })
    }

    /// The configuration in force.
    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// The reserved-word list in force.
    pub fn reserved_words(&self) -> &ReservedWords {
        &self.inner.reserved
    }

    fn now(&self) -> i64 {
        self.inner.clock.now_millis()
    }

    /// Check a symbol against the format rules, in order: present, length,
    /// letters and digits only, no leading digit.
    pub fn validate_format(&self, symbol: &str) -> FormatCheck {
        let symbol = normalize(symbol);
        let config = &self.inner.config;

        if symbol.is_empty() {
            return FormatCheck::fail("Ticker symbol is required");
        }

        let length = symbol.chars().count();
        if length < config.min_length {
            return FormatCheck::fail(format!(
                "Ticker must be at least {} characters long",
                config.min_length
            ));
        }
        if length > config.max_length {
            return FormatCheck::fail(format!(
                "Ticker must be {} characters or less",
                config.max_length
            ));
        }

        if !symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return FormatCheck::fail("Ticker can only contain letters and numbers");
        }

        if symbol.starts_with(|c: char| c.is_ascii_digit()) {
            return FormatCheck::fail("Ticker should not start with a number");
        }

        FormatCheck::ok()
    }

    /// Whether `symbol` could be claimed right now.
    ///
    /// Malformed input is reported as unavailable with a reason. Reservations
    /// past their lifetime keep blocking until the sweeper removes them.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn check_availability(&self, symbol: &str) -> RegistryResult<Availability> {
        Ok(match self.evaluate(symbol, None).await? {
            Verdict::Open | Verdict::Held => Availability::available(),
            Verdict::Blocked(reason) => Availability::unavailable(reason),
        })
    }

    async fn evaluate(&self, symbol: &str, claimant: Option<&str>) -> RegistryResult<Verdict> {
        let format = self.validate_format(symbol);
        if !format.valid {
            let reason = format.message.unwrap_or_else(|| "Invalid ticker".into());
            return Ok(Verdict::Blocked(reason));
        }

        let symbol = normalize(symbol);
        if self.inner.reserved.is_reserved(&symbol) {
            return Ok(Verdict::Blocked(format!("Ticker \"{symbol}\" is reserved")));
        }

        let mut verdict = Verdict::Open;
        if let Some(existing) = self.inner.storage.get(&symbol).await? {
            match claimant {
                Some(wallet) if existing.is_reserved_by(wallet) => verdict = Verdict::Held,
                _ => {
                    return Ok(Verdict::Blocked(format!(
                        "Ticker \"{symbol}\" is already used by \"{}\"",
                        existing.collection_name
                    )));
                }
            }
        }

        let threshold = self.inner.config.similarity_threshold;
        let similar: Vec<String> = self
            .inner
            .storage
            .values()
            .await?
            .into_iter()
            .filter(|record| record.symbol != symbol)
            .filter(|record| too_similar(&symbol, &record.symbol, threshold))
            .map(|record| record.symbol)
            .collect();

        if !similar.is_empty() {
            return Ok(Verdict::Blocked(format!(
                "Ticker \"{symbol}\" is too similar to existing tickers: {}",
                similar.join(", ")
            )));
        }

        Ok(verdict)
    }

    /// The refusal for a brand new claim, if the registry is full.
    async fn capacity_refusal(&self) -> RegistryResult<Option<String>> {
        let Some(capacity) = self.inner.config.capacity else {
            return Ok(None);
        };

        if self.inner.storage.len().await? >= capacity {
            return Ok(Some(format!(
                "Ticker registry is full ({capacity} tickers)"
            )));
        }
        Ok(None)
    }

    /// Run the full availability gate for a claim by `wallet`.
    ///
    /// Must be called with the writer lock held.
    async fn gate(&self, symbol: &str, wallet: &str) -> RegistryResult<Option<String>> {
        if wallet.trim().is_empty() {
            return Ok(Some("Creator wallet is required".into()));
        }

        match self.evaluate(symbol, Some(wallet)).await? {
            Verdict::Blocked(reason) => Ok(Some(reason)),
            Verdict::Held => Ok(None),
            Verdict::Open => self.capacity_refusal().await,
        }
    }

    /// Permanently register `symbol` to a collection.
    ///
    /// Availability is re-checked under the writer lock, so of two racing
    /// registrations exactly one succeeds. A reservation held by
    /// `creator_wallet` is converted in place.
    #[tracing::instrument(skip(self, collection_address))]
    pub async fn register_ticker(
        &self,
        symbol: &str,
        collection_name: &str,
        collection_address: &str,
        creator_wallet: &str,
    ) -> RegistryResult<Outcome> {
        let _writer = self.inner.writer.lock().await;

        if let Some(reason) = self.gate(symbol, creator_wallet).await? {
            tracing::debug!(%reason, "Registration refused");
            return Ok(Outcome::failure(reason));
        }

        let record = TickerRecord::active(
            normalize(symbol),
            collection_name,
            collection_address,
            creator_wallet,
            self.now(),
        );
        self.inner.storage.set(&record).await?;

        tracing::info!(symbol = %record.symbol, "Registered ticker for collection {collection_name:?}");
        let message = format!("Ticker \"{}\" registered successfully", record.symbol);
        Ok(Outcome::success(record, message))
    }

    /// Hold `symbol` for `creator_wallet` for the reservation lifetime.
    ///
    /// Reserving a symbol the wallet already holds restarts the clock.
    #[tracing::instrument(skip(self))]
    pub async fn reserve_ticker(&self, symbol: &str, creator_wallet: &str) -> RegistryResult<Outcome> {
        let _writer = self.inner.writer.lock().await;

        if let Some(reason) = self.gate(symbol, creator_wallet).await? {
            tracing::debug!(%reason, "Reservation refused");
            return Ok(Outcome::failure(reason));
        }

        let record = TickerRecord::reserved(normalize(symbol), creator_wallet, self.now());
        self.inner.storage.set(&record).await?;

        tracing::info!(symbol = %record.symbol, "Reserved ticker");
        let message = format!(
            "Ticker \"{}\" reserved for {}",
            record.symbol,
            self.inner.config.reservation_window()
        );
        Ok(Outcome::success(record, message))
    }

    /// Release a reservation early.
    ///
    /// Only succeeds when the record exists, is still a reservation, and was
    /// made by `creator_wallet`. All other cases answer `false` alike.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_reservation(&self, symbol: &str, creator_wallet: &str) -> RegistryResult<bool> {
        if !self.validate_format(symbol).valid {
            return Ok(false);
        }

        let _writer = self.inner.writer.lock().await;
        let symbol = normalize(symbol);

        match self.inner.storage.get(&symbol).await? {
            Some(record) if record.is_reserved_by(creator_wallet) => {
                self.inner.storage.delete(&symbol).await?;
                tracing::info!(%symbol, "Cancelled reservation");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Remove every reservation older than the reservation lifetime.
    ///
    /// Returns how many were removed; calling again immediately removes none.
    #[tracing::instrument(skip(self))]
    pub async fn cleanup_expired_reservations(&self) -> RegistryResult<usize> {
        let _writer = self.inner.writer.lock().await;
        let now = self.now();
        let ttl = self.inner.config.reservation_ttl_ms;

        let mut removed = 0;
        for (symbol, record) in self.inner.storage.entries().await? {
            if record.is_expired(now, ttl) && self.inner.storage.delete(&symbol).await? {
                tracing::info!(%symbol, "Cleaned up expired reservation");
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Records whose symbol or collection name contains `pattern`, ignoring
    /// case, newest first. An empty pattern matches everything.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn search_tickers(&self, pattern: &str) -> RegistryResult<Vec<TickerRecord>> {
        let pattern = pattern.to_uppercase();
        let mut matches: Vec<TickerRecord> = self
            .inner
            .storage
            .values()
            .await?
            .into_iter()
            .filter(|record| {
                record.symbol.contains(&pattern)
                    || record.collection_name.to_uppercase().contains(&pattern)
            })
            .collect();

        newest_first(&mut matches);
        Ok(matches)
    }

    /// The record for `symbol`, if any.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn ticker_info(&self, symbol: &str) -> RegistryResult<Option<TickerRecord>> {
        if !self.validate_format(symbol).valid {
            return Ok(None);
        }
        self.inner.storage.get(&normalize(symbol)).await
    }

    /// Every record, newest first.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn all_tickers(&self) -> RegistryResult<Vec<TickerRecord>> {
        let mut records = self.inner.storage.values().await?;
        newest_first(&mut records);
        Ok(records)
    }

    /// Counts by status, plus the size of the reserved-word list.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_stats(&self) -> RegistryResult<RegistryStats> {
        let records = self.inner.storage.values().await?;
        let count = |status: TickerStatus| records.iter().filter(|r| r.status == status).count();

        Ok(RegistryStats {
            total_registered: records.len(),
            active_tickers: count(TickerStatus::Active),
            reserved_tickers: count(TickerStatus::Reserved),
            inactive_tickers: count(TickerStatus::Inactive),
            reserved_word_count: self.inner.reserved.len(),
        })
    }
}

fn newest_first(records: &mut [TickerRecord]) {
    records.sort_by(|a, b| {
        b.registered_at
            .cmp(&a.registered_at)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
}
