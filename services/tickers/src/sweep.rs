//! Background removal of expired reservations.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::Instrument as _;

use crate::service::RegistryService;

/// How often the sweeper runs by default: 5 minutes.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Handle to a running sweeper task.
#[derive(Debug)]
pub struct Sweeper {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Start sweeping `service` every `every`, beginning immediately.
    pub fn spawn(service: RegistryService, every: Duration) -> Self {
        let token = CancellationToken::new();
        let span = tracing::info_span!("sweeper", interval = ?every);
        let handle = tokio::spawn(run(service, every, token.clone()).instrument(span));
        Self { token, handle }
    }

    /// A token which stops the sweeper when cancelled.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stop the sweeper and wait for an in-progress sweep to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(error) = self.handle.await {
            tracing::warn!(%error, "Sweeper task did not exit cleanly");
        }
    }
}

async fn run(service: RegistryService, every: Duration, token: CancellationToken) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                match service.cleanup_expired_reservations().await {
                    Ok(0) => tracing::trace!("No expired reservations"),
                    Ok(removed) => tracing::info!(removed, "Swept expired reservations"),
                    // The next tick retries.
                    Err(error) => tracing::warn!(%error, "Reservation sweep failed"),
                }
            }
        }
    }

    tracing::debug!("Sweeper stopped");
}

#[cfg(test)]
mod tests {
    use storage::MemoryStorage;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::RegistryConfig;
    use crate::storage::TickerStorage;

    fn registry(clock: &ManualClock) -> RegistryService {
        let storage = TickerStorage::new(MemoryStorage::new().into(), "tickers");
        RegistryService::with_clock(storage, RegistryConfig::default(), clock.clone()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_on_interval() {
        let clock = ManualClock::new(0);
        let service = registry(&clock);
        service.reserve_ticker("ABC", "W1").await.unwrap();

        let sweeper = Sweeper::spawn(service.clone(), SWEEP_INTERVAL);
        tokio::task::yield_now().await;
        assert!(service.ticker_info("ABC").await.unwrap().is_some());

        clock.advance(Duration::from_secs(601));
        tokio::time::sleep(SWEEP_INTERVAL + Duration::from_secs(1)).await;
        assert!(service.ticker_info("ABC").await.unwrap().is_none());

        sweeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_shutdown() {
        let clock = ManualClock::new(0);
        let service = registry(&clock);

        let sweeper = Sweeper::spawn(service.clone(), SWEEP_INTERVAL);
        let token = sweeper.token();
        sweeper.shutdown().await;
        assert!(token.is_cancelled());

        service.reserve_ticker("ABC", "W1").await.unwrap();
        clock.advance(Duration::from_secs(601));
        tokio::time::sleep(SWEEP_INTERVAL * 2).await;
        assert!(service.ticker_info("ABC").await.unwrap().is_some());
    }
}
