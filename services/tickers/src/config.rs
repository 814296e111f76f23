//! Registry tuning knobs.

use serde::Deserialize;

use crate::error::{RegistryError, RegistryResult};
use crate::similarity::SIMILARITY_THRESHOLD;

/// How long a reservation holds its symbol: 10 minutes.
pub const RESERVATION_TTL_MS: u64 = 10 * 60 * 1000;

/// Shortest accepted ticker.
pub const MIN_TICKER_LENGTH: usize = 2;

/// Longest accepted ticker.
pub const MAX_TICKER_LENGTH: usize = 10;

/// Configuration for a [`RegistryService`](crate::RegistryService).
///
/// Every field has a default, so an empty `[registry]` table is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RegistryConfig {
    /// Lifetime of a reservation, in milliseconds.
    pub reservation_ttl_ms: u64,

    /// Similarity above which two tickers collide, in `(0, 1)`.
    pub similarity_threshold: f64,

    /// Minimum ticker length, in characters.
    pub min_length: usize,

    /// Maximum ticker length, in characters.
    pub max_length: usize,

    /// Maximum number of records the registry will hold.
    pub capacity: Option<usize>,

    /// Words reserved in addition to the built-in list.
    pub additional_reserved: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            reservation_ttl_ms: RESERVATION_TTL_MS,
            similarity_threshold: SIMILARITY_THRESHOLD,
            min_length: MIN_TICKER_LENGTH,
            max_length: MAX_TICKER_LENGTH,
            capacity: None,
            additional_reserved: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Check that the values are usable together.
    pub fn validate(&self) -> RegistryResult<()> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold < 1.0) {
            return Err(RegistryError::InvalidConfig(format!(
                "similarity threshold must be between 0 and 1, got {}",
                self.similarity_threshold
            )));
        }

        if self.min_length == 0 {
            return Err(RegistryError::InvalidConfig(
                "minimum ticker length must be at least 1".into(),
            ));
        }

        if self.min_length > self.max_length {
            return Err(RegistryError::InvalidConfig(format!(
                "minimum ticker length {} exceeds maximum {}",
                self.min_length, self.max_length
            )));
        }

        if self.reservation_ttl_ms == 0 {
            return Err(RegistryError::InvalidConfig(
                "reservation ttl must be positive".into(),
            ));
        }

        if self.capacity == Some(0) {
            return Err(RegistryError::InvalidConfig(
                "capacity must be positive when set".into(),
            ));
        }

        Ok(())
    }

    /// Human-readable reservation window, e.g. `10 minutes`.
    pub fn reservation_window(&self) -> String {
        let ms = self.reservation_ttl_ms;
        let (amount, unit) = if ms % 60_000 == 0 {
            (ms / 60_000, "minute")
        } else if ms % 1_000 == 0 {
            (ms / 1_000, "second")
        } else {
            (ms, "millisecond")
        };

        if amount == 1 {
            format!("1 {unit}")
        } else {
            format!("{amount} {unit}s")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.reservation_ttl_ms, 600_000);
        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!((config.min_length, config.max_length), (2, 10));
        assert!(config.validate().is_ok());
        assert_eq!(config.reservation_window(), "10 minutes");
    }

    #[test]
    fn deserialize_partial() {
        let config: RegistryConfig = serde_json::from_value(serde_json::json!({
            "similarity-threshold": 0.75,
            "capacity": 1000,
        }))
        .unwrap();

        assert_eq!(config.similarity_threshold, 0.75);
        assert_eq!(config.capacity, Some(1000));
        assert_eq!(config.reservation_ttl_ms, RESERVATION_TTL_MS);
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            RegistryConfig {
                similarity_threshold: 1.0,
                ..Default::default()
            },
            RegistryConfig {
                similarity_threshold: 0.0,
                ..Default::default()
            },
            RegistryConfig {
                min_length: 0,
                ..Default::default()
            },
            RegistryConfig {
                min_length: 5,
                max_length: 4,
                ..Default::default()
            },
            RegistryConfig {
                reservation_ttl_ms: 0,
                ..Default::default()
            },
            RegistryConfig {
                capacity: Some(0),
                ..Default::default()
            },
        ];

        for config in bad {
            assert!(
                matches!(config.validate(), Err(RegistryError::InvalidConfig(_))),
                "{config:?}"
            );
        }
    }

    #[test]
    fn window_wording() {
        let window = |ms| {
            RegistryConfig {
                reservation_ttl_ms: ms,
                ..Default::default()
            }
            .reservation_window()
        };

        assert_eq!(window(60_000), "1 minute");
        assert_eq!(window(90_000), "90 seconds");
        assert_eq!(window(1_500), "1500 milliseconds");
    }
}
