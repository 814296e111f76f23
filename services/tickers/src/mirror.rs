//! Optional remote copy of the registry.
//!
//! A mirror receives every successful registration after it has been written
//! locally. Mirror failures are logged by the caller and never undo the local
//! record.

use std::fmt;

use crate::record::TickerRecord;

/// Error returned by a [`Mirror`].
#[derive(Debug, thiserror::Error)]
#[error("mirror {mirror} rejected {symbol}: {source}")]
pub struct MirrorError {
    mirror: &'static str,
    symbol: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl MirrorError {
    /// Wrap `source` as a failure of `mirror` to accept `symbol`.
    pub fn new<E>(mirror: &'static str, symbol: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            mirror,
            symbol: symbol.into(),
            source: source.into(),
        }
    }

    /// The symbol that failed to mirror.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

/// A remote registry which is told about local registrations.
#[async_trait::async_trait]
pub trait Mirror: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Record `record` remotely.
    async fn register(&self, record: &TickerRecord) -> Result<(), MirrorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MirrorError::new("chain", "PEPE", "timed out");
        assert_eq!(err.to_string(), "mirror chain rejected PEPE: timed out");
        assert_eq!(err.symbol(), "PEPE");
        assert!(std::error::Error::source(&err).is_some());
    }
}
