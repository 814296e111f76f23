//! Storage layer for the registry

use bytes::Bytes;

use crate::error::RegistryResult;
use crate::record::TickerRecord;

/// Ticker records, keyed by normalized symbol, persisted as JSON.
///
/// No business rules live here: one record per key, nothing more. Callers
/// normalize symbols before using them as keys.
#[derive(Clone, Debug)]
pub struct TickerStorage {
    namespace: storage::StorageNamespace,
}

impl TickerStorage {
    /// Create a new ticker store in `namespace` of `storage`.
    pub fn new(storage: storage::Storage, namespace: impl Into<String>) -> Self {
        Self {
            namespace: storage.namespace(namespace),
        }
    }

    /// Get the record stored under `symbol`
    pub async fn get(&self, symbol: &str) -> RegistryResult<Option<TickerRecord>> {
        match self.namespace.get(symbol).await? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// Store `record` under its symbol, replacing any existing record
    pub async fn set(&self, record: &TickerRecord) -> RegistryResult<()> {
        let data = Bytes::from(serde_json::to_vec(record)?);
        self.namespace.set(&record.symbol, data).await?;
        Ok(())
    }

    /// Delete the record stored under `symbol`, returning whether one existed
    pub async fn delete(&self, symbol: &str) -> RegistryResult<bool> {
        Ok(self.namespace.delete(symbol).await?)
    }

    /// All records, ordered by symbol
    pub async fn values(&self) -> RegistryResult<Vec<TickerRecord>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// All `(symbol, record)` pairs, ordered by symbol.
    ///
    /// Records which fail to decode are logged and left out of the listing.
    /// [`TickerStorage::get`] still reports them as errors.
    pub async fn entries(&self) -> RegistryResult<Vec<(String, TickerRecord)>> {
        Ok(self
            .namespace
            .entries()
            .await?
            .into_iter()
            .filter_map(|(symbol, data)| match serde_json::from_slice(&data) {
                Ok(record) => Some((symbol, record)),
                Err(error) => {
                    tracing::warn!(%symbol, %error, "Skipping undecodable ticker record");
                    None
                }
            })
            .collect())
    }

    /// Number of stored keys, counting records which fail to decode
    pub async fn len(&self) -> RegistryResult<usize> {
        Ok(self.namespace.entries().await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use storage::MemoryStorage;

    fn test_storage() -> TickerStorage {
        TickerStorage::new(MemoryStorage::new().into(), "test")
    }

    #[tokio::test]
    async fn test_record_storage() {
        let storage = test_storage();
        let record = TickerRecord::active("PEPE".into(), "Pepe Collection", "addr123", "W1", 1);

        assert_eq!(storage.get("PEPE").await.unwrap(), None);

        storage.set(&record).await.unwrap();
        assert_eq!(storage.get("PEPE").await.unwrap(), Some(record.clone()));
        assert_eq!(storage.len().await.unwrap(), 1);

        assert!(storage.delete("PEPE").await.unwrap());
        assert!(!storage.delete("PEPE").await.unwrap());
        assert_eq!(storage.get("PEPE").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_listing_order() {
        let storage = test_storage();
        for (i, symbol) in ["MOON", "ABC", "ZED"].into_iter().enumerate() {
            storage
                .set(&TickerRecord::reserved(symbol.into(), "W1", i as i64))
                .await
                .unwrap();
        }

        let symbols: Vec<_> = storage
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|(symbol, _)| symbol)
            .collect();
        assert_eq!(symbols, vec!["ABC", "MOON", "ZED"]);

        let values = storage.values().await.unwrap();
        assert_eq!(values[1].symbol, "MOON");
        assert_eq!(values[1].registered_at, 0);
    }

    #[tokio::test]
    async fn test_corrupt_record() {
        let memory: storage::Storage = MemoryStorage::new().into();
        memory
            .set("test", "BAD", Bytes::from_static(b"not json"))
            .await
            .unwrap();

        let storage = TickerStorage::new(memory, "test");
        storage
            .set(&TickerRecord::reserved("GOOD".into(), "W1", 1))
            .await
            .unwrap();

        assert!(matches!(
            storage.get("BAD").await,
            Err(RegistryError::Serialization(_))
        ));

        let values = storage.values().await.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].symbol, "GOOD");
    }

    #[tokio::test]
    async fn test_empty_symbol_is_rejected() {
        let storage = test_storage();
        assert!(matches!(
            storage.get("").await,
            Err(RegistryError::Storage(_))
        ));
    }
}
