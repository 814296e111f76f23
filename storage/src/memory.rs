use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use tokio::sync::RwLock;

use storage_driver::{Driver, Entry, StorageError};

/// Storage driver that keeps values in memory.
///
/// Namespaces spring into existence on first write; reading from a namespace
/// that was never written behaves like reading from an empty one.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    namespaces: RwLock<HashMap<String, BTreeMap<String, Bytes>>>,
}

impl MemoryStorage {
    /// Create a new, empty `MemoryStorage` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values held across all namespaces.
    pub async fn len(&self) -> usize {
        let namespaces = self.namespaces.read().await;
        namespaces.values().map(BTreeMap::len).sum()
    }

    /// Whether no values are held at all.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl Driver for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Bytes>, StorageError> {
        let namespaces = self.namespaces.read().await;
        Ok(namespaces
            .get(namespace)
            .and_then(|values| values.get(key))
            .cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: Bytes) -> Result<(), StorageError> {
        let mut namespaces = self.namespaces.write().await;
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<bool, StorageError> {
        let mut namespaces = self.namespaces.write().await;
        Ok(namespaces
            .get_mut(namespace)
            .and_then(|values| values.remove(key))
            .is_some())
    }

    async fn entries(&self, namespace: &str) -> Result<Vec<Entry>, StorageError> {
        tracing::trace!(%namespace, "list memory namespace");

        let namespaces = self.namespaces.read().await;
        Ok(namespaces
            .get(namespace)
            .map(|values| {
                values
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let memory = MemoryStorage::new();
        assert!(memory.is_empty().await);

        memory
            .set("tickers", "PEPE", Bytes::from_static(b"pepe"))
            .await
            .unwrap();
        assert_eq!(
            memory.get("tickers", "PEPE").await.unwrap(),
            Some(Bytes::from_static(b"pepe"))
        );
        assert_eq!(memory.get("other", "PEPE").await.unwrap(), None);
        assert!(memory.contains("tickers", "PEPE").await.unwrap());

        assert!(memory.delete("tickers", "PEPE").await.unwrap());
        assert!(!memory.delete("tickers", "PEPE").await.unwrap());
        assert!(!memory.delete("missing", "PEPE").await.unwrap());
        assert!(memory.is_empty().await);
    }

    #[tokio::test]
    async fn entries_are_sorted_and_scoped() {
        let memory = MemoryStorage::new();
        for key in ["ZED", "ABC", "MOON"] {
            memory
                .set("tickers", key, Bytes::from(key.to_lowercase()))
                .await
                .unwrap();
        }
        memory
            .set("other", "XYZ", Bytes::from_static(b"xyz"))
            .await
            .unwrap();

        let keys = memory.keys("tickers").await.unwrap();
        assert_eq!(keys, vec!["ABC", "MOON", "ZED"]);

        let entries = memory.entries("tickers").await.unwrap();
        assert_eq!(entries[0], ("ABC".to_string(), Bytes::from_static(b"abc")));
        assert!(memory.entries("empty").await.unwrap().is_empty());
        assert_eq!(memory.len().await, 4);
    }

    #[tokio::test]
    async fn set_replaces() {
        let memory = MemoryStorage::new();
        memory
            .set("tickers", "ABC", Bytes::from_static(b"one"))
            .await
            .unwrap();
        memory
            .set("tickers", "ABC", Bytes::from_static(b"two"))
            .await
            .unwrap();

        assert_eq!(memory.len().await, 1);
        assert_eq!(
            memory.get("tickers", "ABC").await.unwrap(),
            Some(Bytes::from_static(b"two"))
        );
    }
}
