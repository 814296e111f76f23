use std::fmt;

use bytes::Bytes;

use crate::error::{StorageError, StorageErrorKind};

/// A single stored value, paired with its key.
pub type Entry = (String, Bytes);

/// A storage driver, which provides the ability to interact with a key/value backend.
///
/// Keys live inside a namespace (the analogue of a bucket). Drivers must keep
/// at most one value per key, and must list entries in ascending key order so
/// callers get deterministic listings.
#[async_trait::async_trait]
pub trait Driver: fmt::Debug {
    /// The name of the driver.
    fn name(&self) -> &'static str;

    /// Fetch the value stored under `key`, if there is one.
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Bytes>, StorageError>;

    /// Store `value` under `key`, replacing any existing value.
    async fn set(&self, namespace: &str, key: &str, value: Bytes) -> Result<(), StorageError>;

    /// Remove the value stored under `key`.
    ///
    /// Returns `true` if a value was removed.
    async fn delete(&self, namespace: &str, key: &str) -> Result<bool, StorageError>;

    /// List every entry in the namespace, sorted by key.
    async fn entries(&self, namespace: &str) -> Result<Vec<Entry>, StorageError>;

    /// List every key in the namespace, sorted.
    async fn keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .entries(namespace)
            .await?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    /// Check whether a value is stored under `key`.
    async fn contains(&self, namespace: &str, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(namespace, key).await?.is_some())
    }

    /// Reject keys which no backend can represent.
    ///
    /// Empty keys, path separators and parent references are invalid for every
    /// driver, so a key accepted here is safe to use as a file name.
    fn validate_key(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let problem = if key.is_empty() {
            Some("key must not be empty")
        } else if key.contains(['/', '\\']) {
            Some("key must not contain path separators")
        } else if key == "." || key == ".." {
            Some("key must not be a relative path component")
        } else {
            None
        };

        match problem {
            Some(problem) => Err(StorageError::builder(
                self.name(),
                StorageErrorKind::InvalidRequest,
                problem,
            )
            .namespace(namespace)
            .key(key)
            .build()),
            None => Ok(()),
        }
    }
}
