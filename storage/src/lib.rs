//! # Storage backends
//!
//! Configuration and unification for the key/value storage backends.

use std::sync::Arc;

use bytes::Bytes;
#[cfg(feature = "local")]
use camino::Utf8PathBuf;
use serde::Deserialize;

#[cfg(feature = "local")]
pub(crate) mod local;

pub(crate) mod memory;

#[cfg(feature = "local")]
#[doc(inline)]
pub use local::LocalDriver;

#[doc(inline)]
pub use memory::MemoryStorage;

#[doc(inline)]
pub use storage_driver::{Driver, Entry, StorageError, StorageErrorKind};

/// Selects and configures a storage backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageConfig {
    /// Keep everything in process memory.
    Memory,

    /// Keep one file per key below `path`.
    #[cfg(feature = "local")]
    Local {
        /// Root directory for all namespaces.
        path: Utf8PathBuf,
    },
}

impl StorageConfig {
    /// Construct the configured backend.
    #[tracing::instrument]
    pub async fn build(self) -> Result<Storage, StorageError> {
        let client: Storage = match self {
            StorageConfig::Memory => MemoryStorage::new().into(),
            #[cfg(feature = "local")]
            StorageConfig::Local { path } => LocalDriver::create(path).await?.into(),
        };
        Ok(client)
    }
}

pub(crate) type ArcDriver = Arc<dyn Driver + Send + Sync>;

/// A cloneable handle to a storage driver.
#[derive(Debug, Clone)]
pub struct Storage {
    driver: ArcDriver,
}

impl<D> From<D> for Storage
where
    D: Driver + Send + Sync + 'static,
{
    fn from(value: D) -> Self {
        Storage::new(value)
    }
}

impl Storage {
    /// Wrap a driver in a handle.
    pub fn new<D: Driver + Send + Sync + 'static>(driver: D) -> Self {
        Self {
            driver: Arc::new(driver),
        }
    }

    /// Name of the underlying driver.
    pub fn name(&self) -> &str {
        self.driver.name()
    }

    /// Scope this handle to a single namespace.
    pub fn namespace<S: Into<String>>(&self, namespace: S) -> StorageNamespace {
        StorageNamespace {
            driver: self.driver.clone(),
            namespace: namespace.into(),
        }
    }

    /// Fetch the value stored under `key`.
    #[tracing::instrument(skip(self), fields(driver=self.driver.name()))]
    pub async fn get(&self, namespace: &str, key: &str) -> Result<Option<Bytes>, StorageError> {
        self.driver.validate_key(namespace, key)?;
        self.driver.get(namespace, key).await
    }

    /// Store `value` under `key`.
    #[tracing::instrument(skip(self, value), fields(driver=self.driver.name(), size=value.len()))]
    pub async fn set(&self, namespace: &str, key: &str, value: Bytes) -> Result<(), StorageError> {
        self.driver.validate_key(namespace, key)?;
        tracing::trace!("Writing {namespace}/{key}");
        self.driver.set(namespace, key, value).await
    }

    /// Remove the value stored under `key`.
    #[tracing::instrument(skip(self), fields(driver=self.driver.name()))]
    pub async fn delete(&self, namespace: &str, key: &str) -> Result<bool, StorageError> {
        self.driver.validate_key(namespace, key)?;
        self.driver.delete(namespace, key).await
    }

    /// List every entry in a namespace, sorted by key.
    #[tracing::instrument(skip(self), fields(driver=self.driver.name()))]
    pub async fn entries(&self, namespace: &str) -> Result<Vec<Entry>, StorageError> {
        self.driver.entries(namespace).await
    }

    /// List every key in a namespace, sorted.
    #[tracing::instrument(skip(self), fields(driver=self.driver.name()))]
    pub async fn keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
        self.driver.keys(namespace).await
    }
}

/// A storage handle scoped to one namespace.
#[derive(Debug, Clone)]
pub struct StorageNamespace {
    driver: ArcDriver,
    namespace: String,
}

impl StorageNamespace {
    /// The namespace this handle reads and writes.
    pub fn name(&self) -> &str {
        &self.namespace
    }

    /// Fetch the value stored under `key`.
    #[tracing::instrument(skip(self), fields(driver=self.driver.name(), namespace=%self.namespace))]
    pub async fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError> {
        self.driver.validate_key(&self.namespace, key)?;
        self.driver.get(&self.namespace, key).await
    }

    /// Store `value` under `key`.
    #[tracing::instrument(skip(self, value), fields(driver=self.driver.name(), namespace=%self.namespace))]
    pub async fn set(&self, key: &str, value: Bytes) -> Result<(), StorageError> {
        self.driver.validate_key(&self.namespace, key)?;
        tracing::trace!("Writing {}/{key}", self.namespace);
        self.driver.set(&self.namespace, key, value).await
    }

    /// Remove the value stored under `key`.
    #[tracing::instrument(skip(self), fields(driver=self.driver.name(), namespace=%self.namespace))]
    pub async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.driver.validate_key(&self.namespace, key)?;
        self.driver.delete(&self.namespace, key).await
    }

    /// List every entry, sorted by key.
    #[tracing::instrument(skip(self), fields(driver=self.driver.name(), namespace=%self.namespace))]
    pub async fn entries(&self) -> Result<Vec<Entry>, StorageError> {
        self.driver.entries(&self.namespace).await
    }
}
