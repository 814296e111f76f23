use std::io;

use bytes::Bytes;
use camino::{Utf8Path, Utf8PathBuf};
use eyre::WrapErr;
use tracing::Instrument;

use storage_driver::{Driver, Entry, StorageError, StorageErrorKind};

/// Directory (inside each namespace) used to stage writes before they are
/// renamed into place.
const STAGING: &str = ".staging";

/// Storage driver which keeps one file per key on the local filesystem.
///
/// Layout: `<root>/<namespace>/<key>`. Writes go to a staging file first and
/// are renamed over the destination, so readers never see a partial value.
#[derive(Debug)]
pub struct LocalDriver {
    root: Utf8PathBuf,
}

impl LocalDriver {
    /// Use `root` as the storage directory. The directory is created lazily.
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    /// Use `root` as the storage directory, creating it now.
    pub async fn create(root: Utf8PathBuf) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(&root).await.map_err(|err| {
            StorageError::builder("local", StorageErrorKind::from_io(&err), err)
                .context(format!("create storage root {root}"))
                .build()
        })?;
        Ok(Self::new(root))
    }

    fn namespace_dir(&self, namespace: &str) -> Utf8PathBuf {
        self.root.join(namespace)
    }

    fn path(&self, namespace: &str, key: &str) -> Utf8PathBuf {
        self.namespace_dir(namespace).join(key)
    }

    fn io_error(
        &self,
        namespace: &str,
        key: &str,
        context: &'static str,
    ) -> impl FnOnce(io::Error) -> StorageError {
        let engine = self.name();
        let namespace = namespace.to_string();
        let key = key.to_string();
        move |err| {
            StorageError::builder(engine, StorageErrorKind::from_io(&err), err)
                .namespace(namespace)
                .key(key)
                .context(context)
                .build()
        }
    }

    fn check_local_key(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        if key.starts_with('.') {
            return Err(StorageError::builder(
                self.name(),
                StorageErrorKind::InvalidRequest,
                "local keys must not start with '.'",
            )
            .namespace(namespace)
            .key(key)
            .build());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Driver for LocalDriver {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Bytes>, StorageError> {
        self.check_local_key(namespace, key)?;
        match tokio::fs::read(self.path(namespace, key)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err((self.io_error(namespace, key, "read value"))(err)),
        }
    }

    async fn set(&self, namespace: &str, key: &str, value: Bytes) -> Result<(), StorageError> {
        self.check_local_key(namespace, key)?;
        let staging = self.namespace_dir(namespace).join(STAGING);

        tokio::fs::create_dir_all(&staging)
            .await
            .map_err(self.io_error(namespace, key, "create namespace directory"))?;

        let staged = staging.join(key);
        tokio::fs::write(&staged, &value)
            .await
            .map_err(self.io_error(namespace, key, "write staged value"))?;

        tokio::fs::rename(&staged, self.path(namespace, key))
            .await
            .map_err(self.io_error(namespace, key, "move staged value into place"))?;
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<bool, StorageError> {
        self.check_local_key(namespace, key)?;
        match tokio::fs::remove_file(self.path(namespace, key)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err((self.io_error(namespace, key, "remove value"))(err)),
        }
    }

    async fn entries(&self, namespace: &str) -> Result<Vec<Entry>, StorageError> {
        let dir = self.namespace_dir(namespace);

        let entries = tokio::task::spawn_blocking(move || collect_entries(&dir))
            .in_current_span()
            .await
            .wrap_err("local driver")
            .map_err(StorageError::with(self.name(), StorageErrorKind::Other))?
            .map_err(|err| {
                StorageError::builder(self.name(), StorageErrorKind::Io, err)
                    .namespace(namespace)
                    .context("list namespace")
                    .build()
            })?;

        tracing::debug!("Found {} entries", entries.len());
        Ok(entries)
    }
}

#[tracing::instrument]
fn collect_entries(dir: &Utf8Path) -> eyre::Result<Vec<Entry>> {
    let reader = match dir.read_dir_utf8() {
        Ok(reader) => reader,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err).wrap_err_with(|| format!("read directory {dir}")),
    };

    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry?;
        if !entry.file_type()?.is_file() || entry.file_name().starts_with('.') {
            continue;
        }

        let data = std::fs::read(entry.path())
            .wrap_err_with(|| format!("read value {}", entry.path()))?;
        entries.push((entry.file_name().to_string(), Bytes::from(data)));
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).unwrap();
        (dir, root)
    }

    #[tokio::test]
    async fn roundtrip_on_disk() {
        let (_dir, root) = tempdir();
        let driver = LocalDriver::create(root.join("store")).await.unwrap();

        assert_eq!(driver.get("tickers", "ABC").await.unwrap(), None);
        assert!(driver.entries("tickers").await.unwrap().is_empty());

        driver
            .set("tickers", "ABC", Bytes::from_static(b"abc"))
            .await
            .unwrap();
        driver
            .set("tickers", "AAA", Bytes::from_static(b"aaa"))
            .await
            .unwrap();

        assert!(root.join("store/tickers/ABC").is_file());
        assert_eq!(
            driver.keys("tickers").await.unwrap(),
            vec!["AAA".to_string(), "ABC".to_string()]
        );

        assert!(driver.delete("tickers", "ABC").await.unwrap());
        assert!(!driver.delete("tickers", "ABC").await.unwrap());
        assert_eq!(driver.keys("tickers").await.unwrap(), vec!["AAA"]);
    }

    #[tokio::test]
    async fn survives_reopen() {
        let (_dir, root) = tempdir();

        LocalDriver::new(root.clone())
            .set("tickers", "MOON", Bytes::from_static(b"moon"))
            .await
            .unwrap();

        let reopened = LocalDriver::new(root);
        assert_eq!(
            reopened.get("tickers", "MOON").await.unwrap(),
            Some(Bytes::from_static(b"moon"))
        );
    }

    #[tokio::test]
    async fn dotted_keys_are_rejected() {
        let (_dir, root) = tempdir();
        let driver = LocalDriver::new(root);

        let err = driver
            .set("tickers", ".staging", Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::InvalidRequest);
    }
}
