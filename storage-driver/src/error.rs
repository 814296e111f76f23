use std::error::Error as StdError;
use std::fmt;
use std::io;

use tracing_error::SpanTrace;

/// What went wrong in a storage driver, independent of the backend.
///
/// Callers use the kind to decide how to respond. In particular, a store that
/// cannot be reached must never be reported to end users as "the key is taken".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// The namespace or key does not exist.
    NotFound,

    /// The driver may not touch the backing resource.
    PermissionDenied,

    /// Disk or network I/O failed.
    Io,

    /// The backing store cannot be reached right now.
    ServiceUnavailable,

    /// The request can never succeed, e.g. an empty key.
    InvalidRequest,

    /// A stored value could not be encoded or decoded.
    SerializationError,

    /// Anything else.
    Other,
}

impl StorageErrorKind {
    /// Whether the same request may succeed later without any change.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageErrorKind::ServiceUnavailable | StorageErrorKind::Io
        )
    }

    /// Pick the kind that matches an I/O error.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            io::ErrorKind::InvalidInput => StorageErrorKind::InvalidRequest,
            io::ErrorKind::InvalidData => StorageErrorKind::SerializationError,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::TimedOut => StorageErrorKind::ServiceUnavailable,
            _ => StorageErrorKind::Io,
        }
    }
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageErrorKind::NotFound => "not found",
            StorageErrorKind::PermissionDenied => "permission denied",
            StorageErrorKind::Io => "I/O error",
            StorageErrorKind::ServiceUnavailable => "service unavailable",
            StorageErrorKind::InvalidRequest => "invalid request",
            StorageErrorKind::SerializationError => "serialization error",
            StorageErrorKind::Other => "other error",
        })
    }
}

/// Error from a storage driver: a kind, where it happened, and the span
/// context active when it was raised.
///
/// ```rust
/// use storage_driver::{StorageError, StorageErrorKind};
///
/// let error = StorageError::builder("memory", StorageErrorKind::InvalidRequest, "empty key")
///     .namespace("tickers")
///     .build();
///
/// assert_eq!(error.kind(), StorageErrorKind::InvalidRequest);
/// assert!(!error.kind().is_retryable());
/// ```
#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    engine: &'static str,
    namespace: Option<String>,
    key: Option<String>,
    context: Option<String>,
    source: Box<dyn StdError + Send + Sync + 'static>,
    span_trace: Box<SpanTrace>,
}

impl StdError for StorageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

impl StorageError {
    /// An error from `engine` with no namespace or key attached.
    pub fn new<E>(engine: &'static str, kind: StorageErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self::builder(engine, kind, error).build()
    }

    /// Start an error from `engine`, to be given namespace, key or context.
    pub fn builder<E>(engine: &'static str, kind: StorageErrorKind, error: E) -> StorageErrorBuilder
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        StorageErrorBuilder {
            error: StorageError {
                kind,
                engine,
                namespace: None,
                key: None,
                context: None,
                source: error.into(),
                span_trace: Box::new(SpanTrace::capture()),
            },
        }
    }

    /// A converter for `map_err` which tags any error with `engine` and `kind`.
    pub fn with<E>(
        engine: &'static str,
        kind: StorageErrorKind,
    ) -> Box<dyn FnOnce(E) -> StorageError + Send + Sync>
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Box::new(move |error: E| StorageError::new(engine, kind, error))
    }

    /// What went wrong.
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// The driver which raised the error.
    pub fn engine(&self) -> &'static str {
        self.engine
    }

    /// The namespace involved, if known.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The key involved, if known.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The operation being attempted, if recorded.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Spans active when the error was raised.
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Storage error [{}] from {}", self.kind, self.engine)?;

        if let Some(namespace) = &self.namespace {
            write!(f, " (namespace: {namespace})")?;
        }

        if let Some(key) = &self.key {
            write!(f, " (key: {key})")?;
        }

        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }

        write!(f, ": {}", self.source)
    }
}

/// Adds namespace, key and context to a [`StorageError`].
#[derive(Debug)]
pub struct StorageErrorBuilder {
    error: StorageError,
}

impl StorageErrorBuilder {
    /// Record the namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.error.namespace = Some(namespace.into());
        self
    }

    /// Record the key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.error.key = Some(key.into());
        self
    }

    /// Record what was being attempted.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.error.context = Some(context.into());
        self
    }

    /// Finish the error.
    pub fn build(self) -> StorageError {
        self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(StorageError: Send, Sync, StdError);

    #[test]
    fn display_includes_context() {
        let err = StorageError::builder(
            "memory",
            StorageErrorKind::ServiceUnavailable,
            "connection dropped",
        )
        .namespace("tickers")
        .key("PEPE")
        .context("get")
        .build();

        assert_eq!(
            err.to_string(),
            "Storage error [service unavailable] from memory (namespace: tickers) (key: PEPE) (get): connection dropped"
        );
        assert_eq!(err.context(), Some("get"));
    }

    #[test]
    fn retryable_kinds() {
        assert!(StorageErrorKind::ServiceUnavailable.is_retryable());
        assert!(StorageErrorKind::Io.is_retryable());
        assert!(!StorageErrorKind::InvalidRequest.is_retryable());
        assert!(!StorageErrorKind::PermissionDenied.is_retryable());
        assert!(!StorageErrorKind::SerializationError.is_retryable());
    }

    #[test]
    fn io_kind_mapping() {
        let kind = |kind| StorageErrorKind::from_io(&io::Error::from(kind));
        assert_eq!(kind(io::ErrorKind::NotFound), StorageErrorKind::NotFound);
        assert_eq!(kind(io::ErrorKind::TimedOut), StorageErrorKind::ServiceUnavailable);
        assert_eq!(
            StorageErrorKind::from_io(&io::Error::other("disk on fire")),
            StorageErrorKind::Io
        );
    }

    #[test]
    fn with_closure() {
        let result: Result<(), StorageError> =
            Err("boom").map_err(StorageError::with("memory", StorageErrorKind::Other));
        let err = result.unwrap_err();
        assert_eq!(err.engine(), "memory");
        assert_eq!(err.kind(), StorageErrorKind::Other);
        assert!(err.namespace().is_none());
    }
}
