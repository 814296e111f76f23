//! Driver interface for namespaced key/value record stores.
//!
//! Backends implement [`Driver`]; callers go through the `storage` crate,
//! which wraps a driver in a cloneable handle.

mod driver;
mod error;

pub use driver::Driver;
pub use driver::Entry;
pub use error::StorageError;
pub use error::StorageErrorBuilder;
pub use error::StorageErrorKind;
