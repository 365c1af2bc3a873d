//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
///
/// Lookups never fail; a missing id or type is an empty result. Only
/// bootstrapping can go wrong.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The schema table lacks a type the root entities need.
    #[error("schema table has no `{0}` type")]
    MissingRootType(String),

    /// Root entities were already created for this store.
    #[error("store already bootstrapped")]
    AlreadyBootstrapped,
}
