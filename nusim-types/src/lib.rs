//! Core type definitions for the NUSim resource engine.
//!
//! This crate defines the small, schema-agnostic types shared by the
//! model, store and engine crates:
//! - Entity identifiers (UUID v7, time-ordered)
//! - Millisecond wall-clock timestamps used by bookkeeping attributes
//!
//! Everything that depends on an entity type's shape belongs in
//! `nusim-model`, not here.

mod ids;
mod timestamp;

pub use ids::EntityId;
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
