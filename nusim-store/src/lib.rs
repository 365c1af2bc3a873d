//! In-memory storage layer for the NUSim resource engine.
//!
//! # Architecture
//!
//! - A primary table per entity type maps ids to entities
//! - A containment index keyed by [`ContainmentKey`] records which entities
//!   live under which parent; it holds ids only, the entity itself is owned
//!   by the primary table
//! - Both live in [`StoreTables`] behind a single `RwLock` so a mutation that
//!   touches a primary table and the index is never observed half-done
//! - [`EntityStore::bootstrap`] creates the two protected root entities

mod error;
mod store;
mod tables;

pub use error::{StorageError, StorageResult};
pub use store::{EntityStore, RootIds};
pub use tables::{ContainmentKey, StoreTables};
