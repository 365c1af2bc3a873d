//! Entity and schema model for the NUSim resource engine.
//!
//! Defines the types every other layer depends on:
//! - [`Entity`]: a stored object (id, type, optional parent, attribute bag)
//! - [`EntitySchema`]: an entity type's descriptor: declared attributes,
//!   unique/mandatory/default fields and legal parents
//! - [`SchemaRegistry`]: the immutable table of descriptors, keyed by rest
//!   name and resource (path) name
//! - [`naming`]: the wire-format to internal attribute name transform
//!
//! Descriptors are data. The built-in table ships as JSON and is loaded with
//! [`SchemaRegistry::builtin`]; callers may load their own with
//! [`SchemaRegistry::from_json`].

mod entity;
mod error;
pub mod naming;
mod registry;
mod schema;

pub use entity::{attr, Entity};
pub use error::{ModelError, ModelResult};
pub use registry::SchemaRegistry;
pub use schema::{EntitySchema, ROOT_PARENT};
