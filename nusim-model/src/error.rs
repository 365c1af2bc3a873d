//! Error types for schema loading.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building or querying a [`crate::SchemaRegistry`].
#[derive(Debug, Error)]
pub enum ModelError {
    /// The schema table is not valid JSON or has the wrong shape.
    #[error("invalid schema table: {0}")]
    Json(#[from] serde_json::Error),

    /// Two descriptors share a rest name.
    #[error("duplicate entity type: {0}")]
    DuplicateType(String),

    /// Two descriptors share a resource (path) name.
    #[error("duplicate resource name: {0}")]
    DuplicateResource(String),

    /// A descriptor names a parent type that is not in the table.
    #[error("entity type {entity_type} names unknown parent {parent}")]
    UnknownParent { entity_type: String, parent: String },

    /// A unique, mandatory or default field is not a declared attribute.
    #[error("entity type {entity_type} references undeclared field {field}")]
    UndeclaredField { entity_type: String, field: String },

    /// A member parent is not also a readable parent.
    #[error("entity type {entity_type} lists member parent {parent} that is not a get parent")]
    UnreadableMemberParent { entity_type: String, parent: String },

    /// Lookup of a type the registry does not know.
    #[error("unknown entity type: {0}")]
    UnknownType(String),
}
