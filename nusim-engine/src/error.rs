//! Error types for the resource engine.

use nusim_model::ModelError;
use nusim_store::StorageError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Result type for request-level operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for engine construction.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while setting up an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("schema error: {0}")]
    Model(#[from] ModelError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The configured customer id range is empty.
    #[error("invalid customer id range {min}..={max}")]
    CustomerIdRange { min: u32, max: u32 },
}

/// One of the two entities that refuse deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectedRoot {
    User,
    Enterprise,
}

impl ProtectedRoot {
    pub fn internal_error_code(self) -> u32 {
        match self {
            Self::User => 2013,
            Self::Enterprise => 2010,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::User => "System user cannot be deleted",
            Self::Enterprise => "System enterprise cannot be deleted",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::User => "System user cannot be deleted.",
            Self::Enterprise => "System enterprise cannot be deleted.",
        }
    }
}

/// A rejected request.
///
/// All variants are detected before the store is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// An id (entity, member) does not exist.
    #[error("Unable to find entity with field {field} and value {value}")]
    NotFound { field: String, value: String },

    /// A path segment or type name the registry does not know.
    #[error("Unknown resource {0}")]
    UnknownResource(String),

    /// Code 5001.
    #[error("{property}: This value cannot be null")]
    MandatoryField { property: String },

    /// Code 9501.
    #[error("Another {entity_type} with the same {field} = {value} exists.")]
    DuplicateField {
        entity_type: String,
        field: String,
        value: String,
    },

    /// Wrong parent type, missing parent, or root-level creation refused.
    #[error("{description}")]
    InvalidParent { description: String },

    /// Codes 2013 (user) and 2010 (enterprise).
    #[error("{}", .0.description())]
    ProtectedEntity(ProtectedRoot),

    #[error("Invalid filter expression: {0}")]
    InvalidFilter(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },
}

impl ApiError {
    pub(crate) fn not_found_id(value: impl ToString) -> Self {
        Self::NotFound {
            field: "id".into(),
            value: value.to_string(),
        }
    }

    pub(crate) fn invalid_parent(description: impl Into<String>) -> Self {
        Self::InvalidParent {
            description: description.into(),
        }
    }

    /// HTTP-equivalent status code.
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound { .. } | Self::UnknownResource(_) => 404,
            Self::MandatoryField { .. }
            | Self::DuplicateField { .. }
            | Self::InvalidParent { .. }
            | Self::ProtectedEntity(_) => 409,
            Self::InvalidFilter(_) | Self::BadRequest(_) => 400,
            Self::MethodNotAllowed { .. } => 405,
        }
    }

    /// Machine-readable controller error code, when the controller has one.
    pub fn internal_error_code(&self) -> Option<u32> {
        match self {
            Self::MandatoryField { .. } => Some(5001),
            Self::DuplicateField { .. } => Some(9501),
            Self::ProtectedEntity(root) => Some(root.internal_error_code()),
            _ => None,
        }
    }

    /// The structured body for conflict errors, `None` for the rest.
    pub fn error_body(&self) -> Option<ErrorBody> {
        let (property, description, title) = match self {
            Self::MandatoryField { property } => (
                property.clone(),
                "This value cannot be null".to_string(),
                "Invalid input. Value cannot be null",
            ),
            Self::DuplicateField { field, .. } => (
                field.clone(),
                self.to_string(),
                "Cannot create duplicate entity.",
            ),
            Self::InvalidParent { description } => {
                (String::new(), description.clone(), "Invalid parent")
            }
            Self::ProtectedEntity(root) => {
                (String::new(), root.description().to_string(), root.title())
            }
            _ => return None,
        };
        Some(ErrorBody {
            errors: vec![ErrorEntry {
                property,
                descriptions: vec![ErrorDescription {
                    description,
                    title: title.to_string(),
                }],
            }],
            internal_error_code: self.internal_error_code(),
        })
    }

    /// The JSON body returned to the caller.
    pub fn body(&self) -> Value {
        match self.error_body() {
            Some(body) => json!(body),
            None => json!({ "message": self.to_string() }),
        }
    }
}

/// `{ errors: [...], internalErrorCode }` as the controller returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub errors: Vec<ErrorEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_error_code: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub property: String,
    pub descriptions: Vec<ErrorDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDescription {
    pub description: String,
    pub title: String,
}
