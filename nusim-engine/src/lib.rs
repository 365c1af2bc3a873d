//! Resource engine for the NUSim controller simulator.
//!
//! The engine is a pure in-memory service. It validates requests against a
//! [`SchemaRegistry`](nusim_model::SchemaRegistry), mutates an
//! [`EntityStore`](nusim_store::EntityStore) and shapes results the way the
//! controller's REST API does.
//!
//! - [`ResourceEngine`]: list/get, create, update, membership replace, delete
//! - [`validate`]: mandatory, uniqueness and parent legality checks
//! - [`FilterExpr`]: the single-clause `field == "value"` filter
//! - [`RequestHeaders`]: `X-Nuage-*` request/response metadata
//! - [`Router`]: maps REST-style requests onto engine operations
//!
//! Every rejection is an [`ApiError`] carrying the status and structured
//! body the controller would answer with.

mod config;
mod engine;
mod error;
mod filter;
mod headers;
mod query;
mod router;
pub mod validate;

pub use config::EngineConfig;
pub use engine::ResourceEngine;
pub use error::{
    ApiError, ApiResult, EngineError, EngineResult, ErrorBody, ErrorDescription, ErrorEntry,
    ProtectedRoot,
};
pub use filter::FilterExpr;
pub use headers::{names as header_names, RequestHeaders};
pub use query::{ListQuery, ListResult, OrderBy, ParentScope, SortDirection};
pub use router::{Method, Request, Response, Router};
