//! REST-style routing onto the resource engine.
//!
//! Paths follow the controller's conventions, with resource names in the
//! plural:
//!
//! | Method | Path                          | Operation          |
//! |--------|-------------------------------|--------------------|
//! | GET    | `/{type}`                     | list               |
//! | GET    | `/{type}/{id}`                | fetch              |
//! | GET    | `/{parent}/{parentId}/{type}` | scoped list        |
//! | POST   | `/{type}`                     | root create        |
//! | POST   | `/{parent}/{parentId}/{type}` | scoped create      |
//! | PUT    | `/{type}/{id}`                | update             |
//! | PUT    | `/{parent}/{parentId}/{type}` | membership replace |
//! | DELETE | `/{type}/{id}`                | recursive delete   |
//!
//! No transport is involved; a [`Request`] is plain data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{ApiError, ApiResult, ListQuery, RequestHeaders, ResourceEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A request as the controller would receive it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,
    pub path: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status, response metadata and JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl Response {
    fn ok(status: u16, headers: BTreeMap<String, String>, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    fn no_content() -> Self {
        Self::ok(204, BTreeMap::new(), Value::Null)
    }

    fn error(err: &ApiError) -> Self {
        Self::ok(err.status(), BTreeMap::new(), err.body())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Resolved shape of a request path.
enum Route<'a> {
    Collection {
        entity_type: &'a str,
    },
    Entity {
        entity_type: &'a str,
        id: &'a str,
    },
    Scoped {
        parent_type: &'a str,
        parent_id: &'a str,
        entity_type: &'a str,
    },
}

/// Dispatches [`Request`]s to a shared [`ResourceEngine`].
#[derive(Clone)]
pub struct Router {
    engine: Arc<ResourceEngine>,
}

impl Router {
    pub fn new(engine: Arc<ResourceEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<ResourceEngine> {
        &self.engine
    }

    /// Handles one request. Rejections become error responses; nothing here
    /// panics on bad input.
    pub fn handle(&self, request: &Request) -> Response {
        match self.dispatch(request) {
            Ok(response) => {
                debug!(method = %request.method, path = %request.path, status = response.status, "Handled");
                response
            }
            Err(err) => {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    status = err.status(),
                    "Rejected: {err}"
                );
                Response::error(&err)
            }
        }
    }

    fn dispatch(&self, request: &Request) -> ApiResult<Response> {
        let headers = RequestHeaders::parse(
            request
                .headers
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
            &self.engine.config().organization,
        );
        let route = self.route(&request.path)?;
        let engine = &self.engine;

        match (request.method, route) {
            (Method::Get, Route::Collection { entity_type }) => {
                let query = ListQuery::new(entity_type).with_headers(&headers)?;
                let result = engine.list(&query)?;
                Ok(Response::ok(
                    200,
                    headers.response_headers(result.count()),
                    Value::Array(result.items),
                ))
            }
            (Method::Get, Route::Entity { entity_type, id }) => {
                let entity = engine.get(entity_type, id)?;
                Ok(Response::ok(
                    200,
                    headers.response_headers(1),
                    Value::Array(vec![entity]),
                ))
            }
            (
                Method::Get,
                Route::Scoped {
                    parent_type,
                    parent_id,
                    entity_type,
                },
            ) => {
                let query = ListQuery::new(entity_type)
                    .under(parent_type, parent_id)
                    .with_headers(&headers)?;
                let result = engine.list(&query)?;
                Ok(Response::ok(
                    200,
                    headers.response_headers(result.count()),
                    Value::Array(result.items),
                ))
            }
            (Method::Post, Route::Collection { entity_type }) => {
                let created = engine.create(entity_type, None, body(request)?)?;
                Ok(Response::ok(201, BTreeMap::new(), Value::Array(vec![created])))
            }
            (
                Method::Post,
                Route::Scoped {
                    parent_type,
                    parent_id,
                    entity_type,
                },
            ) => {
                let created =
                    engine.create(entity_type, Some((parent_type, parent_id)), body(request)?)?;
                Ok(Response::ok(201, BTreeMap::new(), Value::Array(vec![created])))
            }
            (Method::Put, Route::Entity { entity_type, id }) => {
                let updated = engine.update(entity_type, id, body(request)?)?;
                Ok(Response::ok(201, BTreeMap::new(), Value::Array(vec![updated])))
            }
            (
                Method::Put,
                Route::Scoped {
                    parent_type,
                    parent_id,
                    entity_type,
                },
            ) => {
                engine.replace_members(entity_type, parent_type, parent_id, body(request)?)?;
                Ok(Response::no_content())
            }
            (Method::Delete, Route::Entity { entity_type, id }) => {
                engine.delete(entity_type, id)?;
                Ok(Response::no_content())
            }
            (method, _) => Err(ApiError::MethodNotAllowed {
                method: method.to_string(),
                path: request.path.clone(),
            }),
        }
    }

    /// Strips the API prefix and resolves plural resource names to rest
    /// names.
    fn route<'a>(&'a self, path: &'a str) -> ApiResult<Route<'a>> {
        let prefix = self.engine.config().api_prefix.trim_end_matches('/');
        let path = match path.strip_prefix(prefix) {
            Some(rest) if !prefix.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
            _ => path,
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            &[resource] => Ok(Route::Collection {
                entity_type: self.resolve(resource)?,
            }),
            &[resource, id] => Ok(Route::Entity {
                entity_type: self.resolve(resource)?,
                id,
            }),
            &[parent, parent_id, resource] => Ok(Route::Scoped {
                parent_type: self.resolve_parent(parent),
                parent_id,
                entity_type: self.resolve(resource)?,
            }),
            _ => Err(ApiError::UnknownResource(path.to_string())),
        }
    }

    fn resolve(&self, resource: &str) -> ApiResult<&str> {
        self.engine
            .registry()
            .resolve_resource(resource)
            .map(|schema| schema.rest_name.as_str())
            .ok_or_else(|| ApiError::UnknownResource(resource.to_string()))
    }

    /// Parent segments never fail routing. An unknown plural falls back to
    /// its singular spelling so the parent checks can name it.
    fn resolve_parent<'a>(&'a self, parent: &'a str) -> &'a str {
        self.resolve(parent)
            .unwrap_or_else(|_| parent.strip_suffix('s').unwrap_or(parent))
    }
}

fn body(request: &Request) -> ApiResult<&Value> {
    request
        .body
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("request body is required".into()))
}
