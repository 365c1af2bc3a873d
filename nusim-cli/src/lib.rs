//! Loading and replay helpers for the `nusim` binary.

use anyhow::{Context, Result};
use nusim_engine::{EngineConfig, Request, ResourceEngine, Response, Router};
use nusim_model::SchemaRegistry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Reads an [`EngineConfig`] from a JSON file, or the defaults when no path
/// is given. Keys missing from the file keep their defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    info!("Loading config from {:?}", path);
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Reads a schema table from a JSON file, or the built-in table.
pub fn load_registry(path: Option<&Path>) -> Result<SchemaRegistry> {
    match path {
        Some(path) => {
            info!("Loading schemas from {:?}", path);
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read schema file {}", path.display()))?;
            SchemaRegistry::from_json(&text)
                .with_context(|| format!("Invalid schema table {}", path.display()))
        }
        None => SchemaRegistry::builtin().context("Invalid built-in schema table"),
    }
}

/// Reads a request script: a JSON array of requests.
pub fn load_script(path: &Path) -> Result<Vec<Request>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Malformed script {}", path.display()))
}

/// Builds a router over a freshly bootstrapped engine.
pub fn build_router(registry: SchemaRegistry, config: EngineConfig) -> Result<Router> {
    let engine = ResourceEngine::new(Arc::new(registry), config)
        .context("Failed to start resource engine")?;
    Ok(Router::new(Arc::new(engine)))
}

/// One replayed request and the answer it got.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub request: Request,
    pub response: Response,
}

/// Replays requests in order.
///
/// With `stop_on_error`, replay ends after the first non-2xx response, which
/// is still included in the output.
pub fn replay(router: &Router, requests: Vec<Request>, stop_on_error: bool) -> Vec<Exchange> {
    let mut exchanges = Vec::with_capacity(requests.len());
    for request in requests {
        let response = router.handle(&request);
        let failed = !response.is_success();
        exchanges.push(Exchange { request, response });
        if failed && stop_on_error {
            warn!("Stopping replay after failed request {}", exchanges.len());
            break;
        }
    }
    exchanges
}
