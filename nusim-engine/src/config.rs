//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the resource engine.
///
/// Every field has a default matching the simulated controller, so a JSON
/// config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Organization reported when a request carries no `X-Nuage-Organization`.
    pub organization: String,
    /// Path prefix stripped before routing (e.g. `/nuage/api/v5_0`).
    pub api_prefix: String,
    /// Value written to `dictionaryVersion` on create and update.
    pub dictionary_version: u32,
    /// Inclusive lower bound of generated `customerID` values.
    pub customer_id_min: u32,
    /// Inclusive upper bound of generated `customerID` values.
    pub customer_id_max: u32,
    /// Name of the protected root enterprise.
    pub root_enterprise_name: String,
    /// User name of the protected root user.
    pub root_user_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            organization: "csp".to_string(),
            api_prefix: "/nuage/api/v5_0".to_string(),
            dictionary_version: 2,
            customer_id_min: 10_000,
            customer_id_max: 99_999,
            root_enterprise_name: "CSP".to_string(),
            root_user_name: "csproot".to_string(),
        }
    }
}
