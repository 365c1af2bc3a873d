//! The `X-Nuage-Filter` expression.
//!
//! The controller's clients only ever send a single equality clause,
//! `field == "value"`, optionally quoting either side. It is parsed once per
//! request into a [`FilterExpr`] and then evaluated against each entity.

use nusim_model::Entity;
use serde_json::Value;
use std::str::FromStr;

use crate::{ApiError, ApiResult};

const QUOTES: [char; 2] = ['"', '\''];

/// A parsed `field == value` comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpr {
    /// Wire-format attribute name.
    pub field: String,
    /// Right-hand side with quotes removed.
    pub value: String,
}

impl FilterExpr {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Parses an expression such as `name == "d1"` or `'FIPUnderlay'==false`.
    pub fn parse(expr: &str) -> ApiResult<Self> {
        let (lhs, rhs) = expr
            .split_once("==")
            .ok_or_else(|| ApiError::InvalidFilter(expr.to_string()))?;

        let field = unquote(lhs.trim());
        if field.is_empty() || !field.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ApiError::InvalidFilter(expr.to_string()));
        }
        let value = unquote(rhs.trim());
        if value.contains("==") {
            return Err(ApiError::InvalidFilter(expr.to_string()));
        }

        Ok(Self::new(field, value))
    }

    /// Whether an entity's attribute equals the filter value.
    ///
    /// Strings compare textually, numbers numerically and booleans against
    /// `true`/`false` (case-insensitive). Missing, null and nested values
    /// never match.
    pub fn matches(&self, entity: &Entity) -> bool {
        match entity.wire_attribute(&self.field) {
            Some(Value::String(s)) => s == self.value,
            Some(Value::Number(n)) => match (n.as_f64(), self.value.parse::<f64>()) {
                (Some(actual), Ok(wanted)) => actual == wanted,
                _ => false,
            },
            Some(Value::Bool(b)) => {
                let wanted = self.value.to_ascii_lowercase();
                (wanted == "true" && b) || (wanted == "false" && !b)
            }
            _ => false,
        }
    }
}

impl FromStr for FilterExpr {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Strips one leading and one trailing quote character.
fn unquote(s: &str) -> &str {
    let s = s.strip_prefix(QUOTES).unwrap_or(s);
    s.strip_suffix(QUOTES).unwrap_or(s)
}
