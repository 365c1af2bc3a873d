//! List queries: parent scope, filter, ordering and the single-item stop.

use nusim_model::Entity;
use serde_json::Value;
use std::cmp::Ordering;

use crate::{ApiError, ApiResult, FilterExpr, RequestHeaders};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// `X-Nuage-OrderBy`: one attribute, optionally followed by `ASC`/`DESC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Wire-format attribute name.
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn parse(expr: &str) -> ApiResult<Self> {
        let mut parts = expr.split_whitespace();
        let field = parts
            .next()
            .ok_or_else(|| ApiError::BadRequest(format!("empty order-by `{expr}`")))?;
        let direction = match parts.next().map(str::to_ascii_uppercase).as_deref() {
            None | Some("ASC") => SortDirection::Ascending,
            Some("DESC") => SortDirection::Descending,
            Some(other) => {
                return Err(ApiError::BadRequest(format!(
                    "unknown sort direction `{other}`"
                )));
            }
        };
        if parts.next().is_some() {
            return Err(ApiError::BadRequest(format!("malformed order-by `{expr}`")));
        }
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }

    /// Orders two entities by the attribute. Unset values sort first.
    pub fn compare(&self, a: &Entity, b: &Entity) -> Ordering {
        let ord = compare_values(
            a.wire_attribute(&self.field).as_ref(),
            b.wire_attribute(&self.field).as_ref(),
        );
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Which parent a listing is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentScope {
    pub parent_type: String,
    pub parent_id: String,
}

/// A list request against one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub entity_type: String,
    pub parent: Option<ParentScope>,
    pub filter: Option<FilterExpr>,
    pub order_by: Option<OrderBy>,
    /// Stop at the first match. Paging never changes the result otherwise.
    pub first_only: bool,
}

impl ListQuery {
    /// Lists every entity of a type.
    pub fn new(entity_type: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            parent: None,
            filter: None,
            order_by: None,
            first_only: false,
        }
    }

    /// Scopes the listing to the children of one parent.
    #[must_use]
    pub fn under(mut self, parent_type: &str, parent_id: &str) -> Self {
        self.parent = Some(ParentScope {
            parent_type: parent_type.to_string(),
            parent_id: parent_id.to_string(),
        });
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    #[must_use]
    pub fn with_first_only(mut self) -> Self {
        self.first_only = true;
        self
    }

    /// Applies filter, ordering and paging headers.
    ///
    /// Paging only matters for `page=0, pageSize=1`, which asks for the
    /// first match alone; any other combination returns every match.
    pub fn with_headers(mut self, headers: &RequestHeaders) -> ApiResult<Self> {
        self.filter = headers.filter_expr()?;
        self.order_by = match headers.order_by.as_deref().map(str::trim) {
            Some(expr) if !expr.is_empty() => Some(OrderBy::parse(expr)?),
            _ => None,
        };
        self.first_only = headers.single_item();
        Ok(self)
    }

    /// Whether an entity passes the filter.
    pub fn accepts(&self, entity: &Entity) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(entity))
    }

    /// How many matches to return.
    pub fn limit(&self) -> usize {
        if self.first_only {
            1
        } else {
            usize::MAX
        }
    }
}

/// Wire-shaped list result.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult {
    pub items: Vec<Value>,
}

impl ListResult {
    /// Number of returned entities, reported as `X-Nuage-Count`.
    pub fn count(&self) -> usize {
        self.items.len()
    }
}
