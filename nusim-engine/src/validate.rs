//! Request validation.
//!
//! Every check reads the store through a guard the caller already holds, so
//! validation and the mutation that follows see the same state.

use nusim_model::{naming::idiomatic_name, EntitySchema};
use nusim_store::StoreTables;
use nusim_types::EntityId;
use serde_json::{Map, Value};

use crate::{ApiError, ApiResult};

/// Whether a payload value counts as set: not null, `false`, zero, or an
/// empty string, array or object.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Every mandatory field must be present and truthy.
pub fn check_mandatory(schema: &EntitySchema, payload: &Map<String, Value>) -> ApiResult<()> {
    match schema
        .mandatory_fields
        .iter()
        .find(|field| !payload.get(*field).is_some_and(is_truthy))
    {
        Some(field) => Err(ApiError::MandatoryField {
            property: field.clone(),
        }),
        None => Ok(()),
    }
}

/// Which write a uniqueness check guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueScope {
    /// Any existing match is a duplicate.
    Create,
    /// A single match is allowed when it is the entity being updated, so a
    /// client can PUT an unchanged object back.
    Update(EntityId),
}

/// No other entity of the type may hold the same value in a unique field.
///
/// This scans every entity of the type per unique field.
pub fn check_unique(
    schema: &EntitySchema,
    tables: &StoreTables,
    payload: &Map<String, Value>,
    scope: UniqueScope,
) -> ApiResult<()> {
    for field in &schema.unique_fields {
        let Some(value) = payload.get(field).filter(|v| is_truthy(v)) else {
            continue;
        };
        let internal = idiomatic_name(field);
        let matches: Vec<EntityId> = tables
            .entities_of_type(&schema.rest_name)
            .filter(|e| e.attribute(&internal).as_ref() == Some(value))
            .map(|e| e.id)
            .collect();

        let duplicate = match (scope, matches.as_slice()) {
            (_, []) => false,
            (UniqueScope::Update(id), [only]) => *only != id,
            _ => true,
        };
        if duplicate {
            return Err(ApiError::DuplicateField {
                entity_type: schema.rest_name.clone(),
                field: field.clone(),
                value: display_value(value),
            });
        }
    }
    Ok(())
}

/// Listing (or membership replace) under a parent: the type must accept the
/// parent for reads and the parent must exist.
pub fn check_read_parent(
    schema: &EntitySchema,
    tables: &StoreTables,
    parent_type: &str,
    parent_id: &str,
) -> ApiResult<EntityId> {
    if !schema.can_read_under(parent_type) {
        return Err(ApiError::invalid_parent(format!(
            "Invalid get parent type {parent_type} for a {}",
            schema.rest_name
        )));
    }
    existing_parent(tables, parent_type, parent_id)
}

/// Creation under a parent: the type must accept the parent for creation
/// and the parent must exist.
pub fn check_create_parent(
    schema: &EntitySchema,
    tables: &StoreTables,
    parent_type: &str,
    parent_id: &str,
) -> ApiResult<EntityId> {
    if !schema.can_create_under(parent_type) {
        return Err(ApiError::invalid_parent(format!(
            "Invalid post parent type {parent_type} for a {}",
            schema.rest_name
        )));
    }
    existing_parent(tables, parent_type, parent_id)
}

/// Creation without a parent requires `me` among the create parents.
pub fn check_root_creation(schema: &EntitySchema) -> ApiResult<()> {
    if schema.allows_root_creation() {
        Ok(())
    } else {
        Err(ApiError::invalid_parent(format!(
            "Entity {} can not be created on the root level",
            schema.rest_name
        )))
    }
}

fn existing_parent(tables: &StoreTables, parent_type: &str, parent_id: &str) -> ApiResult<EntityId> {
    EntityId::parse(parent_id)
        .ok()
        .filter(|id| tables.contains(parent_type, *id))
        .ok_or_else(|| {
            ApiError::invalid_parent(format!(
                "Parent {parent_type} with ID {parent_id} does not exist"
            ))
        })
}

/// Strings render bare, everything else as JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
