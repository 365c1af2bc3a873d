use nusim_types::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::naming::idiomatic_name;
use crate::EntitySchema;

/// Internal names of the bookkeeping attributes the engine maintains.
///
/// They are only written when the entity's schema declares the matching
/// wire attribute.
pub mod attr {
    pub const OWNER: &str = "owner";
    pub const CREATION_DATE: &str = "creation_date";
    pub const LAST_UPDATED_BY: &str = "last_updated_by";
    pub const LAST_UPDATED_DATE: &str = "last_updated_date";
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const DICTIONARY_VERSION: &str = "dictionary_version";

    /// Attributes every entity carries outside its attribute bag.
    pub const ID: &str = "id";
    pub const PARENT_ID: &str = "parent_id";
    pub const PARENT_TYPE: &str = "parent_type";

    /// Wire names for the structural attributes.
    pub const WIRE_ID: &str = "ID";
    pub const WIRE_PARENT_ID: &str = "parentID";
    pub const WIRE_PARENT_TYPE: &str = "parentType";
}

/// An object stored by the resource engine.
///
/// `data` holds attributes under their internal (snake_case) names. The id
/// and parent back-reference live outside the bag so they cannot be
/// overwritten by a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_type: Option<String>,
    pub data: Map<String, Value>,
}

impl Entity {
    /// Creates a root-level entity with a fresh id.
    pub fn new(entity_type: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: EntityId::new(),
            entity_type: entity_type.into(),
            parent_id: None,
            parent_type: None,
            data,
        }
    }

    /// Records the containing parent.
    #[must_use]
    pub fn with_parent(mut self, parent_type: impl Into<String>, parent_id: EntityId) -> Self {
        self.parent_type = Some(parent_type.into());
        self.parent_id = Some(parent_id);
        self
    }

    /// Returns the containing parent, if the entity was created under one.
    pub fn parent(&self) -> Option<(&str, EntityId)> {
        match (&self.parent_type, self.parent_id) {
            (Some(parent_type), Some(parent_id)) => Some((parent_type.as_str(), parent_id)),
            _ => None,
        }
    }

    /// Looks up an attribute by internal name. `id`, `parent_id` and
    /// `parent_type` resolve to the structural fields.
    pub fn attribute(&self, internal: &str) -> Option<Value> {
        match internal {
            attr::ID => Some(Value::String(self.id.to_string())),
            attr::PARENT_ID => self.parent_id.map(|id| Value::String(id.to_string())),
            attr::PARENT_TYPE => self.parent_type.clone().map(Value::String),
            _ => self.data.get(internal).cloned(),
        }
    }

    /// Looks up an attribute by its wire-format name.
    pub fn wire_attribute(&self, wire: &str) -> Option<Value> {
        self.attribute(&idiomatic_name(wire))
    }

    /// Renders the entity in wire format: the structural attributes plus
    /// every attribute the schema declares, `null` when unset.
    pub fn to_wire(&self, schema: &EntitySchema) -> Value {
        let mut out = Map::new();
        out.insert(attr::WIRE_ID.into(), Value::String(self.id.to_string()));
        out.insert(
            attr::WIRE_PARENT_ID.into(),
            self.parent_id
                .map_or(Value::Null, |id| Value::String(id.to_string())),
        );
        out.insert(
            attr::WIRE_PARENT_TYPE.into(),
            self.parent_type.clone().map_or(Value::Null, Value::String),
        );
        for wire in &schema.attributes {
            if out.contains_key(wire.as_str()) {
                continue;
            }
            let value = self
                .data
                .get(&idiomatic_name(wire))
                .cloned()
                .unwrap_or(Value::Null);
            out.insert(wire.clone(), value);
        }
        Value::Object(out)
    }
}
