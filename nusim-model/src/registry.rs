use serde::Deserialize;
use std::collections::BTreeMap;

use crate::{EntitySchema, ModelError, ModelResult, ROOT_PARENT};

const BUILTIN_TABLE: &str = include_str!("../data/schemas.json");

#[derive(Deserialize)]
struct SchemaTable {
    schemas: Vec<EntitySchema>,
}

/// Immutable table of entity descriptors.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, EntitySchema>,
    /// resource (plural) name → rest name
    resources: BTreeMap<String, String>,
}

impl SchemaRegistry {
    /// Builds a registry, checking the table for internal consistency.
    pub fn new(schemas: impl IntoIterator<Item = EntitySchema>) -> ModelResult<Self> {
        let mut registry = Self::default();
        for mut schema in schemas {
            schema.index_attributes();
            if registry.schemas.contains_key(&schema.rest_name) {
                return Err(ModelError::DuplicateType(schema.rest_name));
            }
            if registry.resources.contains_key(&schema.resource_name) {
                return Err(ModelError::DuplicateResource(schema.resource_name));
            }
            registry
                .resources
                .insert(schema.resource_name.clone(), schema.rest_name.clone());
            registry.schemas.insert(schema.rest_name.clone(), schema);
        }
        registry.check()?;
        Ok(registry)
    }

    /// Loads a registry from a JSON table of the form `{"schemas": [...]}`.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        let table: SchemaTable = serde_json::from_str(json)?;
        Self::new(table.schemas)
    }

    /// Loads the table compiled into the crate.
    pub fn builtin() -> ModelResult<Self> {
        Self::from_json(BUILTIN_TABLE)
    }

    fn check(&self) -> ModelResult<()> {
        for schema in self.iter() {
            let parents = schema
                .get_parents
                .iter()
                .chain(&schema.create_parents)
                .chain(&schema.member_parents);
            for parent in parents {
                if parent != ROOT_PARENT && !self.schemas.contains_key(parent) {
                    return Err(ModelError::UnknownParent {
                        entity_type: schema.rest_name.clone(),
                        parent: parent.clone(),
                    });
                }
            }

            if let Some(parent) = schema
                .member_parents
                .iter()
                .find(|p| !schema.get_parents.contains(*p))
            {
                return Err(ModelError::UnreadableMemberParent {
                    entity_type: schema.rest_name.clone(),
                    parent: parent.clone(),
                });
            }

            let fields = schema
                .unique_fields
                .iter()
                .chain(&schema.mandatory_fields)
                .chain(schema.default_fields.keys());
            for field in fields {
                if !schema.has_field(field) {
                    return Err(ModelError::UndeclaredField {
                        entity_type: schema.rest_name.clone(),
                        field: field.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Looks up a descriptor by rest name.
    pub fn get(&self, rest_name: &str) -> Option<&EntitySchema> {
        self.schemas.get(rest_name)
    }

    /// Like [`get`](Self::get) but reports unknown types as an error.
    pub fn schema(&self, rest_name: &str) -> ModelResult<&EntitySchema> {
        self.get(rest_name)
            .ok_or_else(|| ModelError::UnknownType(rest_name.to_string()))
    }

    /// Resolves a plural path segment (`domains`) to its descriptor.
    pub fn resolve_resource(&self, resource_name: &str) -> Option<&EntitySchema> {
        self.resources
            .get(resource_name)
            .and_then(|rest_name| self.schemas.get(rest_name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntitySchema> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
