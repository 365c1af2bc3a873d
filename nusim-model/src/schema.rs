use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::entity::attr;
use crate::naming::idiomatic_name;

/// Pseudo parent type standing for the API root.
///
/// A type that lists `me` in `create_parents` may be created without a
/// parent; listing it in `get_parents` allows unscoped listing.
pub const ROOT_PARENT: &str = "me";

/// Static descriptor of one entity type.
///
/// Field names in `unique_fields`, `mandatory_fields` and `default_fields`
/// use the wire format, exactly as they appear in request payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Singular type name (`domain`), used in containment keys and errors.
    pub rest_name: String,
    /// Plural path segment (`domains`).
    pub resource_name: String,
    /// Wire-format attribute names the type declares.
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub unique_fields: Vec<String>,
    #[serde(default)]
    pub mandatory_fields: Vec<String>,
    #[serde(default)]
    pub default_fields: Map<String, Value>,
    /// Types under which this type may be listed.
    #[serde(default)]
    pub get_parents: BTreeSet<String>,
    /// Types under which this type may be created.
    #[serde(default)]
    pub create_parents: BTreeSet<String>,
    /// Parents that relate to this type by membership instead of ownership.
    #[serde(default)]
    pub member_parents: BTreeSet<String>,

    /// internal name → wire name, rebuilt whenever `attributes` changes.
    #[serde(skip)]
    field_names: BTreeMap<String, String>,
}

impl EntitySchema {
    /// Creates an empty descriptor.
    pub fn new(rest_name: &str, resource_name: &str) -> Self {
        Self {
            rest_name: rest_name.into(),
            resource_name: resource_name.into(),
            attributes: Vec::new(),
            unique_fields: Vec::new(),
            mandatory_fields: Vec::new(),
            default_fields: Map::new(),
            get_parents: BTreeSet::new(),
            create_parents: BTreeSet::new(),
            member_parents: BTreeSet::new(),
            field_names: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attributes<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.attributes.extend(names.into_iter().map(String::from));
        self.index_attributes();
        self
    }

    #[must_use]
    pub fn with_unique<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.unique_fields.extend(names.into_iter().map(String::from));
        self
    }

    #[must_use]
    pub fn with_mandatory<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.mandatory_fields.extend(names.into_iter().map(String::from));
        self
    }

    #[must_use]
    pub fn with_default(mut self, name: &str, value: Value) -> Self {
        self.default_fields.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_get_parents<'a>(mut self, parents: impl IntoIterator<Item = &'a str>) -> Self {
        self.get_parents.extend(parents.into_iter().map(String::from));
        self
    }

    #[must_use]
    pub fn with_create_parents<'a>(mut self, parents: impl IntoIterator<Item = &'a str>) -> Self {
        self.create_parents.extend(parents.into_iter().map(String::from));
        self
    }

    #[must_use]
    pub fn with_member_parents<'a>(mut self, parents: impl IntoIterator<Item = &'a str>) -> Self {
        self.member_parents.extend(parents.into_iter().map(String::from));
        self
    }

    pub(crate) fn index_attributes(&mut self) {
        self.field_names = self
            .attributes
            .iter()
            .map(|wire| (idiomatic_name(wire), wire.clone()))
            .collect();
    }

    /// Whether the type declares the given wire attribute.
    pub fn has_field(&self, wire: &str) -> bool {
        self.field_names.contains_key(&idiomatic_name(wire))
    }

    /// Whether the type declares the given internal attribute.
    pub fn has_internal(&self, internal: &str) -> bool {
        self.field_names.contains_key(internal)
    }

    /// Maps an internal attribute name back to its wire form.
    pub fn wire_name(&self, internal: &str) -> Option<&str> {
        self.field_names.get(internal).map(String::as_str)
    }

    /// Rewrites a request payload under the declared wire spelling of each
    /// key, so validation sees exactly what will be stored.
    ///
    /// Keys resolve through their internal name: `domain_vlanid` and
    /// `DomainVLANID` both become `domainVLANID`. When several spellings of
    /// one attribute are present, the declared spelling wins, otherwise the
    /// first in key order. Undeclared and structural keys are dropped.
    pub fn canonical_payload(&self, payload: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::new();
        for (key, value) in payload {
            let internal = idiomatic_name(key);
            if matches!(internal.as_str(), attr::ID | attr::PARENT_ID | attr::PARENT_TYPE) {
                continue;
            }
            let Some(wire) = self.field_names.get(&internal) else {
                continue;
            };
            if key == wire || !out.contains_key(wire) {
                out.insert(wire.clone(), value.clone());
            }
        }
        out
    }

    /// Normalizes a wire payload into an attribute bag.
    ///
    /// Keys are converted to internal names; keys the type does not declare
    /// and the structural `ID`/`parentID`/`parentType` keys are dropped.
    pub fn normalize_payload(&self, payload: &Map<String, Value>) -> Map<String, Value> {
        payload
            .iter()
            .map(|(key, value)| (idiomatic_name(key), value))
            .filter(|(internal, _)| {
                !matches!(internal.as_str(), attr::ID | attr::PARENT_ID | attr::PARENT_TYPE)
                    && self.has_internal(internal)
            })
            .map(|(internal, value)| (internal, value.clone()))
            .collect()
    }

    /// Whether entities of this type may be created without a parent.
    pub fn allows_root_creation(&self) -> bool {
        self.create_parents.contains(ROOT_PARENT)
    }

    pub fn can_read_under(&self, parent_type: &str) -> bool {
        self.get_parents.contains(parent_type)
    }

    pub fn can_create_under(&self, parent_type: &str) -> bool {
        self.create_parents.contains(parent_type)
    }

    /// Whether listing under `parent_type` means membership, not ownership.
    pub fn is_member_of(&self, parent_type: &str) -> bool {
        self.member_parents.contains(parent_type)
    }
}
