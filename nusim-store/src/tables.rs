use nusim_model::Entity;
use nusim_types::EntityId;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::RootIds;

/// Composite key of a containment index: which parent type holds which
/// child type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainmentKey {
    pub parent_type: String,
    pub child_type: String,
}

impl ContainmentKey {
    pub fn new(parent_type: &str, child_type: &str) -> Self {
        Self {
            parent_type: parent_type.to_string(),
            child_type: child_type.to_string(),
        }
    }
}

impl fmt::Display for ContainmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.parent_type, self.child_type)
    }
}

type Bucket = BTreeSet<EntityId>;

/// The tables guarded by [`crate::EntityStore`]'s lock.
///
/// Ids are UUID v7, so every `BTreeMap`/`BTreeSet` here iterates in
/// creation order.
#[derive(Debug, Default)]
pub struct StoreTables {
    entities: BTreeMap<String, BTreeMap<EntityId, Entity>>,
    containment: BTreeMap<ContainmentKey, BTreeMap<EntityId, Bucket>>,
    pub(crate) roots: Option<RootIds>,
}

impl StoreTables {
    // ── Primary tables ───────────────────────────────────────────

    /// Inserts or overwrites an entity in its type's primary table.
    pub fn put(&mut self, entity: Entity) {
        self.entities
            .entry(entity.entity_type.clone())
            .or_default()
            .insert(entity.id, entity);
    }

    pub fn get(&self, entity_type: &str, id: EntityId) -> Option<&Entity> {
        self.entities.get(entity_type).and_then(|t| t.get(&id))
    }

    pub fn contains(&self, entity_type: &str, id: EntityId) -> bool {
        self.get(entity_type, id).is_some()
    }

    /// Every entity of a type, protected roots included.
    pub fn entities_of_type<'a>(&'a self, entity_type: &str) -> impl Iterator<Item = &'a Entity> + use<'a> {
        self.entities
            .get(entity_type)
            .into_iter()
            .flat_map(|t| t.values())
    }

    /// Entities of a type as an unscoped listing sees them: the root
    /// enterprise is hidden.
    pub fn all_of_type<'a>(&'a self, entity_type: &str) -> impl Iterator<Item = &'a Entity> + use<'a> {
        let hidden = self.roots.map(|r| r.enterprise);
        self.entities_of_type(entity_type)
            .filter(move |e| Some(e.id) != hidden)
    }

    pub fn count(&self, entity_type: &str) -> usize {
        self.entities.get(entity_type).map_or(0, BTreeMap::len)
    }

    /// Removes an entity from its primary table only.
    pub fn remove(&mut self, entity_type: &str, id: EntityId) -> Option<Entity> {
        self.entities.get_mut(entity_type).and_then(|t| t.remove(&id))
    }

    // ── Containment index ────────────────────────────────────────

    /// Entities registered under `parent_id` for the given relation.
    pub fn children_of<'a>(
        &'a self,
        key: &ContainmentKey,
        parent_id: EntityId,
    ) -> impl Iterator<Item = &'a Entity> + use<'a> {
        let child_type = key.child_type.clone();
        self.child_ids(key, parent_id)
            .into_iter()
            .filter_map(move |id| self.get(&child_type, id))
    }

    /// Ids registered under `parent_id` for the given relation.
    pub fn child_ids(&self, key: &ContainmentKey, parent_id: EntityId) -> Vec<EntityId> {
        self.containment
            .get(key)
            .and_then(|buckets| buckets.get(&parent_id))
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Registers `child_id` under `parent_id`, creating the bucket if absent.
    pub fn index_child(&mut self, key: ContainmentKey, parent_id: EntityId, child_id: EntityId) {
        self.containment
            .entry(key)
            .or_default()
            .entry(parent_id)
            .or_default()
            .insert(child_id);
    }

    /// Replaces a parent's bucket with exactly the given ids.
    pub fn replace_children(
        &mut self,
        key: ContainmentKey,
        parent_id: EntityId,
        child_ids: impl IntoIterator<Item = EntityId>,
    ) {
        self.containment
            .entry(key)
            .or_default()
            .insert(parent_id, child_ids.into_iter().collect());
    }

    /// Drops the bucket keyed by `parent_id`.
    pub fn drop_bucket(&mut self, key: &ContainmentKey, parent_id: EntityId) {
        if let Some(buckets) = self.containment.get_mut(key) {
            buckets.remove(&parent_id);
        }
    }

    /// Removes `child_id` from every bucket of the relation.
    pub fn unindex_child(&mut self, key: &ContainmentKey, child_id: EntityId) {
        if let Some(buckets) = self.containment.get_mut(key) {
            for bucket in buckets.values_mut() {
                bucket.remove(&child_id);
            }
        }
    }

    /// Relations in which `entity_type` is the parent.
    pub fn keys_with_parent(&self, entity_type: &str) -> Vec<ContainmentKey> {
        self.containment
            .keys()
            .filter(|k| k.parent_type == entity_type)
            .cloned()
            .collect()
    }

    /// Relations in which `entity_type` is the child.
    pub fn keys_with_child(&self, entity_type: &str) -> Vec<ContainmentKey> {
        self.containment
            .keys()
            .filter(|k| k.child_type == entity_type)
            .cloned()
            .collect()
    }

    pub fn root_ids(&self) -> Option<RootIds> {
        self.roots
    }

    /// Whether `id` is one of the two protected root entities.
    pub fn is_protected(&self, id: EntityId) -> bool {
        self.roots
            .is_some_and(|r| r.enterprise == id || r.user == id)
    }
}
