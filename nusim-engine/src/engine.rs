//! The resource engine: CRUD over the entity store.
//!
//! Each operation takes the store lock once, validates, and only then
//! mutates. A rejected request leaves the store exactly as it found it.

use nusim_model::{attr, Entity, EntitySchema, SchemaRegistry};
use nusim_store::{ContainmentKey, EntityStore, RootIds, StoreTables};
use nusim_types::{EntityId, Timestamp};
use rand::Rng;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::validate::{self, UniqueScope};
use crate::{
    ApiError, ApiResult, EngineConfig, EngineError, EngineResult, ListQuery, ListResult,
    ProtectedRoot,
};

/// Generic CRUD engine parameterized by a schema table.
pub struct ResourceEngine {
    registry: Arc<SchemaRegistry>,
    store: Arc<EntityStore>,
    config: EngineConfig,
    roots: RootIds,
}

impl ResourceEngine {
    /// Creates an engine over a fresh, bootstrapped store.
    pub fn new(registry: Arc<SchemaRegistry>, config: EngineConfig) -> EngineResult<Self> {
        Self::with_store(registry, Arc::new(EntityStore::new()), config)
    }

    /// Creates an engine over an existing store, bootstrapping it when it has
    /// no root entities yet.
    pub fn with_store(
        registry: Arc<SchemaRegistry>,
        store: Arc<EntityStore>,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        if config.customer_id_min > config.customer_id_max {
            return Err(EngineError::CustomerIdRange {
                min: config.customer_id_min,
                max: config.customer_id_max,
            });
        }
        // The root enterprise takes the low end of the customer id range.
        let roots = match store.root_ids() {
            Some(roots) => roots,
            None => store.bootstrap(
                &registry,
                &config.root_enterprise_name,
                &config.root_user_name,
                config.customer_id_min,
                config.dictionary_version,
            )?,
        };
        info!(types = registry.len(), "Resource engine ready");
        Ok(Self {
            registry,
            store,
            config,
            roots,
        })
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn root_ids(&self) -> RootIds {
        self.roots
    }

    fn schema(&self, entity_type: &str) -> ApiResult<&EntitySchema> {
        self.registry
            .get(entity_type)
            .ok_or_else(|| ApiError::UnknownResource(entity_type.to_string()))
    }

    // ── Read ─────────────────────────────────────────────────────

    /// Fetches one entity by id.
    pub fn get(&self, entity_type: &str, id: &str) -> ApiResult<Value> {
        debug!(entity_type, id, "GET");
        let schema = self.schema(entity_type)?;
        let tables = self.store.read();
        let entity = EntityId::parse(id)
            .ok()
            .and_then(|id| tables.get(entity_type, id))
            .ok_or_else(|| ApiError::not_found_id(id))?;
        Ok(entity.to_wire(schema))
    }

    /// Lists entities of a type, optionally scoped to a parent.
    pub fn list(&self, query: &ListQuery) -> ApiResult<ListResult> {
        debug!(
            entity_type = %query.entity_type,
            parent = ?query.parent,
            filter = ?query.filter,
            "GET list"
        );
        let schema = self.schema(&query.entity_type)?;
        let tables = self.store.read();

        let source: Box<dyn Iterator<Item = &Entity> + '_> = match &query.parent {
            Some(scope) => {
                let parent_id = validate::check_read_parent(
                    schema,
                    &tables,
                    &scope.parent_type,
                    &scope.parent_id,
                )?;
                let key = ContainmentKey::new(&scope.parent_type, &schema.rest_name);
                Box::new(tables.children_of(&key, parent_id))
            }
            None => Box::new(tables.all_of_type(&schema.rest_name)),
        };

        let limit = query.limit();
        let matching = source.filter(|e| query.accepts(e));
        let selected: Vec<&Entity> = match &query.order_by {
            Some(order) => {
                let mut all: Vec<&Entity> = matching.collect();
                all.sort_by(|a, b| order.compare(a, b));
                all.truncate(limit);
                all
            }
            // take() stops iterating at the first match for single-item requests
            None => matching.take(limit).collect(),
        };

        Ok(ListResult {
            items: selected.into_iter().map(|e| e.to_wire(schema)).collect(),
        })
    }

    // ── Create ───────────────────────────────────────────────────

    /// Creates an entity at the root or under `(parent_type, parent_id)`.
    pub fn create(
        &self,
        entity_type: &str,
        parent: Option<(&str, &str)>,
        payload: &Value,
    ) -> ApiResult<Value> {
        debug!(entity_type, ?parent, %payload, "POST");
        let schema = self.schema(entity_type)?;
        let mut payload = canonical_payload(schema, payload)?;

        let mut tables = self.store.write();
        validate::check_mandatory(schema, &payload)?;
        validate::check_unique(schema, &tables, &payload, UniqueScope::Create)?;

        for (field, default) in &schema.default_fields {
            if !payload.get(field).is_some_and(validate::is_truthy) {
                payload.insert(field.clone(), default.clone());
            }
        }

        let mut entity = Entity::new(&schema.rest_name, schema.normalize_payload(&payload));
        let now = Value::from(Timestamp::now());
        let root_user = Value::String(self.roots.user.to_string());
        let customer_id = rand::thread_rng()
            .gen_range(self.config.customer_id_min..=self.config.customer_id_max);
        set_declared(schema, &mut entity.data, attr::OWNER, root_user.clone());
        set_declared(schema, &mut entity.data, attr::CREATION_DATE, now.clone());
        set_declared(schema, &mut entity.data, attr::LAST_UPDATED_BY, root_user);
        set_declared(schema, &mut entity.data, attr::LAST_UPDATED_DATE, now);
        set_declared(schema, &mut entity.data, attr::CUSTOMER_ID, customer_id.into());
        set_declared(
            schema,
            &mut entity.data,
            attr::DICTIONARY_VERSION,
            self.config.dictionary_version.into(),
        );

        match parent {
            Some((parent_type, parent_id)) => {
                let parent_id =
                    validate::check_create_parent(schema, &tables, parent_type, parent_id)?;
                entity = entity.with_parent(parent_type, parent_id);
            }
            None => validate::check_root_creation(schema)?,
        }

        let wire = entity.to_wire(schema);
        if let Some((parent_type, parent_id)) = entity.parent() {
            let key = ContainmentKey::new(parent_type, &schema.rest_name);
            tables.index_child(key, parent_id, entity.id);
        }
        debug!(entity_type, id = %entity.id, "Created");
        tables.put(entity);
        Ok(wire)
    }

    // ── Update ───────────────────────────────────────────────────

    /// Replaces an entity's attributes with the payload.
    ///
    /// Defaults are not re-applied. The id, parent, creation date, owner and
    /// customer id carry over from the stored entity; the update bookkeeping
    /// is refreshed.
    pub fn update(&self, entity_type: &str, id: &str, payload: &Value) -> ApiResult<Value> {
        debug!(entity_type, id, %payload, "PUT");
        let schema = self.schema(entity_type)?;
        let payload = canonical_payload(schema, payload)?;

        let mut tables = self.store.write();
        let old = EntityId::parse(id)
            .ok()
            .and_then(|id| tables.get(entity_type, id))
            .cloned()
            .ok_or_else(|| ApiError::not_found_id(id))?;

        validate::check_mandatory(schema, &payload)?;
        validate::check_unique(schema, &tables, &payload, UniqueScope::Update(old.id))?;

        let mut data = schema.normalize_payload(&payload);
        for preserved in [attr::CREATION_DATE, attr::CUSTOMER_ID, attr::OWNER] {
            match old.data.get(preserved) {
                Some(value) => {
                    data.insert(preserved.to_string(), value.clone());
                }
                None => {
                    data.remove(preserved);
                }
            }
        }
        set_declared(
            schema,
            &mut data,
            attr::LAST_UPDATED_BY,
            Value::String(self.roots.user.to_string()),
        );
        set_declared(schema, &mut data, attr::LAST_UPDATED_DATE, Timestamp::now().into());
        set_declared(
            schema,
            &mut data,
            attr::DICTIONARY_VERSION,
            self.config.dictionary_version.into(),
        );

        let updated = Entity { data, ..old };
        let wire = updated.to_wire(schema);
        if let Some((parent_type, parent_id)) = updated.parent() {
            let key = ContainmentKey::new(parent_type, &schema.rest_name);
            tables.index_child(key, parent_id, updated.id);
        }
        tables.put(updated);
        Ok(wire)
    }

    /// Replaces the members of a parent with exactly `member_ids`, a JSON
    /// array of id strings.
    ///
    /// Only membership relations can be rebuilt this way; owning
    /// containment follows the entities' own parent references.
    pub fn replace_members(
        &self,
        entity_type: &str,
        parent_type: &str,
        parent_id: &str,
        member_ids: &Value,
    ) -> ApiResult<()> {
        debug!(entity_type, parent_type, parent_id, %member_ids, "PUT members");
        let schema = self.schema(entity_type)?;
        let raw_ids = member_ids.as_array().ok_or_else(|| {
            ApiError::BadRequest("member list must be a JSON array of ids".into())
        })?;

        let mut tables = self.store.write();
        let parent_id = validate::check_read_parent(schema, &tables, parent_type, parent_id)?;
        if !schema.is_member_of(parent_type) {
            return Err(ApiError::invalid_parent(format!(
                "Entity {} cannot be assigned to a {parent_type}",
                schema.rest_name
            )));
        }

        let mut members = BTreeSet::new();
        for raw in raw_ids {
            let id = raw
                .as_str()
                .and_then(|s| EntityId::parse(s).ok())
                .filter(|id| tables.contains(entity_type, *id))
                .ok_or_else(|| ApiError::not_found_id(validate::display_value(raw)))?;
            members.insert(id);
        }

        let key = ContainmentKey::new(parent_type, &schema.rest_name);
        tables.replace_children(key, parent_id, members);
        Ok(())
    }

    // ── Delete ───────────────────────────────────────────────────

    /// Deletes an entity and everything it contains.
    pub fn delete(&self, entity_type: &str, id: &str) -> ApiResult<()> {
        debug!(entity_type, id, "DELETE");
        self.schema(entity_type)?;
        let entity_id = EntityId::parse(id).map_err(|_| ApiError::not_found_id(id))?;

        let mut tables = self.store.write();
        if let Some(root) = self.protected(&tables, entity_id) {
            return Err(ApiError::ProtectedEntity(root));
        }
        if !tables.contains(entity_type, entity_id) {
            return Err(ApiError::not_found_id(id));
        }

        let mut plan = Vec::new();
        let mut seen = BTreeSet::new();
        self.plan_cascade(&tables, entity_type, entity_id, &mut plan, &mut seen)?;

        for (doomed_type, doomed_id) in &plan {
            for key in tables.keys_with_parent(doomed_type) {
                tables.drop_bucket(&key, *doomed_id);
            }
            for key in tables.keys_with_child(doomed_type) {
                tables.unindex_child(&key, *doomed_id);
            }
            tables.remove(doomed_type, *doomed_id);
        }
        debug!(entity_type, id, removed = plan.len(), "Deleted");
        Ok(())
    }

    fn protected(&self, tables: &StoreTables, id: EntityId) -> Option<ProtectedRoot> {
        if !tables.is_protected(id) {
            None
        } else if id == self.roots.user {
            Some(ProtectedRoot::User)
        } else {
            Some(ProtectedRoot::Enterprise)
        }
    }

    /// Collects the entity and its owned descendants, children before
    /// parents. Membership relations are unlinked, never followed.
    fn plan_cascade(
        &self,
        tables: &StoreTables,
        entity_type: &str,
        id: EntityId,
        plan: &mut Vec<(String, EntityId)>,
        seen: &mut BTreeSet<(String, EntityId)>,
    ) -> ApiResult<()> {
        if !seen.insert((entity_type.to_string(), id)) {
            return Ok(());
        }
        if let Some(root) = self.protected(tables, id) {
            return Err(ApiError::ProtectedEntity(root));
        }

        for key in tables.keys_with_parent(entity_type) {
            let membership = self
                .registry
                .get(&key.child_type)
                .is_some_and(|child| child.is_member_of(&key.parent_type));
            if membership {
                continue;
            }
            for child in tables.child_ids(&key, id) {
                if tables.contains(&key.child_type, child) {
                    self.plan_cascade(tables, &key.child_type, child, plan, seen)?;
                }
            }
        }

        plan.push((entity_type.to_string(), id));
        Ok(())
    }
}

/// The payload object under declared wire names; every check runs on this.
fn canonical_payload(schema: &EntitySchema, payload: &Value) -> ApiResult<Map<String, Value>> {
    payload
        .as_object()
        .map(|object| schema.canonical_payload(object))
        .ok_or_else(|| ApiError::BadRequest("payload must be a JSON object".into()))
}

/// Writes a bookkeeping attribute only when the type declares it.
fn set_declared(schema: &EntitySchema, data: &mut Map<String, Value>, internal: &str, value: Value) {
    if schema.has_internal(internal) {
        data.insert(internal.to_string(), value);
    }
}
