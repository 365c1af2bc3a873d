use nusim_model::{Entity, SchemaRegistry};
use nusim_types::{EntityId, Timestamp};
use serde_json::{json, Map, Value};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

use crate::{ContainmentKey, StorageError, StorageResult, StoreTables};

const ENTERPRISE: &str = "enterprise";
const USER: &str = "user";

/// Ids of the two entities that can never be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootIds {
    /// The system (`csp`) enterprise.
    pub enterprise: EntityId,
    /// The system (`csproot`) user, contained in the system enterprise.
    pub user: EntityId,
}

/// Process-wide entity store.
///
/// Construct once and share through an `Arc`. All tables sit behind one
/// `RwLock`: readers share it, every mutation (including a whole cascading
/// delete) holds the write guard until it is done.
#[derive(Debug, Default)]
pub struct EntityStore {
    tables: RwLock<StoreTables>,
}

impl EntityStore {
    /// Creates an empty store with no root entities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires shared access to the tables.
    ///
    /// A poisoned lock is recovered: every mutation validates before it
    /// writes, so a panicking writer cannot leave the tables half-updated.
    pub fn read(&self) -> RwLockReadGuard<'_, StoreTables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires exclusive access to the tables.
    pub fn write(&self) -> RwLockWriteGuard<'_, StoreTables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the protected root ids once bootstrapped.
    pub fn root_ids(&self) -> Option<RootIds> {
        self.read().root_ids()
    }

    /// Creates the system enterprise and the system user inside it.
    ///
    /// Attributes are written only when the schema declares them, like any
    /// other bookkeeping.
    pub fn bootstrap(
        &self,
        registry: &SchemaRegistry,
        enterprise_name: &str,
        user_name: &str,
        customer_id: u32,
        dictionary_version: u32,
    ) -> StorageResult<RootIds> {
        let enterprise_schema = registry
            .get(ENTERPRISE)
            .ok_or_else(|| StorageError::MissingRootType(ENTERPRISE.into()))?;
        let user_schema = registry
            .get(USER)
            .ok_or_else(|| StorageError::MissingRootType(USER.into()))?;

        let mut tables = self.write();
        if tables.roots.is_some() {
            return Err(StorageError::AlreadyBootstrapped);
        }

        let enterprise_id = EntityId::new();
        let user_id = EntityId::new();
        let now = Timestamp::now();

        let bookkeeping = json!({
            "owner": user_id.to_string(),
            "creationDate": now,
            "lastUpdatedBy": user_id.to_string(),
            "lastUpdatedDate": now,
        });

        let mut enterprise_payload = object(bookkeeping.clone());
        enterprise_payload.extend(object(json!({
            "name": enterprise_name,
            "description": format!("{enterprise_name} enterprise"),
            "customerID": customer_id,
            "dictionaryVersion": dictionary_version,
        })));
        let mut enterprise = Entity::new(
            ENTERPRISE,
            enterprise_schema.normalize_payload(&enterprise_payload),
        );
        enterprise.id = enterprise_id;

        let mut user_payload = object(bookkeeping);
        user_payload.extend(object(json!({
            "userName": user_name,
            "firstName": user_name,
            "lastName": user_name,
            "email": format!("{user_name}@{}.com", enterprise_name.to_lowercase()),
            "disabled": false,
        })));
        let mut user = Entity::new(USER, user_schema.normalize_payload(&user_payload))
            .with_parent(ENTERPRISE, enterprise_id);
        user.id = user_id;

        tables.put(enterprise);
        tables.put(user);
        tables.index_child(ContainmentKey::new(ENTERPRISE, USER), enterprise_id, user_id);

        let roots = RootIds {
            enterprise: enterprise_id,
            user: user_id,
        };
        tables.roots = Some(roots);

        info!(
            enterprise = %enterprise_id,
            user = %user_id,
            "Bootstrapped root enterprise {} and root user {}",
            enterprise_name,
            user_name
        );
        Ok(roots)
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
