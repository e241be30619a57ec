//! Local persistence in a single redb file.
//!
//! One string-keyed table holds two entries:
//! - `varejo_elite_v1_database`: the store list as compact JSON
//! - `varejo_elite_session`: the current session

use super::StoreRepository;
use crate::error::{AppResult, storage};
use async_trait::async_trait;
use redb::{Database, ReadableDatabase, TableDefinition, TableError};
use std::path::Path;
use std::sync::Arc;
use varejo_core::formats::{decode_backup, encode_compact};
use varejo_core::{Session, Store};

const KV: TableDefinition<&str, &str> = TableDefinition::new("varejo_kv");

/// Key of the persisted store list.
pub const DB_KEY: &str = "varejo_elite_v1_database";
/// Key of the persisted session.
pub const SESSION_KEY: &str = "varejo_elite_session";

// =============================================================================
// KEY-VALUE FILE
// =============================================================================

/// Shared handle to the redb file. Cloning shares the same open database.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Database>,
}

impl LocalStore {
    /// Open (or create) the database file.
    pub fn open(path: &Path) -> AppResult<Self> {
        let db = Database::create(path).map_err(storage)?;
        let store = Self { db: Arc::new(db) };
        store.ensure_table()?;
        Ok(store)
    }

    fn ensure_table(&self) -> AppResult<()> {
        let txn = self.db.begin_write().map_err(storage)?;
        txn.open_table(KV).map_err(storage)?;
        txn.commit().map_err(storage)
    }

    pub fn get(&self, key: &str) -> AppResult<Option<String>> {
        let txn = self.db.begin_read().map_err(storage)?;
        let table = match txn.open_table(KV) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(storage(e)),
        };
        let value = table.get(key).map_err(storage)?;
        Ok(value.map(|guard| guard.value().to_owned()))
    }

    pub fn put(&self, key: &str, value: &str) -> AppResult<()> {
        let txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = txn.open_table(KV).map_err(storage)?;
            table.insert(key, value).map_err(storage)?;
        }
        txn.commit().map_err(storage)
    }

    pub fn remove(&self, key: &str) -> AppResult<()> {
        let txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = txn.open_table(KV).map_err(storage)?;
            table.remove(key).map_err(storage)?;
        }
        txn.commit().map_err(storage)
    }
}

// =============================================================================
// STORE LIST
// =============================================================================

/// The always-present local copy of the store list.
#[derive(Clone)]
pub struct LocalRepository {
    kv: LocalStore,
}

impl LocalRepository {
    #[must_use]
    pub fn new(kv: LocalStore) -> Self {
        Self { kv }
    }

    /// The persisted list, `None` when nothing was ever saved.
    pub fn read_stores(&self) -> AppResult<Option<Vec<Store>>> {
        let Some(raw) = self.kv.get(DB_KEY)? else {
            return Ok(None);
        };
        Ok(Some(decode_backup(raw.as_bytes())?))
    }

    pub fn write_stores(&self, stores: &[Store]) -> AppResult<()> {
        let json = encode_compact(stores)?;
        self.kv.put(DB_KEY, &json)
    }
}

#[async_trait]
impl StoreRepository for LocalRepository {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn fetch_stores(&self) -> AppResult<Vec<Store>> {
        Ok(self.read_stores()?.unwrap_or_default())
    }

    async fn save_stores(&self, stores: &[Store]) -> AppResult<()> {
        self.write_stores(stores)
    }

    async fn clear(&self) -> AppResult<()> {
        self.kv.remove(DB_KEY)
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Persisted login state.
#[derive(Clone)]
pub struct SessionStore {
    kv: LocalStore,
}

impl SessionStore {
    #[must_use]
    pub fn new(kv: LocalStore) -> Self {
        Self { kv }
    }

    /// Load the session. Corrupt data is discarded and reads as logged out.
    pub fn load(&self) -> AppResult<Option<Session>> {
        let Some(raw) = self.kv.get(SESSION_KEY)? else {
            return Ok(None);
        };
        match Session::decode(&raw) {
            Some(session) => Ok(Some(session)),
            None => {
                tracing::warn!("discarding corrupt session data");
                self.kv.remove(SESSION_KEY)?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> AppResult<()> {
        self.kv.put(SESSION_KEY, &session.encode())
    }

    pub fn clear(&self) -> AppResult<()> {
        self.kv.remove(SESSION_KEY)
    }
}
