//! # Store Repositories
//!
//! ```text
//!                  ┌──────────────────────┐
//!   CLI / API ───► │      Database        │
//!                  │  (facade, this mod)  │
//!                  └───┬──────────────┬───┘
//!          always      │              │   best-effort mirror
//!                      ▼              ▼
//!              ┌──────────────┐  ┌──────────────────────────┐
//!              │ LocalRepo    │  │ Firestore │ Supabase     │
//!              │ (redb file)  │  │ (chosen once at startup) │
//!              └──────────────┘  └──────────────────────────┘
//! ```
//!
//! The local copy is the source of truth for reads. The remote mirror is
//! pulled on [`Database::refresh`] and pushed on every save; its failures
//! are logged and never surfaced.

mod firestore;
mod local;
mod supabase;

pub use firestore::FirestoreRepository;
pub use local::{DB_KEY, LocalRepository, LocalStore, SESSION_KEY, SessionStore};
pub use supabase::SupabaseRepository;

use crate::config::BackendConfig;
use crate::error::AppResult;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use varejo_core::formats::{backup_file_name, decode_backup, encode_backup};
use varejo_core::{Store, seed};

/// A place the store list can be read from and written to.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    async fn fetch_stores(&self) -> AppResult<Vec<Store>>;

    /// Replace the stored set: entries whose id is absent from `stores` are
    /// removed.
    async fn save_stores(&self, stores: &[Store]) -> AppResult<()>;

    async fn clear(&self) -> AppResult<()>;
}

/// Build the remote mirror for a backend configuration.
pub fn open_remote(backend: &BackendConfig) -> AppResult<Option<Arc<dyn StoreRepository>>> {
    let remote: Arc<dyn StoreRepository> = match backend {
        BackendConfig::Local => return Ok(None),
        BackendConfig::Firebase {
            api_key,
            project_id,
            base_url,
        } => Arc::new(FirestoreRepository::new(base_url.as_str(), project_id, api_key.as_str())?),
        BackendConfig::Supabase { url, anon_key } => Arc::new(SupabaseRepository::new(url, anon_key)?),
    };
    Ok(Some(remote))
}

/// A serialized backup ready to be written out.
#[derive(Debug, Clone)]
pub struct Export {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Today's date as `YYYY-MM-DD` in local time.
#[must_use]
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

// =============================================================================
// FACADE
// =============================================================================

#[derive(Clone)]
pub struct Database {
    local: LocalRepository,
    sessions: SessionStore,
    remote: Option<Arc<dyn StoreRepository>>,
}

impl Database {
    /// Open the local file and the configured mirror.
    pub fn open(path: &Path, backend: &BackendConfig) -> AppResult<Self> {
        Self::with_remote(path, open_remote(backend)?)
    }

    pub fn with_remote(path: &Path, remote: Option<Arc<dyn StoreRepository>>) -> AppResult<Self> {
        let kv = LocalStore::open(path)?;
        if let Some(remote) = &remote {
            tracing::debug!(backend = remote.backend(), "remote mirror enabled");
        }
        Ok(Self {
            local: LocalRepository::new(kv.clone()),
            sessions: SessionStore::new(kv),
            remote,
        })
    }

    /// Name of the selected backend.
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.remote.as_ref().map_or("local", |r| r.backend())
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Read the local copy. Missing or corrupt data yields the seed stores.
    pub fn load_stores(&self) -> Vec<Store> {
        match self.local.read_stores() {
            Ok(Some(stores)) => stores,
            Ok(None) => seed::initial_stores(),
            Err(e) => {
                tracing::warn!(error = %e, "local store list unreadable; using seed data");
                seed::initial_stores()
            }
        }
    }

    /// Pull from the mirror and overwrite the local copy on success.
    ///
    /// Failures and empty remote lists keep the local copy.
    pub async fn refresh(&self) -> Vec<Store> {
        let Some(remote) = &self.remote else {
            return self.load_stores();
        };

        match remote.fetch_stores().await {
            Ok(stores) if stores.is_empty() => {
                tracing::info!(backend = remote.backend(), "remote is empty; keeping local copy");
                self.load_stores()
            }
            Ok(stores) => {
                if let Err(e) = self.local.write_stores(&stores) {
                    tracing::warn!(error = %e, "failed to cache remote stores locally");
                }
                tracing::info!(backend = remote.backend(), count = stores.len(), "stores refreshed");
                stores
            }
            Err(e) => {
                tracing::warn!(backend = remote.backend(), error = %e, "refresh failed; using local copy");
                self.load_stores()
            }
        }
    }

    /// Write the local copy only.
    pub fn write_local(&self, stores: &[Store]) -> AppResult<()> {
        self.local.write_stores(stores)
    }

    /// Write locally, then mirror best-effort.
    pub async fn save_stores(&self, stores: &[Store]) -> AppResult<()> {
        self.local.save_stores(stores).await?;

        if let Some(remote) = &self.remote
            && let Err(e) = remote.save_stores(stores).await
        {
            tracing::warn!(backend = remote.backend(), error = %e, "remote save failed");
        }
        Ok(())
    }

    /// Replace the store list with a backup's content.
    pub async fn import_backup(&self, bytes: &[u8]) -> AppResult<Vec<Store>> {
        let stores = decode_backup(bytes)?;
        self.save_stores(&stores).await?;
        tracing::info!(count = stores.len(), "backup imported");
        Ok(stores)
    }

    /// Serialize stores with a dated file name.
    pub fn export_backup(&self, stores: &[Store]) -> AppResult<Export> {
        Ok(Export {
            file_name: backup_file_name(&today()),
            bytes: encode_backup(stores)?,
        })
    }

    /// Clear local data, the session and the mirror.
    pub async fn reset(&self) -> AppResult<()> {
        self.local.clear().await?;
        self.sessions.clear()?;

        if let Some(remote) = &self.remote
            && let Err(e) = remote.clear().await
        {
            tracing::warn!(backend = remote.backend(), error = %e, "remote clear failed");
        }
        tracing::info!("all data reset");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;
    use varejo_core::CoreError;

    /// In-memory mirror that can be told to fail.
    #[derive(Default)]
    struct MemoryRepo {
        stores: Mutex<Vec<Store>>,
        failing: bool,
    }

    #[async_trait]
    impl StoreRepository for MemoryRepo {
        fn backend(&self) -> &'static str {
            "memory"
        }

        async fn fetch_stores(&self) -> AppResult<Vec<Store>> {
            if self.failing {
                return Err(AppError::Remote("offline".into()));
            }
            Ok(self.stores.lock().unwrap().clone())
        }

        async fn save_stores(&self, stores: &[Store]) -> AppResult<()> {
            if self.failing {
                return Err(AppError::Remote("offline".into()));
            }
            *self.stores.lock().unwrap() = stores.to_vec();
            Ok(())
        }

        async fn clear(&self) -> AppResult<()> {
            if self.failing {
                return Err(AppError::Remote("offline".into()));
            }
            self.stores.lock().unwrap().clear();
            Ok(())
        }
    }

    fn open(dir: &tempfile::TempDir, remote: Option<Arc<MemoryRepo>>) -> Database {
        let remote = remote.map(|r| r as Arc<dyn StoreRepository>);
        Database::with_remote(&dir.path().join("db.redb"), remote).unwrap()
    }

    fn other_store() -> Store {
        seed::new_store("2", "2002", "OUTRA LTDA", "Outra", "Bia", "2024-02-02")
    }

    #[test]
    fn empty_database_loads_seed() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir, None);
        assert_eq!(db.backend(), "local");
        assert_eq!(db.load_stores(), seed::initial_stores());
    }

    #[tokio::test]
    async fn save_mirrors_to_remote() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRepo::default());
        let db = open(&dir, Some(remote.clone()));

        let stores = vec![other_store()];
        db.save_stores(&stores).await.unwrap();
        assert_eq!(db.load_stores(), stores);
        assert_eq!(*remote.stores.lock().unwrap(), stores);
    }

    #[tokio::test]
    async fn remote_failure_does_not_fail_save() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRepo {
            failing: true,
            ..MemoryRepo::default()
        });
        let db = open(&dir, Some(remote));

        let stores = vec![other_store()];
        assert!(db.save_stores(&stores).await.is_ok());
        assert_eq!(db.load_stores(), stores);
        assert_eq!(db.refresh().await, stores);
    }

    #[tokio::test]
    async fn refresh_overwrites_local_copy() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRepo::default());
        *remote.stores.lock().unwrap() = vec![other_store()];
        let db = open(&dir, Some(remote));

        assert_eq!(db.refresh().await, vec![other_store()]);
        assert_eq!(db.load_stores(), vec![other_store()]);
    }

    #[tokio::test]
    async fn empty_remote_keeps_local_copy() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRepo::default());
        let db = open(&dir, Some(remote));

        assert_eq!(db.refresh().await, seed::initial_stores());
    }

    #[tokio::test]
    async fn import_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir, None);

        let result = db.import_backup(br#"{"stores": []}"#).await;
        assert!(matches!(result, Err(AppError::Core(CoreError::NotAnArray))));
        assert_eq!(db.load_stores(), seed::initial_stores());
    }

    #[tokio::test]
    async fn export_then_import_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir, None);
        let stores = vec![seed::initial_stores().remove(0), other_store()];

        let export = db.export_backup(&stores).unwrap();
        assert!(export.file_name.starts_with("varejo-elite-db-backup-"));
        assert!(export.file_name.ends_with(".json"));

        let imported = db.import_backup(&export.bytes).await.unwrap();
        assert_eq!(imported, stores);
        assert_eq!(db.load_stores(), stores);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRepo::default());
        let db = open(&dir, Some(remote.clone()));

        db.save_stores(&[other_store()]).await.unwrap();
        db.sessions().save(&varejo_core::Session::admin()).unwrap();
        db.reset().await.unwrap();

        assert_eq!(db.load_stores(), seed::initial_stores());
        assert_eq!(db.sessions().load().unwrap(), None);
        assert!(remote.stores.lock().unwrap().is_empty());
    }
}
