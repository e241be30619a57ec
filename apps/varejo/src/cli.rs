//! # CLI Commands
//!
//! One `cmd_*` function per subcommand. Each opens the database, checks the
//! persisted session where needed, does its work and prints to stdout.
//! Commands return their main value so tests can inspect it.

use crate::access::AccessGate;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::repository::{Database, today};
use std::path::{Path, PathBuf};
use varejo_core::editing::{self, KpiDraft, KpiField};
use varejo_core::{Scorecard, Session, Store, StoreTier, TierLadder, seed};

/// Shown when a backup file cannot be imported.
pub const IMPORT_FAILED: &str = "Erro ao importar backup. Verifique o formato do arquivo.";
/// Asked before wiping all data.
pub const RESET_PROMPT: &str = "Deseja realmente apagar TUDO? Esta ação é irreversível.";

// =============================================================================
// HELPERS
// =============================================================================

pub fn open_database(config: &AppConfig) -> AppResult<Database> {
    Database::open(&config.db_path, &config.backend)
}

fn require_session(db: &Database) -> AppResult<Session> {
    db.sessions().load()?.ok_or(AppError::NoSession)
}

fn require_admin(db: &Database) -> AppResult<Session> {
    let session = require_session(db)?;
    if session.is_admin() {
        Ok(session)
    } else {
        Err(AppError::NotAdmin)
    }
}

fn store_at(stores: &mut [Store], index: usize) -> AppResult<&mut Store> {
    stores.get_mut(index).ok_or(AppError::StoreIndex(index))
}

/// Millisecond timestamp used for generated ids.
fn timestamp_id() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn money(amount: f64) -> String {
    format!("R$ {amount:.2}")
}

// =============================================================================
// SETUP
// =============================================================================

/// Create the database file with the seed store list.
pub fn cmd_init(config: &AppConfig, force: bool) -> AppResult<()> {
    let path = &config.db_path;
    if path.exists() {
        if !force {
            return Err(AppError::AlreadyExists(path.clone()));
        }
        std::fs::remove_file(path)?;
    }

    let db = Database::with_remote(path, None)?;
    db.write_local(&seed::initial_stores())?;
    tracing::info!(path = %path.display(), "database initialized");
    println!("Banco de dados criado em {}", path.display());
    Ok(())
}

// =============================================================================
// SESSION
// =============================================================================

/// Authenticate and persist the session. A rejection leaves the stored
/// session untouched.
pub fn cmd_login(config: &AppConfig, credential: &str, admin: bool) -> AppResult<Session> {
    let db = open_database(config)?;
    let gate = AccessGate::new(config.admin_secret.as_str());
    let stores = db.load_stores();

    let session = gate.authenticate(credential, admin, &stores)?;
    db.sessions().save(&session)?;

    if session.is_admin() {
        println!("Acesso administrativo liberado.");
    } else if let Some(store) = stores.get(session.store_index) {
        println!("Bem-vindo, {} ({})", store.manager, store.fantasia);
    }
    Ok(session)
}

pub fn cmd_logout(config: &AppConfig) -> AppResult<()> {
    let db = open_database(config)?;
    db.sessions().clear()?;
    println!("Sessão encerrada.");
    Ok(())
}

pub fn cmd_whoami(config: &AppConfig) -> AppResult<Option<Session>> {
    let db = open_database(config)?;
    let session = db.sessions().load()?;
    match session {
        None => println!("Não autenticado."),
        Some(session) if session.is_admin() => println!("ADMIN (backend: {})", db.backend()),
        Some(session) => {
            let stores = db.load_stores();
            let name = stores
                .get(session.store_index)
                .map_or("?", |s| s.fantasia.as_str());
            println!("CLIENT: {} [{}]", name, session.store_index);
        }
    }
    Ok(session)
}

// =============================================================================
// VIEWS
// =============================================================================

pub fn cmd_tiers(json: bool) -> AppResult<()> {
    let ladder = TierLadder::standard();
    if json {
        println!("{}", serde_json::to_string_pretty(&ladder)?);
        return Ok(());
    }
    for rung in ladder.iter() {
        println!(
            "{:>3}%  {:<18} {}",
            rung.min_percentage,
            rung.tier.label(),
            money(rung.reward_value)
        );
    }
    Ok(())
}

/// Show the scorecard of the session's store. Admins may pick any store.
pub fn cmd_dashboard(config: &AppConfig, store: Option<usize>, json: bool) -> AppResult<Scorecard> {
    let db = open_database(config)?;
    let session = require_session(&db)?;

    let index = match store {
        Some(index) if index != session.store_index && !session.is_admin() => {
            return Err(AppError::NotAdmin);
        }
        Some(index) => index,
        None => session.store_index,
    };

    let stores = db.load_stores();
    let store = stores.get(index).ok_or(AppError::StoreIndex(index))?;
    let card = Scorecard::for_store(store, &TierLadder::standard());

    if json {
        println!("{}", serde_json::to_string_pretty(&card)?);
    } else {
        println!("{}", card.to_text());
    }
    Ok(card)
}

pub fn cmd_stores(config: &AppConfig, json: bool) -> AppResult<Vec<Store>> {
    let db = open_database(config)?;
    require_admin(&db)?;
    let stores = db.load_stores();
    let ladder = TierLadder::standard();

    if json {
        println!("{}", serde_json::to_string_pretty(&stores)?);
        return Ok(stores);
    }
    for (index, store) in stores.iter().enumerate() {
        let card = Scorecard::for_store(store, &ladder);
        println!(
            "[{index}] {:<8} {:<28} {:>3}%  {}",
            store.code,
            store.fantasia,
            card.overall,
            card.tier.label()
        );
    }
    Ok(stores)
}

// =============================================================================
// ADMIN EDITS
// =============================================================================

/// New store details.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub code: String,
    pub razao_social: String,
    pub fantasia: String,
    pub manager: String,
}

pub async fn cmd_store_add(config: &AppConfig, new: NewStore) -> AppResult<Store> {
    let db = open_database(config)?;
    require_admin(&db)?;
    let mut stores = db.load_stores();

    let store = seed::new_store(
        timestamp_id().to_string(),
        new.code,
        new.razao_social,
        new.fantasia,
        new.manager,
        today(),
    );
    editing::add_store(&mut stores, store.clone())?;
    db.save_stores(&stores).await?;

    println!("Loja {} cadastrada (índice {}).", store.fantasia, stores.len() - 1);
    Ok(store)
}

pub async fn cmd_kpi_add(config: &AppConfig, store: Option<usize>, draft: KpiDraft) -> AppResult<String> {
    let db = open_database(config)?;
    let session = require_admin(&db)?;
    let mut stores = db.load_stores();

    let target = store_at(&mut stores, store.unwrap_or(session.store_index))?;
    let id = format!("kpi-{}", timestamp_id());
    let kpi = editing::add_kpi(target, id.as_str(), draft);
    println!("KPI {} adicionado ({}).", kpi.name, kpi.id);

    db.save_stores(&stores).await?;
    Ok(id)
}

pub async fn cmd_kpi_set(
    config: &AppConfig,
    store: Option<usize>,
    kpi_id: &str,
    field: &str,
    value: &str,
) -> AppResult<()> {
    let db = open_database(config)?;
    let session = require_admin(&db)?;
    let field: KpiField = field.parse()?;
    let mut stores = db.load_stores();

    let target = store_at(&mut stores, store.unwrap_or(session.store_index))?;
    editing::edit_kpi(target, kpi_id, field, value, &today())?;
    db.save_stores(&stores).await?;

    tracing::info!(kpi = kpi_id, ?field, "KPI updated");
    println!("KPI {kpi_id} atualizado.");
    Ok(())
}

pub async fn cmd_reward_set(
    config: &AppConfig,
    store: Option<usize>,
    tier: StoreTier,
    amount: f64,
) -> AppResult<()> {
    let db = open_database(config)?;
    let session = require_admin(&db)?;
    let mut stores = db.load_stores();

    let target = store_at(&mut stores, store.unwrap_or(session.store_index))?;
    editing::set_reward(target, tier, amount)?;
    db.save_stores(&stores).await?;

    println!("Prêmio do nível {tier}: {}", money(amount));
    Ok(())
}

pub async fn cmd_color_set(
    config: &AppConfig,
    store: Option<usize>,
    tier: StoreTier,
    color: &str,
) -> AppResult<()> {
    let db = open_database(config)?;
    let session = require_admin(&db)?;
    let mut stores = db.load_stores();

    let target = store_at(&mut stores, store.unwrap_or(session.store_index))?;
    editing::set_tier_color(target, tier, color);
    db.save_stores(&stores).await?;

    println!("Cor do nível {tier}: {color}");
    Ok(())
}

// =============================================================================
// BACKUP
// =============================================================================

/// Write a dated backup into `out_dir`. Returns the written path.
pub fn cmd_export(config: &AppConfig, out_dir: &Path) -> AppResult<PathBuf> {
    let db = open_database(config)?;
    require_admin(&db)?;

    let export = db.export_backup(&db.load_stores())?;
    let path = out_dir.join(&export.file_name);
    std::fs::write(&path, &export.bytes)?;

    println!("Backup salvo em {}", path.display());
    Ok(path)
}

/// Replace all stores with the content of a backup file.
pub async fn cmd_import(config: &AppConfig, file: &Path) -> AppResult<Vec<Store>> {
    let db = open_database(config)?;
    require_admin(&db)?;

    let bytes = std::fs::read(file)?;
    let stores = match db.import_backup(&bytes).await {
        Ok(stores) => stores,
        Err(e) => {
            tracing::error!(error = %e, file = %file.display(), "import failed");
            eprintln!("{IMPORT_FAILED}");
            return Err(e);
        }
    };

    println!("{} lojas importadas.", stores.len());
    Ok(stores)
}

/// Wipe every store, the session and the remote mirror.
pub async fn cmd_reset(
    config: &AppConfig,
    confirm: impl FnOnce() -> AppResult<bool>,
) -> AppResult<()> {
    let db = open_database(config)?;
    require_admin(&db)?;
    if !confirm()? {
        return Err(AppError::ResetNotConfirmed);
    }
    db.reset().await?;
    println!("Todos os dados foram apagados.");
    Ok(())
}

// =============================================================================
// SYNC
// =============================================================================

/// Pull the store list from the remote backend into the local copy.
pub async fn cmd_sync(config: &AppConfig) -> AppResult<usize> {
    let db = open_database(config)?;
    let stores = db.refresh().await;
    println!("{} lojas disponíveis (backend: {}).", stores.len(), db.backend());
    Ok(stores.len())
}
