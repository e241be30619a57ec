//! # HTTP API
//!
//! | Method | Path                        | Access |
//! |--------|-----------------------------|--------|
//! | GET    | `/health`                   | open   |
//! | GET    | `/tiers`                    | open   |
//! | POST   | `/access`                   | open   |
//! | GET    | `/stores/{index}/scorecard` | open   |
//! | GET    | `/stores`                   | admin  |
//! | GET    | `/export`                   | admin  |
//! | POST   | `/import`                   | admin  |
//!
//! Admin routes require the `x-admin-secret` header. The server keeps no
//! session of its own: `/access` only tells the caller who they are.

use crate::access::AccessGate;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::repository::Database;
use axum::body::Bytes;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use varejo_core::{CoreError, Scorecard, Session, StoreTier, TierLadder};

/// Header carrying the admin secret.
pub const ADMIN_HEADER: &str = "x-admin-secret";

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub gate: AccessGate,
    pub ladder: Arc<TierLadder>,
}

impl AppState {
    #[must_use]
    pub fn new(db: Database, gate: AccessGate) -> Self {
        Self {
            db,
            gate,
            ladder: Arc::new(TierLadder::standard()),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::AccessDenied(_) | AppError::NotAdmin | AppError::NoSession => {
                StatusCode::UNAUTHORIZED
            }
            AppError::StoreIndex(_) => StatusCode::NOT_FOUND,
            AppError::Core(
                CoreError::Malformed(_) | CoreError::NotAnArray | CoreError::InvalidStore(_),
            ) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Extractor that admits only requests carrying the admin secret.
pub struct Admin;

impl FromRequestParts<AppState> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let secret = parts
            .headers
            .get(ADMIN_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if state.gate.verify_admin(secret) {
            Ok(Admin)
        } else {
            tracing::warn!("admin route called without a valid secret");
            Err(AppError::NotAdmin)
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": state.db.backend(),
    }))
}

async fn tiers(State(state): State<AppState>) -> Json<TierLadder> {
    Json(state.ladder.as_ref().clone())
}

#[derive(Debug, Deserialize)]
pub struct AccessRequest {
    pub credential: String,
    #[serde(default)]
    pub admin: bool,
}

async fn access(
    State(state): State<AppState>,
    Json(req): Json<AccessRequest>,
) -> Result<Json<Session>, AppError> {
    let stores = state.db.load_stores();
    let session = state.gate.authenticate(&req.credential, req.admin, &stores)?;
    Ok(Json(session))
}

async fn scorecard(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Scorecard>, AppError> {
    let stores = state.db.load_stores();
    let store = stores.get(index).ok_or(AppError::StoreIndex(index))?;
    Ok(Json(Scorecard::for_store(store, &state.ladder)))
}

/// Admin listing row.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub index: usize,
    pub id: String,
    pub code: String,
    pub fantasia: String,
    pub manager: String,
    pub overall: i64,
    pub tier: StoreTier,
}

async fn list_stores(_: Admin, State(state): State<AppState>) -> Json<Vec<StoreSummary>> {
    let summaries = state
        .db
        .load_stores()
        .iter()
        .enumerate()
        .map(|(index, store)| {
            let card = Scorecard::for_store(store, &state.ladder);
            StoreSummary {
                index,
                id: store.id.clone(),
                code: store.code.clone(),
                fantasia: store.fantasia.clone(),
                manager: store.manager.clone(),
                overall: card.overall,
                tier: card.tier,
            }
        })
        .collect();
    Json(summaries)
}

/// `Content-Disposition` value offering `file_name` as a download.
fn attachment(file_name: &str) -> AppResult<HeaderValue> {
    Ok(HeaderValue::from_str(&format!(
        "attachment; filename=\"{file_name}\""
    ))?)
}

async fn export(_: Admin, State(state): State<AppState>) -> Result<Response, AppError> {
    let export = state.db.export_backup(&state.db.load_stores())?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (header::CONTENT_DISPOSITION, attachment(&export.file_name)?),
        ],
        export.bytes,
    )
        .into_response())
}

async fn import(
    _: Admin,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let stores = state.db.import_backup(&body).await?;
    Ok(Json(serde_json::json!({ "imported": stores.len() })))
}

// =============================================================================
// ROUTER
// =============================================================================

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(ADMIN_HEADER)]);

    Router::new()
        .route("/health", get(health))
        .route("/tiers", get(tiers))
        .route("/access", post(access))
        .route("/stores", get(list_stores))
        .route("/stores/{index}/scorecard", get(scorecard))
        .route("/export", get(export))
        .route("/import", post(import))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Refresh from the remote backend, then serve until Ctrl-C.
pub async fn serve(config: &AppConfig) -> AppResult<()> {
    let db = Database::open(&config.db_path, &config.backend)?;
    let stores = db.refresh().await;
    tracing::info!(backend = db.backend(), stores = stores.len(), "store list loaded");

    let app = router(AppState::new(db, AccessGate::new(config.admin_secret.as_str())));
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn attachment_quotes_file_name() {
        let value = attachment("varejo-elite-db-backup-2024-05-01.json").unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"varejo-elite-db-backup-2024-05-01.json\""
        );
    }

    #[test]
    fn bad_file_name_is_a_header_error() {
        let err = attachment("backup\n.json").unwrap_err();
        assert!(matches!(err, AppError::Header(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
