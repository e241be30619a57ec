//! Application error type.

use std::path::PathBuf;
use thiserror::Error;
use varejo_core::CoreError;

/// Errors surfaced by the CLI and the HTTP API.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Local redb storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    /// Remote backend returned an unexpected answer.
    #[error("remote backend error: {0}")]
    Remote(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A response header could not be built from its value.
    #[error("invalid header value: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),

    /// Rejected login, with the message shown to the user.
    #[error("{0}")]
    AccessDenied(String),

    #[error("this operation requires an administrator session")]
    NotAdmin,

    #[error("not logged in; run `varejo login` first")]
    NoSession,

    #[error("no store at index {0}")]
    StoreIndex(usize),

    #[error("database already exists at {0}; use --force to overwrite")]
    AlreadyExists(PathBuf),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("reset not confirmed")]
    ResetNotConfirmed,
}

/// Convert any redb error (they all fold into `redb::Error`).
pub fn storage<E: Into<redb::Error>>(err: E) -> AppError {
    AppError::Storage(err.into())
}

pub type AppResult<T> = Result<T, AppError>;
