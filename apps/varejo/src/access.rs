//! # Access Gate
//!
//! Turns a submitted credential into a [`Session`] or a rejection message.
//!
//! - Admin mode: the credential must equal the configured secret.
//! - Client mode: the credential must equal a store `code` exactly
//!   (case-sensitive); the first match wins.
//!
//! There is no lockout; a rejected attempt can be retried immediately.

use crate::error::{AppError, AppResult};
use subtle::ConstantTimeEq;
use varejo_core::{Session, Store};

/// Shown when the admin secret does not match.
pub const ADMIN_REJECTED: &str = "Senha administrativa incorreta. Acesso negado.";
/// Shown when no store uses the submitted code.
pub const CLIENT_REJECTED: &str =
    "Identificador da loja inválido. Verifique o código e tente novamente.";

#[derive(Debug, Clone)]
pub struct AccessGate {
    admin_secret: String,
}

impl AccessGate {
    #[must_use]
    pub fn new(admin_secret: impl Into<String>) -> Self {
        Self {
            admin_secret: admin_secret.into(),
        }
    }

    /// Constant-time comparison against the admin secret.
    #[must_use]
    pub fn verify_admin(&self, candidate: &str) -> bool {
        self.admin_secret
            .as_bytes()
            .ct_eq(candidate.as_bytes())
            .into()
    }

    /// Authenticate a credential. Never touches persisted state.
    pub fn authenticate(
        &self,
        credential: &str,
        admin_mode: bool,
        stores: &[Store],
    ) -> AppResult<Session> {
        if admin_mode {
            return if self.verify_admin(credential) {
                Ok(Session::admin())
            } else {
                Err(AppError::AccessDenied(ADMIN_REJECTED.to_owned()))
            };
        }

        stores
            .iter()
            .position(|store| store.code == credential)
            .map(Session::client)
            .ok_or_else(|| AppError::AccessDenied(CLIENT_REJECTED.to_owned()))
    }
}
