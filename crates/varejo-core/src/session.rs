//! # Session
//!
//! The logged-in state as an explicit value: who is logged in and which
//! store they are looking at. The app layer loads it once at startup,
//! saves it on login and clears it on logout.
//!
//! Persisted form: `{"role":"ADMIN","index":0}`.

use serde::{Deserialize, Serialize};

/// Access role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Global administration.
    Admin,
    /// A store manager, bound to one store.
    Client,
}

/// An authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub role: Role,
    /// Index of the active store in the store list.
    #[serde(rename = "index")]
    pub store_index: usize,
}

impl Session {
    /// Admin sessions start on the first store.
    #[must_use]
    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            store_index: 0,
        }
    }

    #[must_use]
    pub fn client(store_index: usize) -> Self {
        Self {
            role: Role::Client,
            store_index,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Persisted form.
    #[must_use]
    pub fn encode(&self) -> String {
        // A struct of an enum and an integer always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a persisted session. Corrupt data yields `None` and should be
    /// treated as logged out.
    #[must_use]
    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}
