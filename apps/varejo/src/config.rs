//! # Configuration
//!
//! Runtime settings read once at startup from the environment (and a `.env`
//! file when present). The backend choice made here is final for the life
//! of the process.

use crate::error::{AppError, AppResult};
use std::path::PathBuf;

/// Placeholder shipped in unconfigured Supabase templates.
const SUPABASE_PLACEHOLDER: &str = "SUA_URL_SUPABASE";
/// Placeholder shipped in unconfigured Firebase templates.
const FIREBASE_PLACEHOLDER: &str = "PLACEHOLDER";

const DEFAULT_DB: &str = "varejo.redb";
const DEFAULT_ADMIN_SECRET: &str = "1234";
const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";

/// Which store repository mirrors the local copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Local file only.
    Local,
    Firebase {
        api_key: String,
        project_id: String,
        /// Firestore REST root, overridable for tests.
        base_url: String,
    },
    Supabase {
        url: String,
        anon_key: String,
    },
}

impl BackendConfig {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BackendConfig::Local => "local",
            BackendConfig::Firebase { .. } => "firebase",
            BackendConfig::Supabase { .. } => "supabase",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub admin_secret: String,
    pub backend: BackendConfig,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present.
    pub fn from_env() -> AppResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let var_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_owned());

        let port = var_or("PORT", "8080")
            .parse()
            .map_err(|e| AppError::Config(format!("invalid PORT: {e}")))?;

        Ok(Self {
            db_path: PathBuf::from(var_or("VAREJO_DB", DEFAULT_DB)),
            admin_secret: var_or("VAREJO_ADMIN_SECRET", DEFAULT_ADMIN_SECRET),
            backend: select_backend(&var)?,
            host: var_or("HOST", "127.0.0.1"),
            port,
            log_level: var_or("LOG_LEVEL", "info"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB),
            admin_secret: DEFAULT_ADMIN_SECRET.to_owned(),
            backend: BackendConfig::Local,
            host: "127.0.0.1".to_owned(),
            port: 8080,
            log_level: "info".to_owned(),
        }
    }
}

fn supabase(var: &impl Fn(&str) -> Option<String>) -> Option<BackendConfig> {
    let url = var("SUPABASE_URL").filter(|u| u != SUPABASE_PLACEHOLDER)?;
    let anon_key = var("SUPABASE_ANON_KEY")?;
    Some(BackendConfig::Supabase { url, anon_key })
}

fn firebase(var: &impl Fn(&str) -> Option<String>) -> Option<BackendConfig> {
    let api_key = var("FIREBASE_API_KEY").filter(|k| k != FIREBASE_PLACEHOLDER)?;
    let project_id = var("FIREBASE_PROJECT_ID")?;
    Some(BackendConfig::Firebase {
        api_key,
        project_id,
        base_url: var("FIRESTORE_BASE_URL").unwrap_or_else(|| FIRESTORE_BASE.to_owned()),
    })
}

/// Explicit `VAREJO_BACKEND` wins; otherwise the first fully configured
/// remote (Supabase, then Firebase); otherwise local.
fn select_backend(var: &impl Fn(&str) -> Option<String>) -> AppResult<BackendConfig> {
    let Some(choice) = var("VAREJO_BACKEND") else {
        return Ok(supabase(var)
            .or_else(|| firebase(var))
            .unwrap_or(BackendConfig::Local));
    };

    match choice.trim().to_lowercase().as_str() {
        "local" => Ok(BackendConfig::Local),
        "supabase" => supabase(var).ok_or_else(|| {
            AppError::Config("VAREJO_BACKEND=supabase needs SUPABASE_URL and SUPABASE_ANON_KEY".into())
        }),
        "firebase" => firebase(var).ok_or_else(|| {
            AppError::Config(
                "VAREJO_BACKEND=firebase needs FIREBASE_API_KEY and FIREBASE_PROJECT_ID".into(),
            )
        }),
        other => Err(AppError::Config(format!("unknown VAREJO_BACKEND: {other}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppResult<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("varejo.redb"));
        assert_eq!(cfg.admin_secret, "1234");
        assert_eq!(cfg.backend, BackendConfig::Local);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(matches!(config(&[("PORT", "eighty")]), Err(AppError::Config(_))));
    }

    #[test]
    fn supabase_preferred_when_both_configured() {
        let cfg = config(&[
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("FIREBASE_API_KEY", "key"),
            ("FIREBASE_PROJECT_ID", "proj"),
        ])
        .unwrap();
        assert_eq!(cfg.backend.name(), "supabase");
    }

    #[test]
    fn placeholders_fall_back_to_local() {
        let cfg = config(&[
            ("SUPABASE_URL", "SUA_URL_SUPABASE"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("FIREBASE_API_KEY", "PLACEHOLDER"),
            ("FIREBASE_PROJECT_ID", "proj"),
        ])
        .unwrap();
        assert_eq!(cfg.backend, BackendConfig::Local);
    }

    #[test]
    fn firebase_when_only_firebase_configured() {
        let cfg = config(&[("FIREBASE_API_KEY", "key"), ("FIREBASE_PROJECT_ID", "proj")]).unwrap();
        assert!(matches!(
            cfg.backend,
            BackendConfig::Firebase { ref project_id, .. } if project_id == "proj"
        ));
    }

    #[test]
    fn explicit_backend_overrides_detection() {
        let cfg = config(&[
            ("VAREJO_BACKEND", "local"),
            ("FIREBASE_API_KEY", "key"),
            ("FIREBASE_PROJECT_ID", "proj"),
        ])
        .unwrap();
        assert_eq!(cfg.backend, BackendConfig::Local);

        assert!(config(&[("VAREJO_BACKEND", "supabase")]).is_err());
        assert!(config(&[("VAREJO_BACKEND", "mongo")]).is_err());
    }

    #[test]
    fn bind_addr_formats_correctly() {
        let cfg = AppConfig {
            port: 3000,
            ..AppConfig::default()
        };
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3000");
    }
}
