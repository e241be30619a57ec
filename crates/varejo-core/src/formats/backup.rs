//! JSON backup format.
//!
//! A backup is a top-level JSON array of store objects, indented by two
//! spaces. The same bytes are the persisted state of every backend, so an
//! export followed by an import yields the same store list.

use crate::error::{CoreError, CoreResult};
use crate::types::Store;

/// Prefix of exported backup files.
pub const BACKUP_FILE_PREFIX: &str = "varejo-elite-db-backup-";

/// Serialize stores as an indented JSON array.
pub fn encode_backup(stores: &[Store]) -> CoreResult<Vec<u8>> {
    serde_json::to_vec_pretty(stores).map_err(|e| CoreError::Encode(e.to_string()))
}

/// Serialize stores as compact JSON (local and remote persistence).
pub fn encode_compact(stores: &[Store]) -> CoreResult<String> {
    serde_json::to_string(stores).map_err(|e| CoreError::Encode(e.to_string()))
}

/// Parse a backup.
///
/// Fails with [`CoreError::Malformed`] if the bytes are not JSON,
/// [`CoreError::NotAnArray`] if the root is not an array, and
/// [`CoreError::InvalidStore`] if an element does not describe a store.
pub fn decode_backup(bytes: &[u8]) -> CoreResult<Vec<Store>> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| CoreError::Malformed(e.to_string()))?;

    if !value.is_array() {
        return Err(CoreError::NotAnArray);
    }

    serde_json::from_value(value).map_err(|e| CoreError::InvalidStore(e.to_string()))
}

/// File name for a backup taken on `date` (`YYYY-MM-DD`).
#[must_use]
pub fn backup_file_name(date: &str) -> String {
    format!("{BACKUP_FILE_PREFIX}{date}.json")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::types::{KpiDirection, StoreTier};

    #[test]
    fn export_then_import_is_identity() {
        let mut stores = seed::initial_stores();
        stores.push(seed::new_store("2", "2002", "B LTDA", "Loja B", "Ana", "01/02/2024"));
        stores[1].custom_rewards.insert(StoreTier::Gold, 1234.56);
        stores[1].kpis[0].actual = 0.1 + 0.2;

        let bytes = encode_backup(&stores).unwrap();
        let restored = decode_backup(&bytes).unwrap();
        assert_eq!(restored, stores);
    }

    #[test]
    fn export_is_indented() {
        let bytes = encode_backup(&seed::initial_stores()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("[\n  {\n    \"id\": \"1\""));
        assert!(text.contains("\"razaoSocial\""));
        assert!(text.contains("\"Elite (Diamante)\""));
    }

    #[test]
    fn object_root_is_rejected() {
        let result = decode_backup(br#"{"stores": []}"#);
        assert!(matches!(result, Err(CoreError::NotAnArray)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(decode_backup(b"not json"), Err(CoreError::Malformed(_))));
    }

    #[test]
    fn bad_element_is_rejected() {
        let result = decode_backup(br#"[{"id": 1}]"#);
        assert!(matches!(result, Err(CoreError::InvalidStore(_))));
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(decode_backup(b"[]").unwrap().is_empty());
    }

    #[test]
    fn legacy_backup_gets_directions() {
        let legacy = r##"[{
            "id": "7", "code": "7007", "razaoSocial": "R", "fantasia": "F",
            "manager": "M", "lastUpdate": "2023-01-01",
            "customRewards": {"Bronze": 1500}, "tierColors": {"Bronze": "#d97706"},
            "kpis": [
              {"id": "a", "name": "Custo Logístico", "description": "", "category": "Operacional",
               "target": 10, "actual": 12, "unit": "%", "weight": 50}
            ]
        }]"##;
        let stores = decode_backup(legacy.as_bytes()).unwrap();
        assert_eq!(stores[0].kpis[0].direction, KpiDirection::LowerIsBetter);
        assert_eq!(stores[0].custom_rewards.get(&StoreTier::Bronze), Some(&1500.0));
    }

    #[test]
    fn file_name_is_dated() {
        assert_eq!(
            backup_file_name("2024-03-09"),
            "varejo-elite-db-backup-2024-03-09.json"
        );
    }
}
