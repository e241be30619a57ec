//! Error types for the engine.

use crate::types::StoreTier;
use thiserror::Error;

/// Errors raised by the pure engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The tier ladder has no rungs.
    #[error("tier ladder is empty")]
    EmptyLadder,

    /// The lowest rung must start at 0% so every score has a tier.
    #[error("lowest tier {tier} starts at {min}%, expected 0%")]
    LadderFloor { tier: StoreTier, min: i64 },

    /// Rungs must be strictly increasing by minimum percentage.
    #[error("tier {tier} ({min}%) does not exceed the previous rung ({previous}%)")]
    LadderOrder {
        tier: StoreTier,
        min: i64,
        previous: i64,
    },

    /// A tier appears twice in the ladder.
    #[error("tier {0} appears more than once in the ladder")]
    DuplicateTier(StoreTier),

    /// Backup content is not valid JSON.
    #[error("backup is not valid JSON: {0}")]
    Malformed(String),

    /// Backup root is valid JSON but not an array of stores.
    #[error("backup root must be a JSON array")]
    NotAnArray,

    /// An element of the backup array does not match the store schema.
    #[error("invalid store record: {0}")]
    InvalidStore(String),

    /// Serializing stores failed.
    #[error("failed to encode stores: {0}")]
    Encode(String),

    /// No KPI with the given id in the store.
    #[error("KPI not found: {0}")]
    KpiNotFound(String),

    /// Another store already uses this access code.
    #[error("store code already in use: {0}")]
    DuplicateCode(String),

    /// A numeric KPI field received a value that is not a number.
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    /// A field name that cannot be edited.
    #[error("unknown KPI field: {0}")]
    UnknownField(String),
}

/// Result alias for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;
