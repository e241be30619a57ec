//! # Varejo Core
//!
//! The deterministic performance engine behind the Varejo Elite dashboard.
//!
//! A store is scored from its list of KPIs: every KPI yields an attainment
//! percentage, the clamped attainments are weighted and summed into an overall
//! percentage, and the overall percentage is placed on a fixed reward ladder.
//!
//! ```text
//! Kpi ──► kpi_attainment ──► clamped_attainment ──┐
//! Kpi ──► ...                                     ├─► overall_performance ──► resolve_tier
//! Kpi ──► ...                                     ┘                              │
//!                                                  resolve_next_tier ◄───────────┘
//!                                                          │
//!                                                  progress_to_next (store rewards)
//! ```
//!
//! Everything in this crate is pure: no I/O, no clocks, no randomness.
//! Persistence, sessions on disk and network backends live in the app layer.

pub mod editing;
pub mod error;
pub mod formats;
pub mod scorecard;
pub mod scoring;
pub mod seed;
pub mod session;
pub mod tier;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use scorecard::{KpiLine, Scorecard, TierMarker};
pub use scoring::{
    TierProgress, clamped_attainment, kpi_attainment, overall_performance, progress_to_next,
    resolve_next_tier, resolve_tier, reward_for, weighted_contribution,
};
pub use session::{Role, Session};
pub use tier::{TierConfig, TierLadder};
pub use types::{ColorTable, Kpi, KpiCategory, KpiDirection, RewardTable, Store, StoreTier};
