//! # Scoring Engine
//!
//! Pure functions from KPI values to an overall percentage, a tier, and the
//! distance to the next tier.
//!
//! All results are finite. Division by zero never leaks `NaN` or `Infinity`:
//!
//! | divisor | dividend | attainment |
//! |---------|----------|------------|
//! | 0       | 0        | 0%         |
//! | 0       | > 0      | 100%       |
//! | 0       | < 0      | 0%         |
//!
//! A ratio that overflows to `+inf` is treated like a positive dividend over
//! zero and scores 100%. `NaN` and `-inf` score 0%.
//!
//! A store's tier is never stored: it is recomputed from the KPI values on
//! every read.

use crate::tier::{TierConfig, TierLadder};
use crate::types::{Kpi, RewardTable, Store, StoreTier};
use serde::{Deserialize, Serialize};

/// Attainment when the divisor is zero.
fn zero_divisor_attainment(dividend: f64) -> f64 {
    if dividend > 0.0 { 100.0 } else { 0.0 }
}

/// Raw attainment percentage of a KPI.
///
/// Higher-is-better: `actual / target * 100`.
/// Lower-is-better: `target / actual * 100`.
///
/// Not clamped: over-achievement exceeds 100 and negative inputs can
/// go below 0.
#[must_use]
pub fn kpi_attainment(kpi: &Kpi) -> f64 {
    let (dividend, divisor) = if kpi.direction.is_inverted() {
        (kpi.target, kpi.actual)
    } else {
        (kpi.actual, kpi.target)
    };

    if divisor == 0.0 {
        return zero_divisor_attainment(dividend);
    }

    let ratio = dividend / divisor * 100.0;
    if ratio.is_finite() {
        ratio
    } else if ratio == f64::INFINITY {
        zero_divisor_attainment(1.0)
    } else {
        0.0
    }
}

/// Attainment clamped to `[0, 100]`.
#[must_use]
pub fn clamped_attainment(kpi: &Kpi) -> f64 {
    kpi_attainment(kpi).clamp(0.0, 100.0)
}

/// What one KPI adds to the overall score: `clamped * weight / 100`.
///
/// A non-finite weight contributes nothing.
#[must_use]
pub fn weighted_contribution(kpi: &Kpi) -> f64 {
    let contribution = clamped_attainment(kpi) * kpi.weight / 100.0;
    if contribution.is_finite() {
        contribution
    } else {
        0.0
    }
}

/// Overall performance of a store, rounded half away from zero.
///
/// Weights are used as given: a total under 100 caps the best score below
/// 100, a total over 100 allows scores above 100. Only per-KPI attainment
/// is clamped. An empty KPI list scores 0.
///
/// Contributions are summed in sorted order so the result does not depend
/// on the order of `store.kpis`.
#[must_use]
pub fn overall_performance(store: &Store) -> i64 {
    let mut contributions: Vec<f64> = store.kpis.iter().map(weighted_contribution).collect();
    contributions.sort_by(f64::total_cmp);
    let total: f64 = contributions.iter().sum();
    // Float-to-int `as` saturates.
    total.round() as i64
}

/// The highest rung whose minimum is at or below `overall`.
///
/// Total: scores below every rung (negative scores) land on the floor.
#[must_use]
pub fn resolve_tier(overall: i64, ladder: &TierLadder) -> &TierConfig {
    ladder
        .iter()
        .rev()
        .find(|rung| rung.min_percentage <= overall)
        .unwrap_or_else(|| ladder.floor())
}

/// The rung directly above `current`, or `None` at the top.
///
/// Also `None` when `current` is not part of `ladder`.
#[must_use]
pub fn resolve_next_tier<'a>(current: &TierConfig, ladder: &'a TierLadder) -> Option<&'a TierConfig> {
    let index = ladder.position(current.tier)?;
    ladder.get(index + 1)
}

/// A store's configured reward for a tier.
///
/// Reads the store overlay only. A tier missing from the overlay yields 0,
/// not the ladder default.
#[must_use]
pub fn reward_for(rewards: &RewardTable, tier: StoreTier) -> f64 {
    rewards.get(&tier).copied().unwrap_or(0.0)
}

/// Distance from the current score to the next tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierProgress {
    /// Percentage points still needed. Never negative.
    pub missing_percentage: i64,
    /// Extra reward the next tier pays over the current one.
    pub missing_reward: f64,
}

/// Progress toward `next`, or `None` when there is no next tier
/// (max tier reached).
#[must_use]
pub fn progress_to_next(
    overall: i64,
    current: &TierConfig,
    next: Option<&TierConfig>,
    rewards: &RewardTable,
) -> Option<TierProgress> {
    let next = next?;
    Some(TierProgress {
        missing_percentage: next.min_percentage.saturating_sub(overall).max(0),
        missing_reward: reward_for(rewards, next.tier) - reward_for(rewards, current.tier),
    })
}

// =============================================================================
// TESTS
// =============================================================================
