//! # Tier Ladder
//!
//! The static, process-wide reward ladder.
//!
//! A ladder is an ordered list of rungs, ascending by minimum percentage.
//! Construction validates the two invariants every lookup relies on:
//! - the first rung starts at 0%, so every score has a tier
//! - minimum percentages are strictly increasing

use crate::error::{CoreError, CoreResult};
use crate::types::StoreTier;
use serde::{Deserialize, Serialize};

/// One rung of the ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierConfig {
    pub tier: StoreTier,
    /// Minimum overall percentage that qualifies for this tier.
    pub min_percentage: i64,
    /// Default reward. Seeds new stores; not a read-time fallback.
    pub reward_value: f64,
    pub color: String,
    pub icon: String,
}

impl TierConfig {
    #[must_use]
    pub fn new(
        tier: StoreTier,
        min_percentage: i64,
        reward_value: f64,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            tier,
            min_percentage,
            reward_value,
            color: color.into(),
            icon: icon.into(),
        }
    }
}

/// A validated tier ladder, ascending by `min_percentage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TierLadder {
    rungs: Vec<TierConfig>,
}

impl TierLadder {
    /// Build a ladder, checking floor, ordering and uniqueness.
    pub fn new(rungs: Vec<TierConfig>) -> CoreResult<Self> {
        let first = rungs.first().ok_or(CoreError::EmptyLadder)?;
        if first.min_percentage != 0 {
            return Err(CoreError::LadderFloor {
                tier: first.tier,
                min: first.min_percentage,
            });
        }

        for pair in rungs.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.min_percentage <= previous.min_percentage {
                return Err(CoreError::LadderOrder {
                    tier: current.tier,
                    min: current.min_percentage,
                    previous: previous.min_percentage,
                });
            }
        }

        for (i, rung) in rungs.iter().enumerate() {
            if rungs[..i].iter().any(|r| r.tier == rung.tier) {
                return Err(CoreError::DuplicateTier(rung.tier));
            }
        }

        Ok(Self { rungs })
    }

    /// The standard Varejo Elite ladder.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            rungs: vec![
                TierConfig::new(StoreTier::None, 0, 0.0, "bg-slate-400", "fa-star-half-stroke"),
                TierConfig::new(StoreTier::Bronze, 60, 1500.0, "bg-amber-600", "fa-medal"),
                TierConfig::new(StoreTier::Silver, 75, 4000.0, "bg-slate-300", "fa-award"),
                TierConfig::new(StoreTier::Gold, 85, 8000.0, "bg-yellow-400", "fa-trophy"),
                TierConfig::new(StoreTier::Elite, 95, 15000.0, "bg-cyan-400", "fa-crown"),
            ],
        }
    }

    /// The lowest rung (always 0%).
    #[must_use]
    pub fn floor(&self) -> &TierConfig {
        // Non-empty by construction.
        &self.rungs[0]
    }

    /// The highest rung.
    #[must_use]
    pub fn top(&self) -> &TierConfig {
        &self.rungs[self.rungs.len() - 1]
    }

    /// Rungs in ascending order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TierConfig> {
        self.rungs.iter()
    }

    /// Position of a tier in the ladder.
    #[must_use]
    pub fn position(&self, tier: StoreTier) -> Option<usize> {
        self.rungs.iter().position(|r| r.tier == tier)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TierConfig> {
        self.rungs.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rungs.len()
    }

    /// Always false for a constructed ladder.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rungs.is_empty()
    }
}

impl Default for TierLadder {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'de> Deserialize<'de> for TierLadder {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rungs = Vec::<TierConfig>::deserialize(deserializer)?;
        TierLadder::new(rungs).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rung(tier: StoreTier, min: i64) -> TierConfig {
        TierConfig::new(tier, min, 0.0, "", "")
    }

    #[test]
    fn standard_ladder_is_valid() {
        let standard = TierLadder::standard();
        let rebuilt = TierLadder::new(standard.iter().cloned().collect());
        assert!(rebuilt.is_ok());
        assert_eq!(standard.len(), 5);
        assert_eq!(standard.floor().tier, StoreTier::None);
        assert_eq!(standard.top().tier, StoreTier::Elite);
    }

    #[test]
    fn empty_ladder_rejected() {
        assert!(matches!(TierLadder::new(vec![]), Err(CoreError::EmptyLadder)));
    }

    #[test]
    fn floor_must_start_at_zero() {
        let result = TierLadder::new(vec![rung(StoreTier::Bronze, 10)]);
        assert!(matches!(result, Err(CoreError::LadderFloor { min: 10, .. })));
    }

    #[test]
    fn rungs_must_strictly_increase() {
        let result = TierLadder::new(vec![
            rung(StoreTier::None, 0),
            rung(StoreTier::Bronze, 60),
            rung(StoreTier::Silver, 60),
        ]);
        assert!(matches!(
            result,
            Err(CoreError::LadderOrder {
                tier: StoreTier::Silver,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_tier_rejected() {
        let result = TierLadder::new(vec![rung(StoreTier::None, 0), rung(StoreTier::None, 10)]);
        assert!(matches!(result, Err(CoreError::DuplicateTier(StoreTier::None))));
    }

    #[test]
    fn deserialization_validates() {
        let bad = r#"[{"tier":"Bronze","minPercentage":5,"rewardValue":0,"color":"","icon":""}]"#;
        assert!(serde_json::from_str::<TierLadder>(bad).is_err());

        let json = serde_json::to_string(&TierLadder::standard()).unwrap_or_default();
        let back: Result<TierLadder, _> = serde_json::from_str(&json);
        assert_eq!(back.ok(), Some(TierLadder::standard()));
    }
}
