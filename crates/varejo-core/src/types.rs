//! # Data Model
//!
//! Stores, their KPIs and the per-store reward/color overlays.
//!
//! The JSON shape of these types is the persisted-state schema: the same
//! structures are written to local storage, mirrored to remote backends and
//! exported as backups, so field names and labels must stay stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// TIERS
// =============================================================================

/// A named performance band.
///
/// Variants are declared in ladder order, so `Ord` follows the ladder.
/// The serialized labels are the display labels used as map keys in
/// `customRewards` and `tierColors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StoreTier {
    #[serde(rename = "Iniciante")]
    None,
    #[serde(rename = "Bronze")]
    Bronze,
    #[serde(rename = "Prata")]
    Silver,
    #[serde(rename = "Ouro")]
    Gold,
    #[serde(rename = "Elite (Diamante)")]
    Elite,
}

impl StoreTier {
    /// All tiers in ladder order.
    pub const ALL: [StoreTier; 5] = [
        StoreTier::None,
        StoreTier::Bronze,
        StoreTier::Silver,
        StoreTier::Gold,
        StoreTier::Elite,
    ];

    /// The persisted display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            StoreTier::None => "Iniciante",
            StoreTier::Bronze => "Bronze",
            StoreTier::Silver => "Prata",
            StoreTier::Gold => "Ouro",
            StoreTier::Elite => "Elite (Diamante)",
        }
    }
}

impl fmt::Display for StoreTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StoreTier {
    type Err = String;

    /// Accepts the display label or the short English name, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        StoreTier::ALL
            .into_iter()
            .find(|tier| {
                tier.label().to_lowercase() == wanted
                    || format!("{tier:?}").to_lowercase() == wanted
            })
            .ok_or_else(|| format!("unknown tier: {s}"))
    }
}

/// Reward amount per tier, as configured for one store.
pub type RewardTable = BTreeMap<StoreTier, f64>;

/// Display color per tier, as configured for one store.
pub type ColorTable = BTreeMap<StoreTier, String>;

// =============================================================================
// KPI
// =============================================================================

/// Presentation grouping of a KPI. Has no effect on scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KpiCategory {
    #[serde(rename = "Financeiro")]
    Finance,
    #[serde(rename = "Crescimento")]
    Growth,
    #[serde(rename = "Mercado")]
    Market,
    #[serde(rename = "Operacional")]
    Logistics,
}

impl KpiCategory {
    pub const ALL: [KpiCategory; 4] = [
        KpiCategory::Finance,
        KpiCategory::Growth,
        KpiCategory::Market,
        KpiCategory::Logistics,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            KpiCategory::Finance => "Financeiro",
            KpiCategory::Growth => "Crescimento",
            KpiCategory::Market => "Mercado",
            KpiCategory::Logistics => "Operacional",
        }
    }
}

impl fmt::Display for KpiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for KpiCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        KpiCategory::ALL
            .into_iter()
            .find(|c| {
                c.label().to_lowercase() == wanted || format!("{c:?}").to_lowercase() == wanted
            })
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Which way a KPI improves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KpiDirection {
    /// Attainment is `actual / target`.
    #[default]
    HigherIsBetter,
    /// Attainment is `target / actual` (losses, costs).
    LowerIsBetter,
}

impl KpiDirection {
    /// Legacy rule: a name mentioning "perda" (loss) or "custo" (cost) marks
    /// an inverted KPI. Only used when decoding records that predate the
    /// explicit `direction` field.
    #[must_use]
    pub fn infer_from_name(name: &str) -> Self {
        let lowered = name.to_lowercase();
        if lowered.contains("perda") || lowered.contains("custo") {
            KpiDirection::LowerIsBetter
        } else {
            KpiDirection::HigherIsBetter
        }
    }

    #[must_use]
    pub fn is_inverted(self) -> bool {
        self == KpiDirection::LowerIsBetter
    }
}

impl FromStr for KpiDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "higher" | "higherisbetter" | "higher-is-better" => Ok(KpiDirection::HigherIsBetter),
            "lower" | "lowerisbetter" | "lower-is-better" => Ok(KpiDirection::LowerIsBetter),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// A single measured indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "KpiRecord")]
pub struct Kpi {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: KpiCategory,
    pub target: f64,
    pub actual: f64,
    pub unit: String,
    /// Contribution weight on the 0-100 scale. Totals per store are not enforced.
    pub weight: f64,
    pub direction: KpiDirection,
}

impl Kpi {
    /// Create a higher-is-better KPI with an empty description.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: KpiCategory,
        target: f64,
        actual: f64,
        unit: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            target,
            actual,
            unit: unit.into(),
            weight,
            direction: KpiDirection::HigherIsBetter,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: KpiDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// Wire form of a KPI. `direction` and `description` may be absent in
/// older backups.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KpiRecord {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    category: KpiCategory,
    target: f64,
    actual: f64,
    unit: String,
    weight: f64,
    #[serde(default)]
    direction: Option<KpiDirection>,
}

impl From<KpiRecord> for Kpi {
    fn from(record: KpiRecord) -> Self {
        let direction = record
            .direction
            .unwrap_or_else(|| KpiDirection::infer_from_name(&record.name));
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            category: record.category,
            target: record.target,
            actual: record.actual,
            unit: record.unit,
            weight: record.weight,
            direction,
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

/// A managed retail unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    /// Login credential for the store's manager. Matched exactly.
    pub code: String,
    pub razao_social: String,
    pub fantasia: String,
    pub manager: String,
    /// Display order only.
    pub kpis: Vec<Kpi>,
    pub last_update: String,
    pub custom_rewards: RewardTable,
    pub tier_colors: ColorTable,
}

impl Store {
    /// Find a KPI by id.
    #[must_use]
    pub fn kpi(&self, id: &str) -> Option<&Kpi> {
        self.kpis.iter().find(|k| k.id == id)
    }

    /// Sum of KPI weights. Informational; scoring never normalizes by it.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.kpis.iter().map(|k| k.weight).sum()
    }
}

// =============================================================================
// TESTS
// =============================================================================
