//! # Editing
//!
//! Administrator mutations on the store list. Stores and KPIs are edited in
//! place; nothing is ever deleted. Timestamps and generated ids come from the
//! caller so this module stays clock-free.

use crate::error::{CoreError, CoreResult};
use crate::types::{Kpi, KpiCategory, KpiDirection, Store, StoreTier};
use std::str::FromStr;

/// Weight given to a new KPI when none (or zero) is supplied.
pub const DEFAULT_KPI_WEIGHT: f64 = 25.0;

/// Input for a new KPI. Empty or zero fields fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct KpiDraft {
    pub name: String,
    pub description: String,
    pub category: Option<KpiCategory>,
    pub target: f64,
    pub actual: f64,
    pub unit: String,
    pub weight: Option<f64>,
    pub direction: Option<KpiDirection>,
}

impl KpiDraft {
    /// Materialize the draft with the given id.
    #[must_use]
    pub fn into_kpi(self, id: impl Into<String>) -> Kpi {
        let name = if self.name.trim().is_empty() {
            "Novo KPI".to_owned()
        } else {
            self.name
        };
        let unit = if self.unit.is_empty() {
            "%".to_owned()
        } else {
            self.unit
        };
        let weight = match self.weight {
            Some(w) if w != 0.0 && w.is_finite() => w,
            _ => DEFAULT_KPI_WEIGHT,
        };
        let direction = self
            .direction
            .unwrap_or_else(|| KpiDirection::infer_from_name(&name));

        Kpi {
            id: id.into(),
            name,
            description: self.description,
            category: self.category.unwrap_or(KpiCategory::Finance),
            target: finite_or_zero(self.target),
            actual: finite_or_zero(self.actual),
            unit,
            weight,
            direction,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// An editable KPI field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpiField {
    Target,
    Actual,
    Weight,
    Name,
    Description,
    Unit,
    Category,
    Direction,
}

impl FromStr for KpiField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "target" | "meta" => Ok(KpiField::Target),
            "actual" | "realizado" => Ok(KpiField::Actual),
            "weight" | "peso" => Ok(KpiField::Weight),
            "name" | "nome" => Ok(KpiField::Name),
            "description" | "descricao" => Ok(KpiField::Description),
            "unit" | "unidade" => Ok(KpiField::Unit),
            "category" | "categoria" => Ok(KpiField::Category),
            "direction" => Ok(KpiField::Direction),
            _ => Err(CoreError::UnknownField(s.to_owned())),
        }
    }
}

fn parse_number(field: &'static str, value: &str) -> CoreResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoreError::InvalidValue {
            field,
            value: value.to_owned(),
        })
}

/// Append a store. Codes are login credentials and must stay unique.
pub fn add_store(stores: &mut Vec<Store>, store: Store) -> CoreResult<()> {
    if stores.iter().any(|s| s.code == store.code) {
        return Err(CoreError::DuplicateCode(store.code));
    }
    stores.push(store);
    Ok(())
}

/// Replace the store with the same id. Returns false if there is none.
pub fn replace_store(stores: &mut [Store], updated: Store) -> bool {
    match stores.iter_mut().find(|s| s.id == updated.id) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

/// Append a KPI built from `draft`.
pub fn add_kpi(store: &mut Store, id: impl Into<String>, draft: KpiDraft) -> &Kpi {
    store.kpis.push(draft.into_kpi(id));
    &store.kpis[store.kpis.len() - 1]
}

/// Set one KPI field from its textual value and stamp `last_update`.
pub fn edit_kpi(
    store: &mut Store,
    kpi_id: &str,
    field: KpiField,
    value: &str,
    stamp: &str,
) -> CoreResult<()> {
    let kpi = store
        .kpis
        .iter_mut()
        .find(|k| k.id == kpi_id)
        .ok_or_else(|| CoreError::KpiNotFound(kpi_id.to_owned()))?;

    match field {
        KpiField::Target => kpi.target = parse_number("target", value)?,
        KpiField::Actual => kpi.actual = parse_number("actual", value)?,
        KpiField::Weight => kpi.weight = parse_number("weight", value)?,
        KpiField::Name => kpi.name = value.to_owned(),
        KpiField::Description => kpi.description = value.to_owned(),
        KpiField::Unit => kpi.unit = value.to_owned(),
        KpiField::Category => {
            kpi.category = value.parse().map_err(|_| CoreError::InvalidValue {
                field: "category",
                value: value.to_owned(),
            })?;
        }
        KpiField::Direction => {
            kpi.direction = value.parse().map_err(|_| CoreError::InvalidValue {
                field: "direction",
                value: value.to_owned(),
            })?;
        }
    }

    store.last_update = stamp.to_owned();
    Ok(())
}

/// Set the store's reward for a tier.
pub fn set_reward(store: &mut Store, tier: StoreTier, amount: f64) -> CoreResult<()> {
    if !amount.is_finite() {
        return Err(CoreError::InvalidValue {
            field: "reward",
            value: amount.to_string(),
        });
    }
    store.custom_rewards.insert(tier, amount);
    Ok(())
}

/// Set the store's display color for a tier.
pub fn set_tier_color(store: &mut Store, tier: StoreTier, color: impl Into<String>) {
    store.tier_colors.insert(tier, color.into());
}

// =============================================================================
// TESTS
// =============================================================================
