//! # Scorecard
//!
//! The client dashboard as a value: per-KPI lines, overall score, current
//! and next tier with the store's rewards, and the tier track.
//!
//! A scorecard is recomputed from the store on every read; it is never
//! persisted.

use crate::scoring::{
    TierProgress, clamped_attainment, kpi_attainment, overall_performance, progress_to_next,
    resolve_next_tier, resolve_tier, reward_for, weighted_contribution,
};
use crate::tier::TierLadder;
use crate::types::{KpiCategory, KpiDirection, Store, StoreTier};
use serde::{Deserialize, Serialize};

/// One KPI as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiLine {
    pub id: String,
    pub name: String,
    pub category: KpiCategory,
    pub direction: KpiDirection,
    pub unit: String,
    pub target: f64,
    pub actual: f64,
    pub weight: f64,
    /// Raw attainment, may exceed 100.
    pub attainment: f64,
    /// Attainment clamped to [0, 100]; drives the progress bar.
    pub clamped: f64,
    /// Rounded raw attainment as displayed.
    pub display_percentage: i64,
    /// Share of the overall score.
    pub contribution: f64,
}

/// One rung on the tier track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierMarker {
    pub tier: StoreTier,
    pub min_percentage: i64,
    pub reward: f64,
    pub color: Option<String>,
    pub reached: bool,
    /// First rung not yet reached.
    pub is_next: bool,
}

/// Computed dashboard for one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub store_id: String,
    pub fantasia: String,
    pub manager: String,
    pub last_update: String,
    pub overall: i64,
    pub tier: StoreTier,
    pub current_reward: f64,
    pub next_tier: Option<StoreTier>,
    pub next_reward: Option<f64>,
    /// `None` at the top of the ladder.
    pub progress: Option<TierProgress>,
    pub kpis: Vec<KpiLine>,
    pub track: Vec<TierMarker>,
}

impl Scorecard {
    /// Compute the scorecard of `store` on `ladder`.
    #[must_use]
    pub fn for_store(store: &Store, ladder: &TierLadder) -> Self {
        let overall = overall_performance(store);
        let current = resolve_tier(overall, ladder);
        let next = resolve_next_tier(current, ladder);
        let rewards = &store.custom_rewards;

        let kpis = store
            .kpis
            .iter()
            .map(|kpi| {
                let attainment = kpi_attainment(kpi);
                KpiLine {
                    id: kpi.id.clone(),
                    name: kpi.name.clone(),
                    category: kpi.category,
                    direction: kpi.direction,
                    unit: kpi.unit.clone(),
                    target: kpi.target,
                    actual: kpi.actual,
                    weight: kpi.weight,
                    attainment,
                    clamped: clamped_attainment(kpi),
                    display_percentage: attainment.round() as i64,
                    contribution: weighted_contribution(kpi),
                }
            })
            .collect();

        let mut next_marked = false;
        let track = ladder
            .iter()
            .map(|rung| {
                let reached = overall >= rung.min_percentage;
                let is_next = !reached && !next_marked;
                next_marked |= is_next;
                TierMarker {
                    tier: rung.tier,
                    min_percentage: rung.min_percentage,
                    reward: reward_for(rewards, rung.tier),
                    color: store.tier_colors.get(&rung.tier).cloned(),
                    reached,
                    is_next,
                }
            })
            .collect();

        Self {
            store_id: store.id.clone(),
            fantasia: store.fantasia.clone(),
            manager: store.manager.clone(),
            last_update: store.last_update.clone(),
            overall,
            tier: current.tier,
            current_reward: reward_for(rewards, current.tier),
            next_tier: next.map(|n| n.tier),
            next_reward: next.map(|n| reward_for(rewards, n.tier)),
            progress: progress_to_next(overall, current, next, rewards),
            kpis,
            track,
        }
    }

    /// True when the store sits on the top rung.
    #[must_use]
    pub fn is_max_tier(&self) -> bool {
        self.next_tier.is_none()
    }

    /// Format as plain text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("┌─────────────────────────────────────┐\n");
        output.push_str(&format!("│ {} ({})\n", self.fantasia, self.manager));
        output.push_str(&format!("│ Atualizado em {}\n", self.last_update));
        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str(&format!("│ Pontuação geral: {}%\n", self.overall));
        output.push_str(&format!(
            "│ Nível atual: {} (R$ {:.2})\n",
            self.tier, self.current_reward
        ));

        match (&self.next_tier, &self.progress) {
            (Some(next), Some(progress)) => {
                output.push_str(&format!(
                    "│ Faltam {}% para o nível {} (+R$ {:.2})\n",
                    progress.missing_percentage, next, progress.missing_reward
                ));
            }
            _ => output.push_str("│ Nível máximo alcançado!\n"),
        }

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str("│ INDICADORES\n");

        if self.kpis.is_empty() {
            output.push_str("│ - (nenhum)\n");
        } else {
            for line in &self.kpis {
                output.push_str(&format!(
                    "│ - {} [{}]: {}{} / {}{} = {}% (peso {}%, +{:.2})\n",
                    line.name,
                    line.category,
                    line.actual,
                    line.unit,
                    line.target,
                    line.unit,
                    line.display_percentage,
                    line.weight,
                    line.contribution
                ));
            }
        }

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str("│ TRILHA\n");
        for marker in &self.track {
            let mark = if marker.reached {
                "■"
            } else if marker.is_next {
                "▶"
            } else {
                "□"
            };
            output.push_str(&format!(
                "│ {} {} {}%+\n",
                mark, marker.tier, marker.min_percentage
            ));
        }

        output.push_str("└─────────────────────────────────────┘\n");

        output
    }
}

// =============================================================================
// TESTS
// =============================================================================
