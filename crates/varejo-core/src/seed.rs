//! Default data: reward and color overlays, the demo store, and the
//! template used when an administrator creates a store.

use crate::tier::TierLadder;
use crate::types::{ColorTable, Kpi, KpiCategory, RewardTable, Store, StoreTier};

/// Reward overlay copied into new stores, taken from the ladder defaults.
#[must_use]
pub fn default_rewards() -> RewardTable {
    TierLadder::standard()
        .iter()
        .map(|rung| (rung.tier, rung.reward_value))
        .collect()
}

/// Color overlay copied into new stores.
#[must_use]
pub fn default_colors() -> ColorTable {
    [
        (StoreTier::None, "#94a3b8"),
        (StoreTier::Bronze, "#d97706"),
        (StoreTier::Silver, "#cbd5e1"),
        (StoreTier::Gold, "#facc15"),
        (StoreTier::Elite, "#22d3ee"),
    ]
    .into_iter()
    .map(|(tier, color)| (tier, color.to_owned()))
    .collect()
}

/// The store list used when nothing has been persisted yet.
#[must_use]
pub fn initial_stores() -> Vec<Store> {
    vec![Store {
        id: "1".to_owned(),
        code: "1001".to_owned(),
        razao_social: "CENTRAL DE ALIMENTOS LTDA".to_owned(),
        fantasia: "Supermercado Central".to_owned(),
        manager: "Carlos Silva".to_owned(),
        last_update: "2023-11-20".to_owned(),
        custom_rewards: default_rewards(),
        tier_colors: default_colors(),
        kpis: vec![
            Kpi::new(
                "k1",
                "Meta do Trimestre",
                KpiCategory::Finance,
                1_500_000.0,
                1_250_000.0,
                "R$",
                30.0,
            )
            .with_description("Volume total de vendas brutas faturadas no período."),
            Kpi::new(
                "k2",
                "Crescimento vs Ano Anterior",
                KpiCategory::Growth,
                15.0,
                12.0,
                "%",
                25.0,
            )
            .with_description(
                "Percentual de evolução real comparado ao mesmo trimestre do ano passado.",
            ),
            Kpi::new(
                "k3",
                "Participação no PDV",
                KpiCategory::Market,
                25.0,
                22.0,
                "%",
                25.0,
            )
            .with_description("Presença de nossos produtos em gôndola e pontos extras."),
            Kpi::new(
                "k4",
                "Volume (Toneladas)",
                KpiCategory::Logistics,
                80.0,
                72.0,
                "ton",
                20.0,
            )
            .with_description("Peso total líquido de mercadorias entregues e aceitas."),
        ],
    }]
}

/// A freshly created store: default overlays and three zeroed KPIs
/// weighted 30/30/40.
#[must_use]
pub fn new_store(
    id: impl Into<String>,
    code: impl Into<String>,
    razao_social: impl Into<String>,
    fantasia: impl Into<String>,
    manager: impl Into<String>,
    last_update: impl Into<String>,
) -> Store {
    Store {
        id: id.into(),
        code: code.into(),
        razao_social: razao_social.into(),
        fantasia: fantasia.into(),
        manager: manager.into(),
        last_update: last_update.into(),
        custom_rewards: default_rewards(),
        tier_colors: default_colors(),
        kpis: vec![
            Kpi::new("k1", "Meta do Trimestre", KpiCategory::Finance, 0.0, 0.0, "R$", 30.0)
                .with_description("Volume de vendas faturadas."),
            Kpi::new("k2", "Participação no PDV", KpiCategory::Market, 0.0, 0.0, "%", 30.0)
                .with_description("Espaço ocupado em gôndola."),
            Kpi::new("k3", "Volume (Toneladas)", KpiCategory::Logistics, 0.0, 0.0, "ton", 40.0)
                .with_description("Peso total de saída."),
        ],
    }
}
