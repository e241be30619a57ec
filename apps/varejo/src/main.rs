//! `varejo` command-line entry point.

use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use varejo::cli::{self, NewStore};
use varejo::config::AppConfig;
use varejo::error::AppResult;
use varejo::logging::init_tracing;
use varejo_core::editing::KpiDraft;
use varejo_core::{KpiCategory, KpiDirection, StoreTier};

#[derive(Parser)]
#[command(name = "varejo", version, about = "Varejo Elite retail performance scorecard")]
struct Cli {
    /// Database file (overrides VAREJO_DB).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database with the demo store.
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Log in with a store code, or with the admin password.
    Login {
        credential: String,
        #[arg(long)]
        admin: bool,
    },
    Logout,
    /// Show the current session.
    Whoami,
    /// Show the reward ladder.
    Tiers {
        #[arg(long)]
        json: bool,
    },
    /// Show a store's scorecard.
    Dashboard {
        #[arg(long)]
        store: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// List all stores (admin).
    Stores {
        #[arg(long)]
        json: bool,
    },
    /// Register a store (admin).
    StoreAdd {
        #[arg(long)]
        code: String,
        #[arg(long)]
        razao_social: String,
        #[arg(long)]
        fantasia: String,
        #[arg(long)]
        manager: String,
    },
    /// Add a KPI to a store (admin).
    KpiAdd {
        #[arg(long)]
        store: Option<usize>,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        category: Option<KpiCategory>,
        #[arg(long, default_value_t = 0.0)]
        target: f64,
        #[arg(long, default_value_t = 0.0)]
        actual: f64,
        #[arg(long, default_value = "")]
        unit: String,
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        direction: Option<KpiDirection>,
    },
    /// Set one KPI field (admin).
    KpiSet {
        #[arg(long)]
        store: Option<usize>,
        kpi_id: String,
        field: String,
        value: String,
    },
    /// Set a store's reward for a tier (admin).
    RewardSet {
        #[arg(long)]
        store: Option<usize>,
        tier: StoreTier,
        amount: f64,
    },
    /// Set a store's color for a tier (admin).
    ColorSet {
        #[arg(long)]
        store: Option<usize>,
        tier: StoreTier,
        color: String,
    },
    /// Write a dated JSON backup (admin).
    Export {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Replace all stores with a backup (admin).
    Import { file: PathBuf },
    /// Erase all data (admin).
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Pull stores from the remote backend.
    Sync,
    /// Run the HTTP API.
    Serve,
}

/// Ask for the reset confirmation on stdin.
fn confirm_reset() -> AppResult<bool> {
    print!("{} [s/N] ", cli::RESET_PROMPT);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes"))
}

async fn run(cli: Cli, config: AppConfig) -> AppResult<()> {
    match cli.command {
        Command::Init { force } => cli::cmd_init(&config, force),
        Command::Login { credential, admin } => {
            cli::cmd_login(&config, &credential, admin).map(|_| ())
        }
        Command::Logout => cli::cmd_logout(&config),
        Command::Whoami => cli::cmd_whoami(&config).map(|_| ()),
        Command::Tiers { json } => cli::cmd_tiers(json),
        Command::Dashboard { store, json } => cli::cmd_dashboard(&config, store, json).map(|_| ()),
        Command::Stores { json } => cli::cmd_stores(&config, json).map(|_| ()),
        Command::StoreAdd {
            code,
            razao_social,
            fantasia,
            manager,
        } => {
            let new = NewStore {
                code,
                razao_social,
                fantasia,
                manager,
            };
            cli::cmd_store_add(&config, new).await.map(|_| ())
        }
        Command::KpiAdd {
            store,
            name,
            description,
            category,
            target,
            actual,
            unit,
            weight,
            direction,
        } => {
            let draft = KpiDraft {
                name,
                description,
                category,
                target,
                actual,
                unit,
                weight,
                direction,
            };
            cli::cmd_kpi_add(&config, store, draft).await.map(|_| ())
        }
        Command::KpiSet {
            store,
            kpi_id,
            field,
            value,
        } => cli::cmd_kpi_set(&config, store, &kpi_id, &field, &value).await,
        Command::RewardSet {
            store,
            tier,
            amount,
        } => cli::cmd_reward_set(&config, store, tier, amount).await,
        Command::ColorSet { store, tier, color } => {
            cli::cmd_color_set(&config, store, tier, &color).await
        }
        Command::Export { out } => cli::cmd_export(&config, &out).map(|_| ()),
        Command::Import { file } => cli::cmd_import(&config, &file).await.map(|_| ()),
        Command::Reset { yes } => {
            cli::cmd_reset(&config, || if yes { Ok(true) } else { confirm_reset() }).await
        }
        Command::Sync => cli::cmd_sync(&config).await.map(|_| ()),
        Command::Serve => varejo::api::serve(&config).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_level);
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
