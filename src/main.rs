//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use lunchvote::adapters::auth::EnvSession;
use lunchvote::adapters::persistence::{CatalogSeed, SqliteStore};
use lunchvote::adapters::ui::tui::TuiInputPort;
use lunchvote::ports::{CatalogPort, HistoryPort, InputPort, LedgerPort, SessionPort};
use lunchvote::shared::config::AppConfig;
use lunchvote::usecases::{Engine, ResetWorker};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    lunchvote::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_default();
    let data_dir = cfg.data_dir_or_default();
    let data_path = PathBuf::from(&data_dir);
    info!(path = %data_path.display(), "data directory");

    let store = Arc::new(
        SqliteStore::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );

    if let Some(seed_path) = cfg.catalog.as_deref() {
        let raw = std::fs::read_to_string(seed_path)
            .map_err(|e| anyhow::anyhow!("read catalog seed {}: {}", seed_path, e))?;
        let seed: CatalogSeed = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parse catalog seed {}: {}", seed_path, e))?;
        store
            .apply_seed(&seed, chrono::Utc::now())
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }

    let catalog: Arc<dyn CatalogPort> = Arc::clone(&store) as Arc<dyn CatalogPort>;
    let ledger: Arc<dyn LedgerPort> = Arc::clone(&store) as Arc<dyn LedgerPort>;
    let history: Arc<dyn HistoryPort> = Arc::clone(&store) as Arc<dyn HistoryPort>;

    // --- Engine context: every operation flows through here ---
    let engine = Arc::new(Engine::new(
        Arc::clone(&catalog),
        Arc::clone(&ledger),
        Arc::clone(&history),
    ));

    // --- Reset scheduler: independent background task ---
    let reset_interval = Duration::from_secs(cfg.reset_interval_secs_or_default());
    info!(
        reset_interval_secs = reset_interval.as_secs(),
        "cycle reset interval"
    );
    let reset_worker = ResetWorker::new(Arc::clone(&ledger), reset_interval);
    tokio::spawn(async move {
        reset_worker.run().await;
    });

    let session: Arc<dyn SessionPort> = Arc::new(EnvSession::new(cfg.user_id));
    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        engine,
        Arc::clone(&catalog),
        Arc::clone(&history),
        session,
    ));

    // --- Run (menu loop: today's menu / vote / tally / history / reset) ---
    input_port.run().await.map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
