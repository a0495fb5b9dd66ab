use std::sync::Arc;
use std::time::Duration;

use tradox::api::router::create_router;
use tradox::config::AppConfig;
use tradox::db;
use tradox::engine::PersistFailure;
use tradox::services::failure_sink::run_failure_sink;
use tradox::services::session_sweeper::run_session_sweeper;
use tradox::store::{DocumentStore, MemoryStore, PgStore};
use tradox::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);
    let metrics_handle = tradox::metrics::init_metrics();

    // --- Document store ---
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = db::init_pool(url).await?;
            tracing::info!("Database connected");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory document store");
            Arc::new(MemoryStore::new())
        }
    };

    // --- Trade persistence failures ---
    let (failure_tx, failure_rx) = tokio::sync::mpsc::unbounded_channel::<PersistFailure>();
    tokio::spawn(run_failure_sink(failure_rx));

    tracing::info!(
        stake = %config.stake,
        payout_ratio = %config.payout_ratio,
        countdown_secs = config.countdown_secs,
        history_cap = config.history_cap,
        session_idle_secs = config.session_idle_secs,
        seeded = config.outcome_seed.is_some(),
        "Settlement engine configured"
    );

    let max_idle = Duration::from_secs(config.session_idle_secs);
    let state = AppState::new(config, store, Some(failure_tx), metrics_handle);
    let sessions = Arc::clone(&state.sessions);

    // --- Idle session sweeper ---
    tokio::spawn(run_session_sweeper(Arc::clone(&sessions), max_idle));
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sessions.clear().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}
