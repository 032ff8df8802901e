//! Reward claim REST API: event catalog and claim orchestration.

use reward_api::{config::ServiceConfig, server};
use reward_claim::{ClaimOrchestrator, EventCatalog};
use reward_delegate::{HttpConditionValidator, HttpRewardDisburser};
use reward_store::{ClaimLogStore, EventStore, InMemoryClaimLogStore, InMemoryEventStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Stores = (Arc<dyn EventStore>, Arc<dyn ClaimLogStore>);

#[cfg(feature = "sqlite")]
fn open_stores(cfg: &ServiceConfig) -> Result<Stores, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(path) = &cfg.sqlite_path {
        tracing::info!(path = %path.display(), "using SQLite stores");
        let events = reward_store::SqliteEventStore::new(path)?;
        let logs = reward_store::SqliteClaimLogStore::new(path)?;
        return Ok((Arc::new(events), Arc::new(logs)));
    }
    Ok(in_memory_stores())
}

#[cfg(not(feature = "sqlite"))]
fn open_stores(cfg: &ServiceConfig) -> Result<Stores, Box<dyn std::error::Error + Send + Sync>> {
    if cfg.sqlite_path.is_some() {
        tracing::warn!("REWARD_SQLITE_PATH set but built without the sqlite feature; using in-memory stores");
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> Stores {
    (
        Arc::new(InMemoryEventStore::new()),
        Arc::new(InMemoryClaimLogStore::new()),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = ServiceConfig::from_env()?;
    let (events, logs) = open_stores(&cfg)?;
    let validator = HttpConditionValidator::from_config(&cfg.delegates)?;
    let disburser = HttpRewardDisburser::from_config(&cfg.delegates)?;

    let state = Arc::new(server::AppState {
        catalog: Arc::new(EventCatalog::new(events.clone())),
        claims: Arc::new(ClaimOrchestrator::new(
            events,
            logs,
            Arc::new(validator),
            Arc::new(disburser),
        )),
    });

    let app = server::router(state);
    tracing::info!(
        validation_url = %cfg.delegates.validation_url,
        reward_url = %cfg.delegates.reward_url,
        "reward API listening on {}",
        cfg.listen
    );
    axum::serve(
        tokio::net::TcpListener::bind(cfg.listen).await?,
        app.into_make_service(),
    )
    .await?;
    Ok(())
}
