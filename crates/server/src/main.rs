mod api;
mod handlers;
mod state;
mod telegram;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use chrono::Utc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use venuewatch_catalog::{CatalogCache, WoltProvider};
use venuewatch_notify::{Messenger, TelegramMessenger};
use venuewatch_storage::{AuditLog, MemoryStore, PgAudit, PgStore, SubscriptionStore, TracingAudit};
use venuewatch_worker::RefreshScheduler;

use crate::handlers::Handlers;
use crate::state::AppState;
use crate::telegram::UpdateListener;

/// Connect to Postgres when configured, otherwise run on the in-memory
/// store. In-memory means subscriptions vanish on restart and audit events
/// only reach the logs.
async fn build_store(
    config: &venuewatch_core::Config,
) -> (Arc<dyn SubscriptionStore>, Arc<dyn AuditLog>) {
    if config.postgres.is_configured() {
        match PgStore::connect(&config.postgres).await {
            Ok(store) => {
                info!("Connected to PostgreSQL");
                let audit = PgAudit::new(store.pool().clone());
                return (Arc::new(store), Arc::new(audit));
            }
            Err(e) => {
                warn!(error = %e, "PostgreSQL connection failed, falling back to in-memory store");
            }
        }
    } else {
        warn!("PostgreSQL not configured, subscriptions will not survive restarts");
    }
    (Arc::new(MemoryStore::new()), Arc::new(TracingAudit))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    venuewatch_core::config::load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let config = venuewatch_core::Config::from_env();
    config.log_summary();

    let bot_token = config
        .telegram
        .bot_token
        .clone()
        .ok_or_else(|| anyhow::anyhow!("TELEGRAM_BOT_TOKEN is required"))?;
    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(bot_token.clone())?);

    let provider = Arc::new(WoltProvider::new(config.wolt.clone()));
    let cache = Arc::new(CatalogCache::new());
    let (store, audit) = build_store(&config).await;

    let scheduler = RefreshScheduler::new(
        provider.clone(),
        cache.clone(),
        store.clone(),
        messenger.clone(),
        audit.clone(),
        config.refresh.clone(),
    );
    tokio::spawn(scheduler.run());

    let handlers = Arc::new(Handlers {
        cache: cache.clone(),
        provider: provider.clone(),
        store: store.clone(),
        messenger: messenger.clone(),
        audit: audit.clone(),
        search_cap: config.wolt.search_cap,
        ttl_hours: config.refresh.ttl_hours,
    });
    let listener = UpdateListener::new(bot_token, config.telegram.poll_timeout_secs, handlers);
    tokio::spawn(listener.run());

    let state = Arc::new(AppState {
        cache,
        store,
        channel_name: messenger.channel_name().to_string(),
        started_at: Utc::now(),
        config: config.clone(),
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/config", get(api::config))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
