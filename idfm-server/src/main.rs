use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use idfm_server::config::AppConfig;
use idfm_server::realtime::RealtimeClient;
use idfm_server::reference::{REFERENCE_REFRESH_INTERVAL, ReferenceClient, ReferenceStore};
use idfm_server::resolve::cache::SWEEP_INTERVAL;
use idfm_server::resolve::{CacheConfig, LineCache, ResolutionCache, StopCache};
use idfm_server::service::TimingService;
use idfm_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "idfm_server=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;

    let realtime = RealtimeClient::new(config.realtime)?;
    let store = ReferenceStore::new(ReferenceClient::new(config.reference)?);

    // Serve with an empty snapshot if the portal is down; the refresh task retries
    info!("loading reference tables");
    if let Err(e) = store.load().await {
        warn!(error = %e, "initial reference load failed, starting with empty tables");
    }
    store.spawn_refresh(REFERENCE_REFRESH_INTERVAL);

    let line_cache: LineCache = ResolutionCache::new(&CacheConfig::lines());
    let stop_cache: StopCache = ResolutionCache::new(&CacheConfig::stops());
    line_cache.spawn_sweeper(SWEEP_INTERVAL);
    stop_cache.spawn_sweeper(SWEEP_INTERVAL);

    let service = TimingService::new(store, Arc::new(realtime), line_cache, stop_cache);
    let app = create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "IDFM timing server listening");
    info!("  GET /health");
    info!("  GET /api/idfm/lines/:type/:id");
    info!("  GET /api/idfm/timings/:type/:id/:stop");

    axum::serve(listener, app).await?;
    Ok(())
}
