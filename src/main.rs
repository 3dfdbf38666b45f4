//! Lead Intent Scorer — Binary Entrypoint
//! Loads the scoring config, boots the Axum HTTP server and wires hot reload
//! and the optional Prometheus endpoint.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use lead_intent_scorer::api::{self, AppState};
use lead_intent_scorer::config::{start_hot_reload_thread, ConfigHandle, ScoringConfig, Settings};
use lead_intent_scorer::metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    let settings = Settings::from_env()?;
    lead_intent_scorer::init_tracing(settings.log_format)?;

    // Malformed config is fatal at startup; nothing is served with it.
    let config = ScoringConfig::load(&settings.config_path).with_context(|| {
        format!(
            "Failed to load scoring config from {}",
            settings.config_path.display()
        )
    })?;
    let handle = ConfigHandle::new(config);

    // Background watcher; no-op unless SCORING_HOT_RELOAD is set.
    start_hot_reload_thread(
        handle.clone(),
        settings.config_path.clone(),
        settings.hot_reload,
    );

    let state = AppState::new(handle, settings.config_path.clone());
    let mut router = api::router(state);
    if settings.metrics_enabled {
        let metrics = Metrics::init()?;
        router = router.merge(metrics.router());
        info!("prometheus metrics exposed at /metrics");
    }

    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;
    info!(addr = %settings.bind_addr, "lead intent scorer listening");

    axum::serve(listener, router).await?;
    Ok(())
}
