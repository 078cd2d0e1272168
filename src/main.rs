//! P2000 monitor — binary entrypoint.
//! Loads config, starts the feed poller and serves the current event over HTTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use p2000_monitor::{
    api::{self, AppState},
    feed::HttpFeedSource,
    metrics::Metrics,
    scheduler::spawn_poller,
    MonitorConfig, NotifierMux,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` wins; otherwise info for this crate. `LOG_FORMAT=json` for
/// machine-readable output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("p2000_monitor=info,p2000=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = Metrics::init()?;

    let cfg = MonitorConfig::load_default().context("loading p2000 config")?;
    let session = cfg.build_session().context("building feed session")?;
    let url = cfg.feed_url();
    let source = HttpFeedSource::new(url.clone()).context("building http client")?;

    tracing::info!(
        name = %cfg.name,
        variant = %cfg.variant,
        %url,
        radius_m = cfg.radius,
        "starting p2000 monitor"
    );

    let (_poller, events) = spawn_poller(
        session,
        Arc::new(source),
        cfg.scan_interval(),
        NotifierMux::from_env(),
    );

    let app = api::router(AppState {
        name: cfg.name.clone(),
        events,
    })
    .merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("binding {}", cfg.bind))?;
    tracing::info!(bind = %cfg.bind, "http listening");
    axum::serve(listener, app).await.context("http server")?;
    Ok(())
}
