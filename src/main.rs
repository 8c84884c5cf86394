//! News Globe: Binary Entrypoint
//! Boots the Axum HTTP server with the enrichment service behind it.

use news_globe::config::AppConfig;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON when `LOG_FORMAT=json`. Filter from
/// `RUST_LOG`. A subscriber installed by the runtime takes precedence.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("news_globe=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::load_default()?;
    tracing::info!(
        credentials = %cfg.credentials_path().display(),
        cache_ttl_secs = cfg.cache_ttl_secs,
        metrics = cfg.metrics_enabled,
        "starting news-globe"
    );

    let router = news_globe::app(&cfg)?;
    Ok(router.into())
}
