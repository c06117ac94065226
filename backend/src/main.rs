//! Backend entry-point: loads settings, wires storage, and serves the REST API.

mod server;

#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use parking_backend::inbound::http::health::{HealthState, StorageBackend};
use parking_backend::inbound::http::session_config::BuildMode;
use parking_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::settings::{AppSettings, session_settings};
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::from_args(std::env::args_os())?;
    let session = session_settings(BuildMode::from_debug_assertions())?;

    let mut config = ServerConfig::new(session, settings.bind_addr())
        .with_bootstrap_admin(settings.bootstrap_admin());
    let storage = match settings.database_url.as_deref() {
        Some(url) => {
            let applied = run_pending_migrations(url)
                .await
                .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
            info!(applied, "database migrations applied");
            let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_pool_size()))
                .await
                .map_err(|e| std::io::Error::other(format!("database pool failed: {e}")))?;
            config = config.with_db_pool(pool);
            StorageBackend::Postgres
        }
        None => {
            warn!("PARKING_DATABASE_URL not set; data lives in memory and is lost on exit");
            StorageBackend::Memory
        }
    };

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(if settings.metrics {
        Some(make_metrics()?)
    } else {
        None
    });
    #[cfg(not(feature = "metrics"))]
    {
        if settings.metrics {
            warn!("PARKING_METRICS is set but the binary was built without the metrics feature");
        }
    }

    let health_state = web::Data::new(HealthState::new(storage));
    info!(bind_addr = %config.bind_addr(), ?storage, "starting parking backend");
    let server = create_server(health_state, config).await?;
    server.await
}

#[cfg(feature = "metrics")]
fn make_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("parking")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(format!("configure Prometheus metrics: {e}")))
}
