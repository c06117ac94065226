//! Builders wiring driven adapters into the shared HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use parking_backend::domain::ports::{
    NoOpParkingMetrics, ParkingLotRepository, ParkingMetrics, ParkingSessionRepository,
    PasswordHasher, ReportRepository, UserRepository,
};
use parking_backend::domain::{Error, NewPassword, UserAccountService, UserProfile};
use parking_backend::inbound::http::state::{DrivenAdapters, HttpState};
use parking_backend::outbound::memory::InMemoryStore;
use parking_backend::outbound::persistence::{
    DieselParkingLotRepository, DieselParkingSessionRepository, DieselReportRepository,
    DieselUserRepository,
};
use parking_backend::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;
use super::settings::BootstrapAdmin;

const BOOTSTRAP_FIRST_NAME: &str = "Bootstrap";
const BOOTSTRAP_LAST_NAME: &str = "Admin";

/// Pick the metrics adapter: Prometheus when a registry is configured.
///
/// # Errors
/// Returns [`std::io::Error`] if Prometheus metric registration fails.
#[cfg(feature = "metrics")]
fn build_parking_metrics(config: &ServerConfig) -> std::io::Result<Arc<dyn ParkingMetrics>> {
    use parking_backend::outbound::metrics::PrometheusParkingMetrics;

    match &config.prometheus {
        Some(prom) => {
            let metrics = PrometheusParkingMetrics::new(&prom.registry).map_err(|e| {
                std::io::Error::other(format!("parking metrics registration failed: {e}"))
            })?;
            Ok(Arc::new(metrics))
        }
        None => Ok(Arc::new(NoOpParkingMetrics)),
    }
}

#[cfg(not(feature = "metrics"))]
fn build_parking_metrics(_config: &ServerConfig) -> std::io::Result<Arc<dyn ParkingMetrics>> {
    Ok(Arc::new(NoOpParkingMetrics))
}

/// Create the first admin unless an account already exists.
async fn ensure_bootstrap_admin<U>(
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    admin: &BootstrapAdmin,
) -> Result<(), Error>
where
    U: UserRepository + 'static,
{
    let profile =
        UserProfile::try_from_parts(BOOTSTRAP_FIRST_NAME, BOOTSTRAP_LAST_NAME, &admin.email)
            .map_err(|err| Error::invalid_request(format!("bootstrap admin: {err}")))?;
    let password = NewPassword::new(&admin.password)
        .map_err(|err| Error::invalid_request(format!("bootstrap admin: {err}")))?;
    let accounts = UserAccountService::new(users, hasher, clock);
    match accounts.ensure_bootstrap_admin(profile, password).await? {
        Some(_) => {}
        None => info!("accounts already exist; skipping bootstrap admin"),
    }
    Ok(())
}

async fn wire<L, S, R, U>(
    adapters: DrivenAdapters<L, S, R, U>,
    bootstrap: Option<&BootstrapAdmin>,
) -> Result<HttpState, Error>
where
    L: ParkingLotRepository + 'static,
    S: ParkingSessionRepository + 'static,
    R: ReportRepository + 'static,
    U: UserRepository + 'static,
{
    if let Some(admin) = bootstrap {
        ensure_bootstrap_admin(
            Arc::clone(&adapters.users),
            Arc::clone(&adapters.hasher),
            Arc::clone(&adapters.clock),
            admin,
        )
        .await?;
    }
    Ok(HttpState::from_adapters(adapters))
}

/// Build the HTTP state over PostgreSQL when a pool is configured, otherwise
/// over a fresh in-memory store.
///
/// # Errors
/// Returns [`std::io::Error`] when metrics registration or the bootstrap
/// admin fails.
pub(super) async fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let metrics = build_parking_metrics(config)?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    build_http_state_with_clock(config, metrics, clock)
        .await
        .map_err(|err| std::io::Error::other(format!("state wiring failed: {err}")))
}

async fn build_http_state_with_clock(
    config: &ServerConfig,
    metrics: Arc<dyn ParkingMetrics>,
    clock: Arc<dyn Clock>,
) -> Result<HttpState, Error> {
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let bootstrap = config.bootstrap_admin.as_ref();
    match &config.db_pool {
        Some(pool) => {
            wire(
                DrivenAdapters {
                    lots: Arc::new(DieselParkingLotRepository::new(pool.clone())),
                    sessions: Arc::new(DieselParkingSessionRepository::new(pool.clone())),
                    reports: Arc::new(DieselReportRepository::new(pool.clone())),
                    users: Arc::new(DieselUserRepository::new(pool.clone())),
                    hasher,
                    metrics,
                    clock,
                },
                bootstrap,
            )
            .await
        }
        None => {
            let store = Arc::new(InMemoryStore::new());
            wire(
                DrivenAdapters {
                    lots: Arc::clone(&store),
                    sessions: Arc::clone(&store),
                    reports: Arc::clone(&store),
                    users: store,
                    hasher,
                    metrics,
                    clock,
                },
                bootstrap,
            )
            .await
        }
    }
}
