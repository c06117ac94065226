//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    LoginService, ParkingLotCommand, ParkingLotQuery, ParkingLotRepository, ParkingMetrics,
    ParkingSessionCommand, ParkingSessionQuery, ParkingSessionRepository, PasswordHasher,
    ReportQuery, ReportRepository, UserAccountCommand, UserRepository, UsersQuery,
};
use crate::domain::{ParkingLotService, ParkingSessionService, ReportService, UserAccountService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn UserAccountCommand>,
    pub users: Arc<dyn UsersQuery>,
    pub lots: Arc<dyn ParkingLotCommand>,
    pub lots_query: Arc<dyn ParkingLotQuery>,
    pub sessions: Arc<dyn ParkingSessionCommand>,
    pub sessions_query: Arc<dyn ParkingSessionQuery>,
    pub reports: Arc<dyn ReportQuery>,
}

/// Driven adapters the domain services are built on.
///
/// The in-memory store implements every repository port, so the same `Arc`
/// may be passed for all four repositories.
pub struct DrivenAdapters<L, S, R, U> {
    pub lots: Arc<L>,
    pub sessions: Arc<S>,
    pub reports: Arc<R>,
    pub users: Arc<U>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub metrics: Arc<dyn ParkingMetrics>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Wire the domain services over `adapters` and expose them as ports.
    pub fn from_adapters<L, S, R, U>(adapters: DrivenAdapters<L, S, R, U>) -> Self
    where
        L: ParkingLotRepository + 'static,
        S: ParkingSessionRepository + 'static,
        R: ReportRepository + 'static,
        U: UserRepository + 'static,
    {
        let DrivenAdapters {
            lots,
            sessions,
            reports,
            users,
            hasher,
            metrics,
            clock,
        } = adapters;

        let accounts = Arc::new(UserAccountService::new(users, hasher, Arc::clone(&clock)));
        let lot_service = Arc::new(ParkingLotService::new(lots, Arc::clone(&clock)));
        let session_service = Arc::new(ParkingSessionService::new(
            sessions,
            metrics,
            Arc::clone(&clock),
        ));
        let report_service = Arc::new(ReportService::new(reports, clock));

        Self {
            login: accounts.clone(),
            accounts: accounts.clone(),
            users: accounts,
            lots: lot_service.clone(),
            lots_query: lot_service,
            sessions: session_service.clone(),
            sessions_query: session_service,
            reports: report_service,
        }
    }
}
