//! PostgreSQL adapters built on Diesel.
//!
//! Repositories translate between row structs (`models.rs`, `schema.rs`) and
//! domain types; neither leaves this module. Connections come from a `bb8`
//! pool through `diesel-async`, and every database failure is mapped into the
//! owning port's error type.
//!
//! # Example
//!
//! ```rust,no_run
//! use parking_backend::outbound::persistence::{
//!     DbPool, DieselParkingLotRepository, PoolConfig, run_pending_migrations,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://localhost/parking";
//! run_pending_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let lots = DieselParkingLotRepository::new(pool);
//! # let _ = lots;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_parking_lot_repository;
mod diesel_parking_session_repository;
mod diesel_report_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_parking_lot_repository::DieselParkingLotRepository;
pub use diesel_parking_session_repository::DieselParkingSessionRepository;
pub use diesel_report_repository::DieselReportRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DEFAULT_POOL_SIZE, DbPool, PoolConfig, PoolError};
