//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories on Diesel.
//! - **memory**: a process-local store used when no database is configured.
//! - **security**: Argon2 password hashing.
//! - **metrics**: Prometheus counters (feature-gated).
//!
//! Adapters only translate between domain types and infrastructure; business
//! rules stay in the domain services.

pub mod memory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
pub mod security;
