//! Domain port for counting parking traffic and revenue.
//!
//! Services report each recorded entry, rejected entry, and exit here.
//! Recording failures are logged by callers and never fail the request.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::LotCode;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording parking metrics.
    pub enum ParkingMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "parking metrics exporter failed: {message}",
    }
}

/// Why an entry was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryRejection {
    LotFull,
    AlreadyActive,
    LotNotFound,
}

impl EntryRejection {
    /// Stable metric label value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LotFull => "lot_full",
            Self::AlreadyActive => "already_active",
            Self::LotNotFound => "lot_not_found",
        }
    }
}

/// Metrics recording port for entries and exits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParkingMetrics: Send + Sync {
    /// Record an accepted entry into `lot`.
    async fn record_entry(&self, lot: &LotCode) -> Result<(), ParkingMetricsError>;

    /// Record an entry that was turned away.
    async fn record_rejected_entry(
        &self,
        reason: EntryRejection,
    ) -> Result<(), ParkingMetricsError>;

    /// Record an exit from `lot` that charged `amount`.
    async fn record_exit(
        &self,
        lot: &LotCode,
        amount: Decimal,
    ) -> Result<(), ParkingMetricsError>;
}

/// No-op implementation for when metrics are disabled or in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpParkingMetrics;

#[async_trait]
impl ParkingMetrics for NoOpParkingMetrics {
    async fn record_entry(&self, _lot: &LotCode) -> Result<(), ParkingMetricsError> {
        Ok(())
    }

    async fn record_rejected_entry(
        &self,
        _reason: EntryRejection,
    ) -> Result<(), ParkingMetricsError> {
        Ok(())
    }

    async fn record_exit(
        &self,
        _lot: &LotCode,
        _amount: Decimal,
    ) -> Result<(), ParkingMetricsError> {
        Ok(())
    }
}
