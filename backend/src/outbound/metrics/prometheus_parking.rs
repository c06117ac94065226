//! Prometheus adapter for parking traffic and revenue.
//!
//! # Metrics
//!
//! - `parking_entries_total{lot}`: accepted entries.
//! - `parking_rejected_entries_total{reason}`: entries turned away, with
//!   `reason` one of `lot_full`, `already_active`, `lot_not_found`.
//! - `parking_exits_total{lot}`: closed sessions.
//! - `parking_revenue_total{lot}`: amount billed on exit.

use async_trait::async_trait;
use prometheus::{CounterVec, IntCounterVec, Opts, Registry};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::domain::LotCode;
use crate::domain::ports::{EntryRejection, ParkingMetrics, ParkingMetricsError};

/// Prometheus-backed [`ParkingMetrics`].
pub struct PrometheusParkingMetrics {
    entries: IntCounterVec,
    rejected: IntCounterVec,
    exits: IntCounterVec,
    revenue: CounterVec,
}

impl PrometheusParkingMetrics {
    /// Create the counters and register them with `registry`.
    ///
    /// # Errors
    ///
    /// Fails when a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let entries = IntCounterVec::new(
            Opts::new("parking_entries_total", "Vehicles admitted, by lot"),
            &["lot"],
        )?;
        let rejected = IntCounterVec::new(
            Opts::new(
                "parking_rejected_entries_total",
                "Entries turned away, by reason",
            ),
            &["reason"],
        )?;
        let exits = IntCounterVec::new(
            Opts::new("parking_exits_total", "Vehicles checked out, by lot"),
            &["lot"],
        )?;
        let revenue = CounterVec::new(
            Opts::new("parking_revenue_total", "Amount billed on exit, by lot"),
            &["lot"],
        )?;
        registry.register(Box::new(entries.clone()))?;
        registry.register(Box::new(rejected.clone()))?;
        registry.register(Box::new(exits.clone()))?;
        registry.register(Box::new(revenue.clone()))?;
        Ok(Self {
            entries,
            rejected,
            exits,
            revenue,
        })
    }
}

#[async_trait]
impl ParkingMetrics for PrometheusParkingMetrics {
    async fn record_entry(&self, lot: &LotCode) -> Result<(), ParkingMetricsError> {
        self.entries.with_label_values(&[lot.as_ref()]).inc();
        Ok(())
    }

    async fn record_rejected_entry(
        &self,
        reason: EntryRejection,
    ) -> Result<(), ParkingMetricsError> {
        self.rejected.with_label_values(&[reason.as_str()]).inc();
        Ok(())
    }

    async fn record_exit(
        &self,
        lot: &LotCode,
        amount: Decimal,
    ) -> Result<(), ParkingMetricsError> {
        let amount = amount
            .to_f64()
            .ok_or_else(|| ParkingMetricsError::export(format!("amount {amount} out of range")))?;
        self.exits.with_label_values(&[lot.as_ref()]).inc();
        self.revenue.with_label_values(&[lot.as_ref()]).inc_by(amount);
        Ok(())
    }
}
