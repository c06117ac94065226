//! Prometheus metrics adapters, compiled with the `metrics` feature.

mod prometheus_parking;

pub use prometheus_parking::PrometheusParkingMetrics;
