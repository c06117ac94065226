//! Skip policy for suites that need a PostgreSQL server.
//!
//! Machines without Postgres skip these suites with a `SKIP-TEST-CLUSTER`
//! marker. CI sets `REQUIRE_TEST_CLUSTER=1` so a broken cluster fails loudly
//! instead.

/// True when `REQUIRE_TEST_CLUSTER` is "1", "true", or "yes" (any case).
pub fn test_cluster_required() -> bool {
    std::env::var("REQUIRE_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Report a cluster setup failure: panic when the cluster is required,
/// otherwise print a skip marker and return `None`.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if test_cluster_required() {
        panic!("Test cluster setup failed: {reason}. Unset REQUIRE_TEST_CLUSTER to skip.");
    }
    eprintln!("SKIP-TEST-CLUSTER: {reason}");
    None
}
