//! Application settings loaded via OrthoConfig.
//!
//! Every field can be set through a `PARKING_`-prefixed environment variable,
//! for example `PARKING_DATABASE_URL` or `PARKING_BIND_ADDR`.

use std::ffi::OsString;
use std::io;
use std::net::SocketAddr;

use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use parking_backend::inbound::http::session_config::{
    BuildMode, SessionSettings, session_settings_from_env,
};
use parking_backend::outbound::persistence::DEFAULT_POOL_SIZE;

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
    8080,
);

/// Process-level configuration for the parking backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PARKING")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub db_pool_size: Option<u32>,
    /// Register Prometheus metrics and expose `/metrics`.
    #[ortho_config(default = false)]
    pub metrics: bool,
    /// Email of the admin created when no account exists yet.
    pub bootstrap_admin_email: Option<String>,
    /// Password of the bootstrap admin.
    pub bootstrap_admin_password: Option<String>,
}

/// Credentials for the first admin account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl AppSettings {
    /// Load settings from command-line `args` and the `PARKING_` environment.
    pub fn from_args<I, T>(args: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::load_from_iter(args).map_err(|e| io::Error::other(format!("invalid settings: {e}")))
    }

    /// Return the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Return the configured pool size, falling back to the pool default.
    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Return the bootstrap admin when both email and password are set.
    pub fn bootstrap_admin(&self) -> Option<BootstrapAdmin> {
        match (&self.bootstrap_admin_email, &self.bootstrap_admin_password) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

/// Session cookie settings read from the process environment.
pub fn session_settings(mode: BuildMode) -> io::Result<SessionSettings> {
    session_settings_from_env(&DefaultEnv::new(), mode).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;

    use actix_web::cookie::SameSite;
    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "PARKING_BIND_ADDR",
        "PARKING_DATABASE_URL",
        "PARKING_DB_POOL_SIZE",
        "PARKING_METRICS",
        "PARKING_BOOTSTRAP_ADMIN_EMAIL",
        "PARKING_BOOTSTRAP_ADMIN_PASSWORD",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::from_args([OsString::from("parking-backend")]).expect("config should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared());

        let settings = load_from_empty_args();

        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(settings.bind_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(settings.db_pool_size(), DEFAULT_POOL_SIZE);
        assert!(settings.database_url.is_none());
        assert!(!settings.metrics);
        assert!(settings.bootstrap_admin().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("PARKING_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "PARKING_DATABASE_URL",
                Some("postgres://localhost/parking".to_owned()),
            ),
            ("PARKING_DB_POOL_SIZE", Some("4".to_owned())),
            ("PARKING_METRICS", Some("true".to_owned())),
            (
                "PARKING_BOOTSTRAP_ADMIN_EMAIL",
                Some("root@example.com".to_owned()),
            ),
            (
                "PARKING_BOOTSTRAP_ADMIN_PASSWORD",
                Some("changeme".to_owned()),
            ),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(settings.bind_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/parking")
        );
        assert_eq!(settings.db_pool_size(), 4);
        assert!(settings.metrics);
        assert_eq!(
            settings.bootstrap_admin(),
            Some(BootstrapAdmin {
                email: "root@example.com".to_owned(),
                password: "changeme".to_owned(),
            })
        );
    }

    #[rstest]
    fn bootstrap_admin_needs_both_halves() {
        let vars = cleared().into_iter().map(|(name, value)| match name {
            "PARKING_BOOTSTRAP_ADMIN_EMAIL" => (name, Some("root@example.com".to_owned())),
            _ => (name, value),
        });
        let _guard = lock_env(vars);

        assert!(load_from_empty_args().bootstrap_admin().is_none());
    }

    #[rstest]
    fn unparsable_values_are_reported_as_io_errors() {
        let vars = cleared().into_iter().map(|(name, value)| match name {
            "PARKING_DB_POOL_SIZE" => (name, Some("plenty".to_owned())),
            _ => (name, value),
        });
        let _guard = lock_env(vars);

        let err = AppSettings::from_args([OsString::from("parking-backend")])
            .expect_err("pool size must be numeric");

        assert!(err.to_string().starts_with("invalid settings"), "{err}");
    }

    #[rstest]
    fn session_settings_read_the_process_environment() {
        let _guard = lock_env([
            ("SESSION_KEY_FILE", Some("/nonexistent/parking/session_key".to_owned())),
            ("SESSION_COOKIE_SECURE", Some("0".to_owned())),
            ("SESSION_SAMESITE", Some("Strict".to_owned())),
            ("SESSION_ALLOW_EPHEMERAL", Some("1".to_owned())),
        ]);

        let settings = session_settings(BuildMode::Debug).expect("debug settings");

        assert!(!settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
    }
}
