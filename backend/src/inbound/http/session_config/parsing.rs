//! Strict-or-lenient readers for the session environment toggles.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, SAMESITE_ENV, SessionConfigError};

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Reads toggles from `env`, falling back to defaults with a warning in
/// debug builds and failing in release builds.
pub(super) struct ToggleReader<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<'a, E: Env> ToggleReader<'a, E> {
    pub(super) const fn new(env: &'a E, mode: BuildMode) -> Self {
        Self { env, mode }
    }

    /// Boolean toggle `name`, or `fallback` when lenient.
    pub(super) fn flag(
        &self,
        name: &'static str,
        fallback: bool,
    ) -> Result<bool, SessionConfigError> {
        let Some(raw) = self.env.string(name) else {
            return self.lenient(fallback, SessionConfigError::MissingEnv { name });
        };
        match parse_bool(&raw) {
            Some(flag) => Ok(flag),
            None => self.lenient(
                fallback,
                SessionConfigError::InvalidEnv {
                    name,
                    value: raw,
                    expected: BOOL_EXPECTED,
                },
            ),
        }
    }

    /// `SameSite` policy; `None` is only honoured alongside secure cookies.
    pub(super) fn same_site(
        &self,
        fallback: SameSite,
        cookie_secure: bool,
    ) -> Result<SameSite, SessionConfigError> {
        let Some(raw) = self.env.string(SAMESITE_ENV) else {
            let error = SessionConfigError::MissingEnv { name: SAMESITE_ENV };
            return self.lenient(fallback, error);
        };
        match raw.to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if cookie_secure => Ok(SameSite::None),
            "none" => self
                .lenient((), SessionConfigError::InsecureSameSiteNone)
                .map(|()| SameSite::None),
            _ => self.lenient(
                fallback,
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value: raw,
                    expected: SAMESITE_EXPECTED,
                },
            ),
        }
    }

    /// Accept `fallback` in debug builds, reject with `error` otherwise.
    pub(super) fn lenient<T>(
        &self,
        fallback: T,
        error: SessionConfigError,
    ) -> Result<T, SessionConfigError> {
        match self.mode {
            BuildMode::Debug => {
                warn!(%error, "session setting ignored in debug build");
                Ok(fallback)
            }
            BuildMode::Release => Err(error),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
