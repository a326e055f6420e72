//! Environment variable helpers for tests.
#![allow(dead_code)]

use env_lock::{EnvGuard as LockedEnvGuard, lock_env};
use tracing::{instrument, trace};

/// RAII guard to restore environment variables on drop.
///
/// Holds the process-wide env lock, so tests touching the same variables
/// run one at a time.
pub struct EnvGuard<'a> {
    _guard: LockedEnvGuard<'a>,
}

impl<'a> EnvGuard<'a> {
    #[must_use]
    #[instrument]
    pub fn set(key: &'a str, value: &str) -> Self {
        trace!(key, value, "Setting env var");
        let guard = lock_env([(key, Some(value))]);
        Self { _guard: guard }
    }

    #[must_use]
    #[instrument]
    pub fn remove(key: &'a str) -> Self {
        trace!(key, "Removing env var");
        let guard = lock_env([(key, None::<&str>)]);
        Self { _guard: guard }
    }
}

#[must_use]
pub fn with_config_path(path: &str) -> EnvGuard<'static> {
    EnvGuard::set("BOOTH_CONFIG", path)
}

#[must_use]
pub fn without_config_path() -> EnvGuard<'static> {
    EnvGuard::remove("BOOTH_CONFIG")
}
