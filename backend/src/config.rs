//! Process settings loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_PASSWORD_ITERATIONS;
use crate::outbound::persistence::DEFAULT_POOL_MAX_SIZE;

/// Settings shared by every `scorekeeper` subcommand.
///
/// Values come from `SCOREKEEPER_*` environment variables, configuration
/// files, and command-line arguments, in OrthoConfig's usual precedence.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SCOREKEEPER")]
pub struct ScorekeeperSettings {
    /// PostgreSQL connection URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Emit logs as JSON lines instead of compact text.
    #[ortho_config(default = false)]
    pub json_logs: bool,
    /// PBKDF2 iteration count for new password hashes.
    pub password_iterations: Option<u32>,
}

impl ScorekeeperSettings {
    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Configured pool size, falling back to the default.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Configured password iterations, falling back to the default.
    pub fn password_iterations(&self) -> u32 {
        self.password_iterations
            .unwrap_or(DEFAULT_PASSWORD_ITERATIONS)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ScorekeeperSettings {
        ScorekeeperSettings::load_from_iter([OsString::from("scorekeeper")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("SCOREKEEPER_DATABASE_URL", None::<String>),
            ("SCOREKEEPER_POOL_MAX_SIZE", None::<String>),
            ("SCOREKEEPER_JSON_LOGS", None::<String>),
            ("SCOREKEEPER_PASSWORD_ITERATIONS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.database_url().is_none());
        assert_eq!(settings.pool_max_size(), DEFAULT_POOL_MAX_SIZE);
        assert!(!settings.json_logs);
        assert_eq!(settings.password_iterations(), DEFAULT_PASSWORD_ITERATIONS);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "SCOREKEEPER_DATABASE_URL",
                Some("postgres://localhost/league".to_owned()),
            ),
            ("SCOREKEEPER_POOL_MAX_SIZE", Some("4".to_owned())),
            ("SCOREKEEPER_JSON_LOGS", Some("true".to_owned())),
            ("SCOREKEEPER_PASSWORD_ITERATIONS", Some("1000".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), Some("postgres://localhost/league"));
        assert_eq!(settings.pool_max_size(), 4);
        assert!(settings.json_logs);
        assert_eq!(settings.password_iterations(), 1000);
    }

    #[rstest]
    fn blank_database_url_selects_memory_store() {
        let _guard = lock_env([
            ("SCOREKEEPER_DATABASE_URL", Some("   ".to_owned())),
            ("SCOREKEEPER_POOL_MAX_SIZE", None::<String>),
            ("SCOREKEEPER_JSON_LOGS", None::<String>),
            ("SCOREKEEPER_PASSWORD_ITERATIONS", None::<String>),
        ]);

        assert!(load_from_empty_args().database_url().is_none());
    }
}
