//! Application settings loaded via OrthoConfig.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Configuration for the realtime database connection and fixtures.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PETGRAM")]
pub struct PetgramSettings {
    /// Base URL of the REST realtime database.
    pub database_url: Option<String>,
    /// Optional database secret or ID token sent as the `auth` parameter.
    pub database_auth: Option<String>,
    /// HTTP request timeout in milliseconds.
    #[ortho_config(default = 10000)]
    pub request_timeout_ms: u64,
    /// Optional fixture set override; the embedded set is used otherwise.
    pub fixtures_path: Option<PathBuf>,
}

impl PetgramSettings {
    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Configured database token, ignoring blank values.
    pub fn database_auth(&self) -> Option<&str> {
        self.database_auth
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn fixtures_path(&self) -> Option<&std::path::Path> {
        self.fixtures_path.as_deref()
    }
}
