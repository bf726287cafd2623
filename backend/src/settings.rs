//! Start-up settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `SHOWCASE_*` environment variables and an
//! optional configuration file, falling back to the defaults below.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{BackendKind, ParseBackendKindError};

const DEFAULT_DATABASE_PATH: &str = "showcase.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    #[error(transparent)]
    Backend(#[from] ParseBackendKindError),
}

/// Runtime configuration for the showcase server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SHOWCASE")]
pub struct ShowcaseSettings {
    /// SQLite file shared by both backends.
    pub database_path: Option<PathBuf>,
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// Backend active when the page first loads (`sqlx` or `diesel`).
    pub initial_backend: Option<String>,
    /// How long a connection waits on a locked database, in milliseconds.
    #[ortho_config(default = 5000)]
    pub busy_timeout_ms: u64,
}

impl ShowcaseSettings {
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn initial_backend(&self) -> Result<BackendKind, SettingsError> {
        match self.initial_backend.as_deref() {
            Some(value) => Ok(value.parse()?),
            None => Ok(BackendKind::default()),
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
