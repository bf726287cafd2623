//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use showcase::domain::BackendKind;
use showcase::outbound::persistence::PoolConfig;
use showcase::settings::{SettingsError, ShowcaseSettings};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database: PoolConfig,
    pub(crate) initial_backend: BackendKind,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, database: PoolConfig) -> Self {
        Self {
            bind_addr,
            database,
            initial_backend: BackendKind::default(),
        }
    }

    /// Interpret loaded settings.
    pub fn from_settings(settings: &ShowcaseSettings) -> Result<Self, SettingsError> {
        let database =
            PoolConfig::new(settings.database_path()).with_busy_timeout(settings.busy_timeout());
        Ok(Self::new(settings.bind_addr()?, database)
            .with_initial_backend(settings.initial_backend()?))
    }

    /// Choose which backend the page starts on.
    #[must_use]
    pub fn with_initial_backend(mut self, kind: BackendKind) -> Self {
        self.initial_backend = kind;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
