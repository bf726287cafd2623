//! Identifier for the two interchangeable data-access backends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Data-access library currently driving the page.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// SQL query builder (`sqlx`).
    #[default]
    Sqlx,
    /// Declarative ORM (`diesel`).
    Diesel,
}

impl BackendKind {
    /// Every backend in display order.
    pub const ALL: [Self; 2] = [Self::Sqlx, Self::Diesel];

    /// Stable lowercase identifier used on the wire and in settings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sqlx => "sqlx",
            Self::Diesel => "diesel",
        }
    }

    /// Human-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sqlx => "SQLx (query builder)",
            Self::Diesel => "Diesel (ORM)",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when text does not name a known backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backend {0:?}; expected \"sqlx\" or \"diesel\"")]
pub struct ParseBackendKindError(String);

impl FromStr for BackendKind {
    type Err = ParseBackendKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlx" => Ok(Self::Sqlx),
            "diesel" => Ok(Self::Diesel),
            _ => Err(ParseBackendKindError(s.to_owned())),
        }
    }
}
