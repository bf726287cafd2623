//! Embedded schema migrations shared by both backends.

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

/// Migrations from `backend/migrations`, compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
