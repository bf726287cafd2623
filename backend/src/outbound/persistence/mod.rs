//! SQLite persistence adapters for the two compared data-access libraries.
//!
//! Both adapters implement the domain's `UsersBackend` port against the same
//! database file:
//!
//! - `SqlxUsersBackend` assembles SQL with the `sqlx` query builder.
//! - `DieselUsersBackend` uses Diesel's declarative schema and derives,
//!   driven asynchronously through `diesel-async`.
//!
//! # Architecture
//!
//! - **Thin adapters**: implementations only translate between rows and
//!   domain types. Validation lives on the domain forms.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **One taxonomy**: driver errors from either library are classified the
//!   same way (`error_mapping.rs`) so the backends are interchangeable.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use showcase::outbound::persistence::{
//!     DbPool, DieselUsersBackend, PoolConfig, SqlxUsersBackend, connect_sqlx,
//! };
//!
//! # async fn run() -> Result<(), showcase::outbound::persistence::PoolError> {
//! let config = PoolConfig::new("showcase.db");
//! let pool = DbPool::open(&config).await?;
//! let clock = Arc::new(mockable::DefaultClock);
//! let orm = DieselUsersBackend::new(pool, clock.clone());
//! let builder = SqlxUsersBackend::new(connect_sqlx(&config).await?, clock);
//! # Ok(())
//! # }
//! ```

mod conversions;
mod diesel_users_backend;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;
mod sqlx_users_backend;

pub use diesel_users_backend::DieselUsersBackend;
pub use migrations::MIGRATIONS;
pub use pool::{AsyncSqliteConnection, DbPool, PoolConfig, PoolError, connect_sqlx};
pub use sqlx_users_backend::SqlxUsersBackend;
