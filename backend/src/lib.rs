//! Side-by-side data-access showcase library.
//!
//! One users/posts page driven through either a SQL query builder (`sqlx`)
//! or an ORM (Diesel), both over the same SQLite file.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
