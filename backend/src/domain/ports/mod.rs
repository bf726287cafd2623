//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod syntax_highlighter;
mod users_backend;

#[cfg(test)]
pub use syntax_highlighter::MockSyntaxHighlighter;
pub use syntax_highlighter::{FixtureSyntaxHighlighter, SyntaxHighlighter};
#[cfg(test)]
pub use users_backend::MockUsersBackend;
pub use users_backend::{FixtureUsersBackend, UsersBackend, UsersBackendError};
