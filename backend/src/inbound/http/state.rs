//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the page facade and domain ports, and remain testable without
//! a database.

use std::sync::Arc;

use crate::domain::UsersPage;
use crate::domain::ports::SyntaxHighlighter;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// The single page every request operates on.
    pub page: UsersPage,
    pub highlighter: Arc<dyn SyntaxHighlighter>,
}

impl HttpState {
    /// Bundle the page with the highlighter used for the snippet panel.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use showcase::domain::{BackendKind, BackendRegistry, UsersPage};
    /// use showcase::domain::ports::{FixtureSyntaxHighlighter, FixtureUsersBackend};
    /// use showcase::inbound::http::state::HttpState;
    ///
    /// let backends = BackendRegistry::new(
    ///     Arc::new(FixtureUsersBackend::default()),
    ///     Arc::new(FixtureUsersBackend::default()),
    /// );
    /// let page = UsersPage::new(BackendKind::Sqlx, backends, Arc::new(mockable::DefaultClock));
    /// let state = HttpState::new(page, Arc::new(FixtureSyntaxHighlighter));
    /// assert_eq!(state.page.active_backend(), BackendKind::Sqlx);
    /// ```
    pub fn new(page: UsersPage, highlighter: Arc<dyn SyntaxHighlighter>) -> Self {
        Self { page, highlighter }
    }
}
