//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{FixtureSyntaxHighlighter, FixtureUsersBackend, UsersBackend};
use crate::domain::{BackendKind, BackendRegistry, UserForm, UsersPage};
use crate::inbound::http::state::HttpState;
use crate::test_support::clock::SteppingClock;

/// Page wired to two in-memory backends, with handles kept for seeding.
pub struct TestPage {
    pub state: HttpState,
    pub sqlx: Arc<FixtureUsersBackend>,
    pub diesel: Arc<FixtureUsersBackend>,
}

impl TestPage {
    /// Page starting on the query-builder backend.
    pub fn new() -> Self {
        let sqlx = Arc::new(FixtureUsersBackend::default());
        let diesel = Arc::new(FixtureUsersBackend::default());
        let backends = BackendRegistry::new(sqlx.clone(), diesel.clone());
        let page = UsersPage::new(
            BackendKind::Sqlx,
            backends,
            Arc::new(SteppingClock::per_second()),
        );
        Self {
            state: HttpState::new(page, Arc::new(FixtureSyntaxHighlighter)),
            sqlx,
            diesel,
        }
    }

    pub fn data(&self) -> web::Data<HttpState> {
        web::Data::new(self.state.clone())
    }
}

/// Insert a user directly through a backend, bypassing the page.
pub async fn seed_user(backend: &FixtureUsersBackend, name: &str, email: &str) {
    backend
        .create_user(&UserForm::new(name, email, "1990-05-01"))
        .await
        .expect("seed user");
}
