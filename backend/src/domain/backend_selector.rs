//! Switching the active data-access backend.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::page_state::PageContext;
use super::ports::UsersBackendError;
use super::{BackendKind, Generation, Notification, PageState, User};

/// Result of a switch or reload once its list arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum LoadOutcome {
    /// The store now mirrors the backend.
    Loaded,
    /// The backend failed; the previous store contents were kept.
    Failed,
    /// A newer switch started first; the result was dropped.
    Superseded,
}

/// Selects the backend and loads its list into the entity store.
#[derive(Debug, Clone)]
pub struct BackendSelector {
    context: Arc<PageContext>,
}

impl BackendSelector {
    pub fn new(context: Arc<PageContext>) -> Self {
        Self { context }
    }

    /// Make `kind` active and load its users.
    ///
    /// The list is marked as loading until the fetch finishes. A later
    /// switch supersedes this one.
    pub async fn switch_backend(&self, kind: BackendKind) -> LoadOutcome {
        let generation = {
            let mut state = self.context.lock();
            let previous = state.active();
            let generation = state.begin_switch(kind);
            info!(from = %previous, to = %kind, generation = generation.get(), "switching backend");
            generation
        };

        let fetched = self.context.backends().get(kind).list_users().await;

        let mut state = self.context.lock();
        let outcome = Self::apply(&mut state, kind, generation, fetched);
        state.finish_switch(generation);
        outcome
    }

    /// Re-read the list from the active backend.
    pub async fn reload(&self) -> LoadOutcome {
        let (kind, generation) = {
            let state = self.context.lock();
            (state.active(), state.generation())
        };
        let fetched = self.context.backends().get(kind).list_users().await;
        let mut state = self.context.lock();
        Self::apply(&mut state, kind, generation, fetched)
    }

    fn apply(
        state: &mut PageState,
        kind: BackendKind,
        generation: Generation,
        fetched: Result<Vec<User>, UsersBackendError>,
    ) -> LoadOutcome {
        if !state.is_current(generation) {
            warn!(backend = %kind, generation = generation.get(), "discarding superseded list");
            return LoadOutcome::Superseded;
        }
        match fetched {
            Ok(users) => {
                info!(backend = %kind, users = users.len(), "list loaded");
                state.store_mut().replace(users);
                LoadOutcome::Loaded
            }
            Err(err) => {
                warn!(backend = %kind, error = %err, "list load failed");
                state.notify(Notification::error(format!(
                    "Could not load users from {}: {err}",
                    kind.label()
                )));
                LoadOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureUsersBackend, MockUsersBackend, UsersBackend};
    use crate::domain::{BackendRegistry, UserForm};
    use crate::test_support::backends::GatedUsersBackend;
    use rstest::rstest;

    fn selector(sqlx: Arc<dyn UsersBackend>, diesel: Arc<dyn UsersBackend>) -> BackendSelector {
        let context = PageContext::new(BackendKind::Sqlx, BackendRegistry::new(sqlx, diesel));
        BackendSelector::new(Arc::new(context))
    }

    #[rstest]
    #[tokio::test]
    async fn switch_loads_the_new_backend() {
        let diesel = Arc::new(FixtureUsersBackend::default());
        diesel
            .create_user(&UserForm::new("Ana", "ana@x.com", "1990-05-01"))
            .await
            .expect("seed");
        let selector = selector(Arc::new(FixtureUsersBackend::default()), diesel);

        let outcome = selector.switch_backend(BackendKind::Diesel).await;

        assert_eq!(outcome, LoadOutcome::Loaded);
        let state = selector.context.lock();
        assert_eq!(state.active(), BackendKind::Diesel);
        assert!(!state.is_switching());
        assert_eq!(state.store().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_switch_keeps_store_and_notifies() {
        let mut diesel = MockUsersBackend::new();
        diesel
            .expect_list_users()
            .times(1)
            .return_once(|| Err(UsersBackendError::unknown("database is locked")));
        let sqlx = Arc::new(FixtureUsersBackend::default());
        sqlx.create_user(&UserForm::new("Ana", "ana@x.com", "1990-05-01"))
            .await
            .expect("seed");
        let selector = selector(sqlx, Arc::new(diesel));
        assert_eq!(selector.reload().await, LoadOutcome::Loaded);

        let outcome = selector.switch_backend(BackendKind::Diesel).await;

        assert_eq!(outcome, LoadOutcome::Failed);
        let mut state = selector.context.lock();
        assert_eq!(state.store().len(), 1);
        assert!(!state.is_switching());
        let notes = state.take_notifications();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].is_error());
    }

    #[rstest]
    #[tokio::test]
    async fn newer_switch_supersedes_older_one() {
        let stale = Arc::new(FixtureUsersBackend::default());
        stale
            .create_user(&UserForm::new("Stale", "stale@x.com", "1990-05-01"))
            .await
            .expect("seed");
        let slow = Arc::new(GatedUsersBackend::new(stale));
        let mut held = slow.hold_next_list();
        let selector = selector(Arc::new(FixtureUsersBackend::default()), slow);

        let first = {
            let selector = selector.clone();
            tokio::spawn(async move { selector.switch_backend(BackendKind::Diesel).await })
        };
        held.wait_started().await;
        let second = selector.switch_backend(BackendKind::Sqlx).await;
        held.release();
        let first = first.await.expect("join");

        assert_eq!(second, LoadOutcome::Loaded);
        assert_eq!(first, LoadOutcome::Superseded);
        let state = selector.context.lock();
        assert_eq!(state.active(), BackendKind::Sqlx);
        assert!(state.store().is_empty());
        assert!(!state.is_switching());
    }
}
