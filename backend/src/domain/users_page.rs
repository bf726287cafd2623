//! Facade binding the page callbacks to one shared page context.
//!
//! Inbound adapters hold a single [`UsersPage`] and call into it; the page
//! owns the controller and selector that operate on the shared state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use utoipa::ToSchema;

use super::backend_selector::{BackendSelector, LoadOutcome};
use super::mutation_controller::{MutationController, MutationError, MutationOutcome};
use super::page_state::{BackendRegistry, PageContext};
use super::{
    BackendKind, ConfirmationGate, Notification, Post, PostForm, PostId, PostUpdateForm, User,
    UserForm, UserId, UserUpdateForm,
};

/// A user as shown on the page, with their age on the snapshot date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[schema(value_type = i64)]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[schema(value_type = String, example = "1990-05-01")]
    pub birth_date: String,
    pub age: u32,
    pub created_at: DateTime<Utc>,
    pub posts: Vec<Post>,
}

impl UserView {
    fn from_user(user: &User, today: chrono::NaiveDate) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            birth_date: user.birth_date.to_string(),
            age: user.birth_date.age_on(today),
            created_at: user.created_at,
            posts: user.posts.clone(),
        }
    }
}

/// Point-in-time view of the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub active_backend: BackendKind,
    /// True while a backend switch is loading its list.
    pub switching: bool,
    /// In-flight actions such as `delete-user:3`.
    pub pending: Vec<String>,
    pub users: Vec<UserView>,
}

/// The users page: shared state plus its bound callbacks.
#[derive(Clone)]
pub struct UsersPage {
    context: Arc<PageContext>,
    controller: MutationController,
    selector: BackendSelector,
    clock: Arc<dyn Clock>,
}

impl UsersPage {
    /// Build a page with `initial` active. The store starts empty; call
    /// [`UsersPage::reload`] to populate it.
    pub fn new(initial: BackendKind, backends: BackendRegistry, clock: Arc<dyn Clock>) -> Self {
        let context = Arc::new(PageContext::new(initial, backends));
        Self {
            controller: MutationController::new(Arc::clone(&context)),
            selector: BackendSelector::new(Arc::clone(&context)),
            context,
            clock,
        }
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let today = self.clock.utc().date_naive();
        let state = self.context.lock();
        PageSnapshot {
            active_backend: state.active(),
            switching: state.is_switching(),
            pending: state.pending().map(|action| action.to_string()).collect(),
            users: state
                .store()
                .users()
                .iter()
                .map(|user| UserView::from_user(user, today))
                .collect(),
        }
    }

    #[must_use]
    pub fn active_backend(&self) -> BackendKind {
        self.context.lock().active()
    }

    /// Drain queued notifications, oldest first.
    pub fn take_notifications(&self) -> Vec<Notification> {
        self.context.lock().take_notifications()
    }

    pub async fn switch_backend(&self, kind: BackendKind) -> LoadOutcome {
        self.selector.switch_backend(kind).await
    }

    pub async fn reload(&self) -> LoadOutcome {
        self.selector.reload().await
    }

    pub async fn submit_create_user(
        &self,
        form: &UserForm,
    ) -> Result<MutationOutcome, MutationError> {
        self.controller.submit_create_user(form).await
    }

    pub async fn submit_create_post(
        &self,
        form: &PostForm,
    ) -> Result<MutationOutcome, MutationError> {
        self.controller.submit_create_post(form).await
    }

    pub async fn submit_update_user(
        &self,
        id: UserId,
        form: &UserUpdateForm,
    ) -> Result<MutationOutcome, MutationError> {
        self.controller.submit_update_user(id, form).await
    }

    pub async fn submit_update_post(
        &self,
        id: PostId,
        form: &PostUpdateForm,
    ) -> Result<MutationOutcome, MutationError> {
        self.controller.submit_update_post(id, form).await
    }

    pub async fn request_delete_user(
        &self,
        id: UserId,
        gate: &dyn ConfirmationGate,
    ) -> Result<MutationOutcome, MutationError> {
        self.controller.request_delete_user(id, gate).await
    }

    pub async fn request_delete_post(
        &self,
        id: PostId,
        gate: &dyn ConfirmationGate,
    ) -> Result<MutationOutcome, MutationError> {
        self.controller.request_delete_post(id, gate).await
    }
}

impl std::fmt::Debug for UsersPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsersPage")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::FixtureUsersBackend;
    use crate::test_support::clock::SteppingClock;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn snapshot_reports_ages_and_backend() {
        let shared = Arc::new(FixtureUsersBackend::default());
        let page = UsersPage::new(
            BackendKind::Diesel,
            BackendRegistry::new(shared.clone(), shared),
            Arc::new(SteppingClock::per_second()),
        );
        page.submit_create_user(&UserForm::new("Ana", "ana@x.com", "1990-05-01"))
            .await
            .expect("create");

        let snapshot = page.snapshot();

        assert_eq!(snapshot.active_backend, BackendKind::Diesel);
        assert!(!snapshot.switching);
        assert!(snapshot.pending.is_empty());
        assert_eq!(snapshot.users.len(), 1);
        assert_eq!(snapshot.users[0].age, 33);
        assert_eq!(snapshot.users[0].birth_date, "1990-05-01");
    }

    #[rstest]
    #[tokio::test]
    async fn shared_storage_survives_a_round_trip_switch() {
        let shared = Arc::new(FixtureUsersBackend::default());
        let page = UsersPage::new(
            BackendKind::Sqlx,
            BackendRegistry::new(shared.clone(), shared),
            Arc::new(SteppingClock::per_second()),
        );
        page.submit_create_user(&UserForm::new("Ana", "ana@x.com", "1990-05-01"))
            .await
            .expect("create");
        let before = page.snapshot().users;

        assert_eq!(page.switch_backend(BackendKind::Diesel).await, LoadOutcome::Loaded);
        assert_eq!(page.switch_backend(BackendKind::Sqlx).await, LoadOutcome::Loaded);

        assert_eq!(page.snapshot().users, before);
    }
}
