//! Submit and delete flows for users and posts.
//!
//! Every mutation follows the same path: validate at the boundary, register
//! the action as pending, call the active backend, then re-fetch the full
//! list from that backend and replace the entity store. Results that arrive
//! after a backend switch are discarded.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::page_state::{ActionRejection, PageContext, PendingAction, PendingGuard};
use super::ports::{UsersBackend, UsersBackendError};
use super::{
    ConfirmationGate, ConfirmationPrompt, Generation, Notification, PostForm, PostId,
    PostUpdateForm, PostValidationError, User, UserForm, UserId, UserUpdateForm,
    UserValidationError,
};

/// How a successful mutation was reflected in the entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum MutationOutcome {
    /// The store was replaced with a fresh list from the backend.
    Refreshed,
    /// The delete succeeded but the re-fetch failed; the entity was removed
    /// from the store locally.
    RemovedLocally,
    /// The write succeeded but the re-fetch failed; the store is unchanged.
    PersistedWithoutRefresh,
    /// The confirmation gate declined the delete.
    Cancelled,
}

/// Failures surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("{0}")]
    Validation(String),
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("{0}")]
    Unknown(String),
    #[error("this action is already in progress")]
    Busy,
    #[error("the backend is switching; try again once the list has loaded")]
    BackendSwitching,
    #[error("the backend changed while the action was running; result discarded")]
    StaleBackend,
}

impl From<UsersBackendError> for MutationError {
    fn from(value: UsersBackendError) -> Self {
        match value {
            UsersBackendError::Validation { message } => Self::Validation(message),
            UsersBackendError::DuplicateEmail { email } => Self::DuplicateEmail(email),
            UsersBackendError::Unknown { message } => Self::Unknown(message),
        }
    }
}

impl From<UserValidationError> for MutationError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<PostValidationError> for MutationError {
    fn from(value: PostValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<ActionRejection> for MutationError {
    fn from(value: ActionRejection) -> Self {
        match value {
            ActionRejection::Busy => Self::Busy,
            ActionRejection::Switching => Self::BackendSwitching,
        }
    }
}

/// Store fallback applied when a delete succeeded but the re-fetch did not.
#[derive(Debug, Clone, Copy)]
enum LocalRemoval {
    User(UserId),
    Post(PostId),
}

fn verb(action: PendingAction) -> &'static str {
    match action {
        PendingAction::CreateUser => "create user",
        PendingAction::CreatePost => "create post",
        PendingAction::UpdateUser(_) => "update user",
        PendingAction::UpdatePost(_) => "update post",
        PendingAction::DeleteUser(_) => "delete user",
        PendingAction::DeletePost(_) => "delete post",
    }
}

fn success_message(action: PendingAction) -> &'static str {
    match action {
        PendingAction::CreateUser => "User created",
        PendingAction::CreatePost => "Post created",
        PendingAction::UpdateUser(_) => "User updated",
        PendingAction::UpdatePost(_) => "Post updated",
        PendingAction::DeleteUser(_) => "User deleted",
        PendingAction::DeletePost(_) => "Post deleted",
    }
}

fn failure_message(action: PendingAction, err: &MutationError) -> String {
    format!("Could not {}: {err}", verb(action))
}

/// Runs create/update/delete callbacks against the active backend.
#[derive(Debug, Clone)]
pub struct MutationController {
    context: Arc<PageContext>,
}

impl MutationController {
    pub fn new(context: Arc<PageContext>) -> Self {
        Self { context }
    }

    /// Create a user from the submitted form.
    pub async fn submit_create_user(
        &self,
        form: &UserForm,
    ) -> Result<MutationOutcome, MutationError> {
        let action = PendingAction::CreateUser;
        if let Err(err) = form.validate() {
            return Err(self.reject(action, err.into()));
        }
        self.run(action, None, |backend| async move {
            backend.create_user(form).await
        })
        .await
    }

    /// Create a post from the submitted form.
    pub async fn submit_create_post(
        &self,
        form: &PostForm,
    ) -> Result<MutationOutcome, MutationError> {
        let action = PendingAction::CreatePost;
        if let Err(err) = form.validate() {
            return Err(self.reject(action, err.into()));
        }
        self.run(action, None, |backend| async move {
            backend.create_post(form).await
        })
        .await
    }

    /// Apply a partial update to a user.
    pub async fn submit_update_user(
        &self,
        id: UserId,
        form: &UserUpdateForm,
    ) -> Result<MutationOutcome, MutationError> {
        let action = PendingAction::UpdateUser(id);
        if let Err(err) = form.validate() {
            return Err(self.reject(action, err.into()));
        }
        self.run(action, None, |backend| async move {
            backend.update_user(id, form).await
        })
        .await
    }

    /// Apply a partial update to a post.
    pub async fn submit_update_post(
        &self,
        id: PostId,
        form: &PostUpdateForm,
    ) -> Result<MutationOutcome, MutationError> {
        let action = PendingAction::UpdatePost(id);
        if let Err(err) = form.validate() {
            return Err(self.reject(action, err.into()));
        }
        self.run(action, None, |backend| async move {
            backend.update_post(id, form).await
        })
        .await
    }

    /// Delete a user and their posts once `gate` approves.
    pub async fn request_delete_user(
        &self,
        id: UserId,
        gate: &dyn ConfirmationGate,
    ) -> Result<MutationOutcome, MutationError> {
        let prompt = {
            let state = self.context.lock();
            let name = state.store().find_user(id).map(|user| user.name.as_str());
            ConfirmationPrompt::delete_user(id, name)
        };
        if !gate.confirm(&prompt).await {
            info!(user_id = %id, "user deletion cancelled");
            return Ok(MutationOutcome::Cancelled);
        }
        self.run(
            PendingAction::DeleteUser(id),
            Some(LocalRemoval::User(id)),
            |backend| async move { backend.delete_user(id).await },
        )
        .await
    }

    /// Delete a single post once `gate` approves.
    pub async fn request_delete_post(
        &self,
        id: PostId,
        gate: &dyn ConfirmationGate,
    ) -> Result<MutationOutcome, MutationError> {
        let prompt = {
            let state = self.context.lock();
            let title = state.store().find_post(id).map(|post| post.title.as_str());
            ConfirmationPrompt::delete_post(id, title)
        };
        if !gate.confirm(&prompt).await {
            info!(post_id = %id, "post deletion cancelled");
            return Ok(MutationOutcome::Cancelled);
        }
        self.run(
            PendingAction::DeletePost(id),
            Some(LocalRemoval::Post(id)),
            |backend| async move { backend.delete_post(id).await },
        )
        .await
    }

    fn reject(&self, action: PendingAction, err: MutationError) -> MutationError {
        info!(action = %action, error = %err, "mutation rejected");
        self.context
            .lock()
            .notify(Notification::error(failure_message(action, &err)));
        err
    }

    async fn run<F, Fut>(
        &self,
        action: PendingAction,
        removal: Option<LocalRemoval>,
        op: F,
    ) -> Result<MutationOutcome, MutationError>
    where
        F: FnOnce(Arc<dyn UsersBackend>) -> Fut,
        Fut: Future<Output = Result<(), UsersBackendError>>,
    {
        let (generation, kind) = {
            let mut state = self.context.lock();
            let started = state.begin_action(action);
            match started {
                Ok(generation) => (generation, state.active()),
                Err(rejection) => {
                    drop(state);
                    return Err(self.reject(action, rejection.into()));
                }
            }
        };
        let _pending = PendingGuard::new(Arc::clone(&self.context), action);
        let backend = self.context.backends().get(kind);

        if let Err(err) = op(Arc::clone(&backend)).await {
            info!(action = %action, backend = %kind, error = %err, "backend rejected mutation");
            return Err(self.reject(action, err.into()));
        }
        info!(action = %action, backend = %kind, "mutation persisted");

        let refreshed = backend.list_users().await;
        self.apply_refresh(action, generation, removal, refreshed)
    }

    fn apply_refresh(
        &self,
        action: PendingAction,
        generation: Generation,
        removal: Option<LocalRemoval>,
        refreshed: Result<Vec<User>, UsersBackendError>,
    ) -> Result<MutationOutcome, MutationError> {
        let mut state = self.context.lock();
        if !state.is_current(generation) {
            warn!(action = %action, "backend switched mid-mutation; discarding result");
            let err = MutationError::StaleBackend;
            state.notify(Notification::error(failure_message(action, &err)));
            return Err(err);
        }

        let err = match refreshed {
            Ok(users) => {
                state.store_mut().replace(users);
                state.notify(Notification::success(success_message(action)));
                return Ok(MutationOutcome::Refreshed);
            }
            Err(err) => err,
        };

        warn!(action = %action, error = %err, "list refresh after mutation failed");
        let refresh_notice = Notification::error(format!("Could not refresh the list: {err}"));
        match removal {
            Some(LocalRemoval::User(id)) => {
                state.store_mut().remove_user(id);
            }
            Some(LocalRemoval::Post(id)) => {
                state.store_mut().remove_post(id);
            }
            None => {
                state.notify(Notification::success(success_message(action)));
                state.notify(refresh_notice);
                return Ok(MutationOutcome::PersistedWithoutRefresh);
            }
        }
        state.notify(Notification::success(success_message(action)));
        state.notify(refresh_notice);
        Ok(MutationOutcome::RemovedLocally)
    }
}

#[cfg(test)]
#[path = "mutation_controller_tests.rs"]
mod tests;
