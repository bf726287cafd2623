//! Port abstraction for the interchangeable users/posts data-access backends.
//!
//! Each backend wraps one data-access library. All of them accept the raw
//! forms, re-validate them, and normalise their native failures into
//! [`UsersBackendError`] so callers never see driver-specific errors.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Post, PostForm, PostId, PostUpdateForm, PostValidationError, User, UserForm, UserId,
    UserUpdateForm, UserValidationError,
};

use super::define_port_error;

define_port_error! {
    /// Normalised failures reported by every users backend.
    pub enum UsersBackendError {
        /// Submitted fields were missing or malformed.
        Validation { message: String } => "{message}",
        /// Another user already owns the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
        /// Any other failure, including missing rows and broken references.
        Unknown { message: String } => "{message}",
    }
}

impl From<UserValidationError> for UsersBackendError {
    fn from(value: UserValidationError) -> Self {
        Self::validation(value.to_string())
    }
}

impl From<PostValidationError> for UsersBackendError {
    fn from(value: PostValidationError) -> Self {
        Self::validation(value.to_string())
    }
}

/// CRUD surface shared by the query-builder and ORM backends.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersBackend: Send + Sync {
    /// Persist a new user.
    async fn create_user(&self, form: &UserForm) -> Result<(), UsersBackendError>;

    /// Persist a new post for an existing user.
    async fn create_post(&self, form: &PostForm) -> Result<(), UsersBackendError>;

    /// Delete a user together with their posts.
    async fn delete_user(&self, id: UserId) -> Result<(), UsersBackendError>;

    /// Delete a single post.
    async fn delete_post(&self, id: PostId) -> Result<(), UsersBackendError>;

    /// Every user with their posts, newest first.
    async fn list_users(&self) -> Result<Vec<User>, UsersBackendError>;

    /// Apply the non-blank fields of `form` to an existing user.
    async fn update_user(&self, id: UserId, form: &UserUpdateForm)
    -> Result<(), UsersBackendError>;

    /// Apply the non-blank fields of `form` to an existing post.
    async fn update_post(&self, id: PostId, form: &PostUpdateForm)
    -> Result<(), UsersBackendError>;
}

/// In-memory backend honouring the same contract as the SQLite adapters.
///
/// Timestamps advance one second per insert from the Unix epoch so ordering
/// is deterministic in tests.
#[derive(Debug, Default)]
pub struct FixtureUsersBackend {
    state: Mutex<FixtureState>,
}

#[derive(Debug, Default)]
struct FixtureState {
    users: Vec<User>,
    posts: Vec<Post>,
    last_id: i64,
}

impl FixtureState {
    fn next(&mut self) -> (i64, DateTime<Utc>) {
        self.last_id += 1;
        let created_at = DateTime::<Utc>::from_timestamp(self.last_id, 0)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        (self.last_id, created_at)
    }
}

impl FixtureUsersBackend {
    fn with_state<T>(&self, f: impl FnOnce(&mut FixtureState) -> T) -> T {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

#[async_trait]
impl UsersBackend for FixtureUsersBackend {
    async fn create_user(&self, form: &UserForm) -> Result<(), UsersBackendError> {
        let new_user = form.validate()?;
        self.with_state(|state| {
            if state.users.iter().any(|user| user.email == new_user.email) {
                return Err(UsersBackendError::duplicate_email(new_user.email));
            }
            let (id, created_at) = state.next();
            state.users.push(User {
                id: UserId::new(id),
                name: new_user.name,
                email: new_user.email,
                birth_date: new_user.birth_date,
                created_at,
                posts: Vec::new(),
            });
            Ok(())
        })
    }

    async fn create_post(&self, form: &PostForm) -> Result<(), UsersBackendError> {
        let new_post = form.validate()?;
        self.with_state(|state| {
            if !state.users.iter().any(|user| user.id == new_post.user_id) {
                return Err(UsersBackendError::unknown(format!(
                    "user {} does not exist",
                    new_post.user_id
                )));
            }
            let (id, created_at) = state.next();
            state.posts.push(Post {
                id: PostId::new(id),
                title: new_post.title,
                content: new_post.content,
                user_id: new_post.user_id,
                created_at,
            });
            Ok(())
        })
    }

    async fn delete_user(&self, id: UserId) -> Result<(), UsersBackendError> {
        self.with_state(|state| {
            let before = state.users.len();
            state.users.retain(|user| user.id != id);
            if state.users.len() == before {
                return Err(UsersBackendError::unknown(format!("user {id} does not exist")));
            }
            state.posts.retain(|post| post.user_id != id);
            Ok(())
        })
    }

    async fn delete_post(&self, id: PostId) -> Result<(), UsersBackendError> {
        self.with_state(|state| {
            let before = state.posts.len();
            state.posts.retain(|post| post.id != id);
            if state.posts.len() == before {
                return Err(UsersBackendError::unknown(format!("post {id} does not exist")));
            }
            Ok(())
        })
    }

    async fn list_users(&self) -> Result<Vec<User>, UsersBackendError> {
        Ok(self.with_state(|state| {
            let mut users = state.users.clone();
            users.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            for user in &mut users {
                user.posts = state
                    .posts
                    .iter()
                    .filter(|post| post.user_id == user.id)
                    .cloned()
                    .collect();
                user.posts
                    .sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            }
            users
        }))
    }

    async fn update_user(
        &self,
        id: UserId,
        form: &UserUpdateForm,
    ) -> Result<(), UsersBackendError> {
        let changes = form.validate()?;
        self.with_state(|state| {
            if let Some(email) = &changes.email {
                if state.users.iter().any(|user| user.id != id && &user.email == email) {
                    return Err(UsersBackendError::duplicate_email(email.clone()));
                }
            }
            let user = state
                .users
                .iter_mut()
                .find(|user| user.id == id)
                .ok_or_else(|| UsersBackendError::unknown(format!("user {id} does not exist")))?;
            if let Some(name) = changes.name {
                user.name = name;
            }
            if let Some(email) = changes.email {
                user.email = email;
            }
            if let Some(birth_date) = changes.birth_date {
                user.birth_date = birth_date;
            }
            Ok(())
        })
    }

    async fn update_post(
        &self,
        id: PostId,
        form: &PostUpdateForm,
    ) -> Result<(), UsersBackendError> {
        let changes = form.validate()?;
        self.with_state(|state| {
            if let Some(user_id) = changes.user_id {
                if !state.users.iter().any(|user| user.id == user_id) {
                    return Err(UsersBackendError::unknown(format!(
                        "user {user_id} does not exist"
                    )));
                }
            }
            let post = state
                .posts
                .iter_mut()
                .find(|post| post.id == id)
                .ok_or_else(|| UsersBackendError::unknown(format!("post {id} does not exist")))?;
            if let Some(title) = changes.title {
                post.title = title;
            }
            if let Some(content) = changes.content {
                post.content = content;
            }
            if let Some(user_id) = changes.user_id {
                post.user_id = user_id;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn backend() -> FixtureUsersBackend {
        FixtureUsersBackend::default()
    }

    async fn seed_ana(backend: &FixtureUsersBackend) -> UserId {
        backend
            .create_user(&UserForm::new("Ana", "ana@x.com", "1990-05-01"))
            .await
            .expect("create Ana");
        backend.list_users().await.expect("list")[0].id
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_rejected(backend: FixtureUsersBackend) {
        seed_ana(&backend).await;
        let err = backend
            .create_user(&UserForm::new("Bob", "ana@x.com", "1985-01-01"))
            .await
            .expect_err("duplicate");
        assert_eq!(err, UsersBackendError::duplicate_email("ana@x.com"));
        assert_eq!(backend.list_users().await.expect("list").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn posts_for_missing_users_are_unknown_errors(backend: FixtureUsersBackend) {
        let err = backend
            .create_post(&PostForm::new("Hi", "Hello", "42"))
            .await
            .expect_err("missing user");
        assert!(matches!(err, UsersBackendError::Unknown { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_a_user_cascades_to_posts(backend: FixtureUsersBackend) {
        let ana = seed_ana(&backend).await;
        backend
            .create_post(&PostForm::new("Hi", "Hello", ana.to_string()))
            .await
            .expect("post");
        backend.delete_user(ana).await.expect("delete");
        assert!(backend.list_users().await.expect("list").is_empty());
        let state_posts = backend.with_state(|state| state.posts.len());
        assert_eq!(state_posts, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn newest_users_come_first(backend: FixtureUsersBackend) {
        seed_ana(&backend).await;
        backend
            .create_user(&UserForm::new("Bob", "bob@x.com", "1985-01-01"))
            .await
            .expect("create Bob");
        let names: Vec<_> = backend
            .list_users()
            .await
            .expect("list")
            .into_iter()
            .map(|user| user.name)
            .collect();
        assert_eq!(names, vec!["Bob".to_owned(), "Ana".to_owned()]);
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_missing_post_is_unknown(backend: FixtureUsersBackend) {
        let form = PostUpdateForm {
            title: "New".to_owned(),
            ..PostUpdateForm::default()
        };
        let err = backend
            .update_post(PostId::new(5), &form)
            .await
            .expect_err("missing post");
        assert!(matches!(err, UsersBackendError::Unknown { .. }));
    }

    #[rstest]
    fn validation_errors_keep_their_message() {
        let err = UsersBackendError::from(UserValidationError::EmptyField { field: "name" });
        assert_eq!(err.to_string(), "name must not be empty");
    }
}
