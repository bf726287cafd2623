//! SQLite-backed `UsersBackend` built with the `sqlx` query builder.
//!
//! Writes are assembled with `QueryBuilder`, reads are hand-written `SELECT`
//! statements mapped through `FromRow`. Posts are grouped onto their authors
//! in memory after both reads ran in one transaction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use sqlx::sqlite::{Sqlite, SqlitePool};
use sqlx::{FromRow, QueryBuilder};

use crate::domain::ports::{UsersBackend, UsersBackendError};
use crate::domain::{
    Post, PostForm, PostId, PostUpdateForm, User, UserForm, UserId, UserUpdateForm,
};

use super::conversions::{PostColumns, UserColumns, post_from_columns, to_millis, user_from_columns};
use super::error_mapping::{WriteContext, map_sqlx_error, missing_row};

#[derive(Debug, FromRow)]
struct UserRecord {
    id: i64,
    name: String,
    email: String,
    birth_date: String,
    created_at: i64,
}

impl From<UserRecord> for UserColumns {
    fn from(value: UserRecord) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            birth_date: value.birth_date,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PostRecord {
    id: i64,
    title: String,
    content: String,
    user_id: i64,
    created_at: i64,
}

impl From<PostRecord> for PostColumns {
    fn from(value: PostRecord) -> Self {
        Self {
            id: value.id,
            title: value.title,
            content: value.content,
            user_id: value.user_id,
            created_at: value.created_at,
        }
    }
}

const SELECT_USERS: &str = "SELECT id, name, email, birth_date, created_at FROM users \
     ORDER BY created_at DESC, id DESC";

const SELECT_POSTS: &str = "SELECT id, title, content, user_id, created_at FROM posts \
     ORDER BY created_at DESC, id DESC";

/// Query-builder implementation of the `UsersBackend` port.
#[derive(Clone)]
pub struct SqlxUsersBackend {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqlxUsersBackend {
    /// Create a backend over `pool`, stamping rows with `clock`.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl UsersBackend for SqlxUsersBackend {
    async fn create_user(&self, form: &UserForm) -> Result<(), UsersBackendError> {
        let user = form.validate()?;
        let email = user.email.clone();
        let created_at = to_millis(self.clock.utc());

        let mut insert =
            QueryBuilder::<Sqlite>::new("INSERT INTO users (name, email, birth_date, created_at) ");
        insert.push_values([user], |mut row, user| {
            row.push_bind(user.name)
                .push_bind(user.email)
                .push_bind(user.birth_date.to_string())
                .push_bind(created_at);
        });
        insert.build().execute(&self.pool).await.map_err(|err| {
            map_sqlx_error(err, WriteContext::new("create user").with_email(Some(&email)))
        })?;
        Ok(())
    }

    async fn create_post(&self, form: &PostForm) -> Result<(), UsersBackendError> {
        let post = form.validate()?;
        let created_at = to_millis(self.clock.utc());

        let mut insert =
            QueryBuilder::<Sqlite>::new("INSERT INTO posts (title, content, user_id, created_at) ");
        insert.push_values([post], |mut row, post| {
            row.push_bind(post.title)
                .push_bind(post.content)
                .push_bind(post.user_id.get())
                .push_bind(created_at);
        });
        insert
            .build()
            .execute(&self.pool)
            .await
            .map_err(|err| map_sqlx_error(err, WriteContext::new("create post")))?;
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), UsersBackendError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|err| map_sqlx_error(err, WriteContext::new("delete user")))?;
        if result.rows_affected() == 0 {
            return Err(missing_row("user", id.get()));
        }
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), UsersBackendError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|err| map_sqlx_error(err, WriteContext::new("delete post")))?;
        if result.rows_affected() == 0 {
            return Err(missing_row("post", id.get()));
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, UsersBackendError> {
        let context = WriteContext::new("list users");
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| map_sqlx_error(err, context))?;
        let users: Vec<UserRecord> = sqlx::query_as(SELECT_USERS)
            .fetch_all(&mut *tx)
            .await
            .map_err(|err| map_sqlx_error(err, context))?;
        let posts: Vec<PostRecord> = sqlx::query_as(SELECT_POSTS)
            .fetch_all(&mut *tx)
            .await
            .map_err(|err| map_sqlx_error(err, context))?;
        tx.commit().await.map_err(|err| map_sqlx_error(err, context))?;

        let mut by_author: HashMap<i64, Vec<Post>> = HashMap::new();
        for record in posts {
            let post = post_from_columns(record.into())?;
            by_author.entry(post.user_id.get()).or_default().push(post);
        }
        users
            .into_iter()
            .map(|record| {
                let posts = by_author.remove(&record.id).unwrap_or_default();
                user_from_columns(record.into(), posts)
            })
            .collect()
    }

    async fn update_user(
        &self,
        id: UserId,
        form: &UserUpdateForm,
    ) -> Result<(), UsersBackendError> {
        let changes = form.validate()?;
        let context = WriteContext::new("update user").with_email(changes.email.as_deref());

        let mut update = QueryBuilder::<Sqlite>::new("UPDATE users SET ");
        {
            let mut columns = update.separated(", ");
            if let Some(name) = &changes.name {
                columns.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(email) = &changes.email {
                columns.push("email = ").push_bind_unseparated(email.clone());
            }
            if let Some(birth_date) = changes.birth_date {
                columns
                    .push("birth_date = ")
                    .push_bind_unseparated(birth_date.to_string());
            }
        }
        update.push(" WHERE id = ").push_bind(id.get());

        let result = update
            .build()
            .execute(&self.pool)
            .await
            .map_err(|err| map_sqlx_error(err, context))?;
        if result.rows_affected() == 0 {
            return Err(missing_row("user", id.get()));
        }
        Ok(())
    }

    async fn update_post(
        &self,
        id: PostId,
        form: &PostUpdateForm,
    ) -> Result<(), UsersBackendError> {
        let changes = form.validate()?;

        let mut update = QueryBuilder::<Sqlite>::new("UPDATE posts SET ");
        {
            let mut columns = update.separated(", ");
            if let Some(title) = changes.title {
                columns.push("title = ").push_bind_unseparated(title);
            }
            if let Some(content) = changes.content {
                columns.push("content = ").push_bind_unseparated(content);
            }
            if let Some(user_id) = changes.user_id {
                columns.push("user_id = ").push_bind_unseparated(user_id.get());
            }
        }
        update.push(" WHERE id = ").push_bind(id.get());

        let result = update
            .build()
            .execute(&self.pool)
            .await
            .map_err(|err| map_sqlx_error(err, WriteContext::new("update post")))?;
        if result.rows_affected() == 0 {
            return Err(missing_row("post", id.get()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SqlxUsersBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlxUsersBackend").finish_non_exhaustive()
    }
}
