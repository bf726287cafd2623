//! SQLite-backed `UsersBackend` implementation using Diesel ORM.
//!
//! Rows are declared once in `schema.rs` / `models.rs`; inserts, changesets
//! and the user/post association come from Diesel derives. Queries run on
//! the shared connection through `diesel-async`.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;

use crate::domain::ports::{UsersBackend, UsersBackendError};
use crate::domain::{PostForm, PostId, PostUpdateForm, User, UserForm, UserId, UserUpdateForm};

use super::conversions::{PostColumns, UserColumns, post_from_columns, to_millis, user_from_columns};
use super::error_mapping::{WriteContext, map_diesel_error, missing_row};
use super::models::{NewPostRow, NewUserRow, PostChangeset, PostRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::{posts, users};

/// Diesel-backed implementation of the `UsersBackend` port.
#[derive(Clone)]
pub struct DieselUsersBackend {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselUsersBackend {
    /// Create a backend over `pool`, stamping rows with `clock`.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

impl From<UserRow> for UserColumns {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            birth_date: row.birth_date,
            created_at: row.created_at,
        }
    }
}

impl From<PostRow> for PostColumns {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

/// Attach grouped post rows to their users, keeping query order.
fn assemble(user_rows: Vec<UserRow>, post_rows: Vec<PostRow>) -> Result<Vec<User>, UsersBackendError> {
    let grouped = post_rows.grouped_by(&user_rows);
    user_rows
        .into_iter()
        .zip(grouped)
        .map(|(user, posts)| {
            let posts = posts
                .into_iter()
                .map(|post| post_from_columns(post.into()))
                .collect::<Result<Vec<_>, _>>()?;
            user_from_columns(user.into(), posts)
        })
        .collect()
}

#[async_trait]
impl UsersBackend for DieselUsersBackend {
    async fn create_user(&self, form: &UserForm) -> Result<(), UsersBackendError> {
        let user = form.validate()?;
        let row = NewUserRow {
            name: &user.name,
            email: &user.email,
            birth_date: user.birth_date.to_string(),
            created_at: to_millis(self.clock.utc()),
        };
        let context = WriteContext::new("create user").with_email(Some(&user.email));

        let mut conn = self.pool.get().await;
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, context))?;
        Ok(())
    }

    async fn create_post(&self, form: &PostForm) -> Result<(), UsersBackendError> {
        let post = form.validate()?;
        let row = NewPostRow {
            title: &post.title,
            content: &post.content,
            user_id: post.user_id.get(),
            created_at: to_millis(self.clock.utc()),
        };

        let mut conn = self.pool.get().await;
        diesel::insert_into(posts::table)
            .values(&row)
            .execute(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, WriteContext::new("create post")))?;
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), UsersBackendError> {
        let mut conn = self.pool.get().await;
        let deleted = diesel::delete(users::table.find(id.get()))
            .execute(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, WriteContext::new("delete user")))?;
        if deleted == 0 {
            return Err(missing_row("user", id.get()));
        }
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), UsersBackendError> {
        let mut conn = self.pool.get().await;
        let deleted = diesel::delete(posts::table.find(id.get()))
            .execute(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, WriteContext::new("delete post")))?;
        if deleted == 0 {
            return Err(missing_row("post", id.get()));
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, UsersBackendError> {
        let context = WriteContext::new("list users");
        let mut conn = self.pool.get().await;
        let user_rows: Vec<UserRow> = users::table
            .order((users::created_at.desc(), users::id.desc()))
            .select(UserRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, context))?;
        // Every post belongs to a listed user (FK + cascade), so loading the
        // whole table avoids binding one parameter per user.
        let post_rows: Vec<PostRow> = posts::table
            .order((posts::created_at.desc(), posts::id.desc()))
            .select(PostRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, context))?;
        drop(conn);

        assemble(user_rows, post_rows)
    }

    async fn update_user(
        &self,
        id: UserId,
        form: &UserUpdateForm,
    ) -> Result<(), UsersBackendError> {
        let changes = form.validate()?;
        let changeset = UserChangeset {
            name: changes.name.as_deref(),
            email: changes.email.as_deref(),
            birth_date: changes.birth_date.map(|date| date.to_string()),
        };
        let context = WriteContext::new("update user").with_email(changes.email.as_deref());

        let mut conn = self.pool.get().await;
        let updated = diesel::update(users::table.find(id.get()))
            .set(&changeset)
            .execute(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, context))?;
        if updated == 0 {
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
        let changeset = PostChangeset {
            title: changes.title.as_deref(),
            content: changes.content.as_deref(),
            user_id: changes.user_id.map(UserId::get),
        };

        let mut conn = self.pool.get().await;
        let updated = diesel::update(posts::table.find(id.get()))
            .set(&changeset)
            .execute(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, WriteContext::new("update post")))?;
        if updated == 0 {
            return Err(missing_row("post", id.get()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for DieselUsersBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DieselUsersBackend").finish_non_exhaustive()
    }
}
