//! Column value conversions shared by both backends.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::ports::UsersBackendError;
use crate::domain::{BirthDate, Post, PostId, User, UserId};

/// Encode a timestamp as stored Unix milliseconds.
pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Decode stored Unix milliseconds.
pub(crate) fn from_millis(millis: i64) -> Result<DateTime<Utc>, UsersBackendError> {
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        warn!(millis, "stored timestamp out of range");
        UsersBackendError::unknown("stored timestamp is out of range")
    })
}

/// Column values of one `users` row.
pub(crate) struct UserColumns {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub birth_date: String,
    pub created_at: i64,
}

/// Column values of one `posts` row.
pub(crate) struct PostColumns {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub created_at: i64,
}

pub(crate) fn post_from_columns(row: PostColumns) -> Result<Post, UsersBackendError> {
    Ok(Post {
        id: PostId::new(row.id),
        title: row.title,
        content: row.content,
        user_id: UserId::new(row.user_id),
        created_at: from_millis(row.created_at)?,
    })
}

pub(crate) fn user_from_columns(row: UserColumns, posts: Vec<Post>) -> Result<User, UsersBackendError> {
    let birth_date = BirthDate::parse(&row.birth_date).map_err(|err| {
        warn!(user_id = row.id, value = %row.birth_date, %err, "stored birth date is invalid");
        UsersBackendError::unknown(format!("user {} has an invalid stored birth date", row.id))
    })?;
    Ok(User {
        id: UserId::new(row.id),
        name: row.name,
        email: row.email,
        birth_date,
        created_at: from_millis(row.created_at)?,
        posts,
    })
}
