//! Post data model and form validation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Validation errors raised while checking post forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// A required field was blank.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    /// The author reference was not an integer identifier.
    #[error("userId must be an integer, got {value:?}")]
    InvalidUserId { value: String },
    /// An update form did not change anything.
    #[error("no fields to update")]
    NoChanges,
}

/// Backend-assigned post identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PostId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Persisted post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[schema(value_type = i64, example = 7)]
    pub id: PostId,
    #[schema(example = "Hi")]
    pub title: String,
    #[schema(example = "Hello")]
    pub content: String,
    #[schema(value_type = i64, example = 1)]
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Raw create-post form. `user_id` arrives as text from the selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    #[schema(example = "1")]
    pub user_id: String,
}

impl PostForm {
    /// Build a form from field values.
    pub fn new(title: impl Into<String>, content: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            user_id: user_id.into(),
        }
    }

    /// Check required fields and parse the author reference.
    ///
    /// # Examples
    /// ```
    /// use showcase::domain::{PostForm, UserId};
    ///
    /// let post = PostForm::new("Hi", "Hello", "3").validate().expect("valid");
    /// assert_eq!(post.user_id, UserId::new(3));
    /// ```
    pub fn validate(&self) -> Result<NewPost, PostValidationError> {
        let title = required(&self.title, "title")?;
        let content = required(&self.content, "content")?;
        let user_id = parse_user_id(&self.user_id)?;
        Ok(NewPost {
            title,
            content,
            user_id,
        })
    }
}

/// Validated create-post payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub user_id: UserId,
}

/// Raw partial-update form; blank fields mean "leave unchanged".
///
/// A non-blank `user_id` moves the post to another author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PostUpdateForm {
    pub title: String,
    pub content: String,
    #[schema(example = "2")]
    pub user_id: String,
}

impl PostUpdateForm {
    /// Collect the fields that would change.
    ///
    /// # Examples
    /// ```
    /// use showcase::domain::{PostUpdateForm, UserId};
    ///
    /// let form = PostUpdateForm {
    ///     user_id: "2".to_owned(),
    ///     ..PostUpdateForm::default()
    /// };
    /// assert_eq!(form.validate().expect("valid").user_id, Some(UserId::new(2)));
    /// ```
    pub fn validate(&self) -> Result<PostChanges, PostValidationError> {
        let user_id = match optional(&self.user_id) {
            Some(raw) => Some(parse_user_id(&raw)?),
            None => None,
        };
        let changes = PostChanges {
            title: optional(&self.title),
            content: optional(&self.content),
            user_id,
        };
        if changes.is_empty() {
            return Err(PostValidationError::NoChanges);
        }
        Ok(changes)
    }
}

/// Validated partial update for a post row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub user_id: Option<UserId>,
}

impl PostChanges {
    /// True when no column would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.user_id.is_none()
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, PostValidationError> {
    let trimmed = required(raw, "userId")?;
    trimmed
        .parse::<i64>()
        .map(UserId::new)
        .map_err(|_| PostValidationError::InvalidUserId { value: trimmed })
}

fn required(raw: &str, field: &'static str) -> Result<String, PostValidationError> {
    optional(raw).ok_or(PostValidationError::EmptyField { field })
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
