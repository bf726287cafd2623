//! Confirmation capability required before destructive actions.
//!
//! Delete callbacks take a [`ConfirmationGate`] per call so the decision is
//! scoped to that one action. Inbound adapters choose the gate: the HTTP
//! layer maps its `confirm` query flag onto [`FixedConfirmation`].

use async_trait::async_trait;

use super::{PostId, UserId};

/// Question put to the user before a destructive action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    message: String,
}

impl ConfirmationPrompt {
    /// Prompt shown before deleting a user and all of their posts.
    #[must_use]
    pub fn delete_user(id: UserId, name: Option<&str>) -> Self {
        let subject = name.map_or_else(|| format!("user {id}"), str::to_owned);
        Self {
            message: format!("Are you sure you want to delete {subject}? Their posts are removed too."),
        }
    }

    /// Prompt shown before deleting a single post.
    #[must_use]
    pub fn delete_post(id: PostId, title: Option<&str>) -> Self {
        let message = match title {
            Some(title) => format!("Delete post \"{title}\"?"),
            None => format!("Delete post {id}?"),
        };
        Self { message }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Capability that approves or declines a destructive action.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    /// Ask for confirmation; `true` lets the action proceed.
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool;
}

/// Gate with a predetermined answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedConfirmation(bool);

impl FixedConfirmation {
    /// Gate that approves every prompt.
    #[must_use]
    pub const fn approve() -> Self {
        Self(true)
    }

    /// Gate that declines every prompt.
    #[must_use]
    pub const fn decline() -> Self {
        Self(false)
    }

    #[must_use]
    pub const fn from_flag(confirmed: bool) -> Self {
        Self(confirmed)
    }
}

#[async_trait]
impl ConfirmationGate for FixedConfirmation {
    async fn confirm(&self, _prompt: &ConfirmationPrompt) -> bool {
        self.0
    }
}
