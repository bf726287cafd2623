//! In-memory snapshot of the users (and their posts) currently displayed.

use super::{Post, PostId, User, UserId};

/// Ordered list of users mirrored from the active backend.
///
/// The store performs no validation; order is whatever the backend returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    users: Vec<User>,
}

impl EntityStore {
    /// Create a store seeded with `users`.
    #[must_use]
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// Swap the whole list for a fresh backend result.
    pub fn replace(&mut self, users: Vec<User>) {
        self.users = users;
    }

    /// Drop the user with `id`; returns whether a user was removed.
    pub fn remove_user(&mut self, id: UserId) -> bool {
        let before = self.users.len();
        self.users.retain(|user| user.id != id);
        self.users.len() != before
    }

    /// Drop the post with `id` from whichever user owns it.
    pub fn remove_post(&mut self, id: PostId) -> bool {
        for user in &mut self.users {
            if let Some(index) = user.posts.iter().position(|post| post.id == id) {
                user.posts.remove(index);
                return true;
            }
        }
        false
    }

    /// Current users in display order.
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn find_post(&self, id: PostId) -> Option<&Post> {
        self.users
            .iter()
            .flat_map(|user| user.posts.iter())
            .find(|post| post.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
