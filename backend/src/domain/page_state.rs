//! Shared state behind the users page: active backend, generation token,
//! in-flight action markers, the entity store and queued notifications.
//!
//! The state sits in a `std::sync::Mutex`. Callers take the lock only for
//! short synchronous sections and never hold it across an `.await`.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::ports::UsersBackend;
use super::{BackendKind, EntityStore, Notification, PostId, UserId};

/// Token bumped on every backend switch.
///
/// Async results carry the generation they started under; a mismatch at
/// completion means the backend changed and the result must be dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Marker for one in-flight mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PendingAction {
    CreateUser,
    CreatePost,
    UpdateUser(UserId),
    UpdatePost(PostId),
    DeleteUser(UserId),
    DeletePost(PostId),
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateUser => f.write_str("create-user"),
            Self::CreatePost => f.write_str("create-post"),
            Self::UpdateUser(id) => write!(f, "update-user:{id}"),
            Self::UpdatePost(id) => write!(f, "update-post:{id}"),
            Self::DeleteUser(id) => write!(f, "delete-user:{id}"),
            Self::DeletePost(id) => write!(f, "delete-post:{id}"),
        }
    }
}

/// Why an action could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActionRejection {
    /// The same action is already running.
    #[error("action already in progress")]
    Busy,
    /// A backend switch has not finished loading.
    #[error("backend switch in progress")]
    Switching,
}

/// Most notifications kept between drains; older ones are dropped first.
pub const NOTIFICATION_CAPACITY: usize = 50;

/// Mutable page state.
#[derive(Debug, Default)]
pub struct PageState {
    active: BackendKind,
    generation: Generation,
    switching: Option<Generation>,
    pending: BTreeSet<PendingAction>,
    store: EntityStore,
    notifications: VecDeque<Notification>,
}

impl PageState {
    /// Fresh state with `active` selected and an empty store.
    #[must_use]
    pub fn new(active: BackendKind) -> Self {
        Self {
            active,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn active(&self) -> BackendKind {
        self.active
    }

    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// True while a switch is waiting for its list.
    #[must_use]
    pub const fn is_switching(&self) -> bool {
        self.switching.is_some()
    }

    /// Whether a result captured under `generation` is still applicable.
    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    /// Select `kind`, bump the generation and mark the list as loading.
    pub fn begin_switch(&mut self, kind: BackendKind) -> Generation {
        self.active = kind;
        self.generation = self.generation.next();
        self.switching = Some(self.generation);
        self.generation
    }

    /// Clear the loading marker if `generation` is the switch in flight.
    pub fn finish_switch(&mut self, generation: Generation) {
        if self.switching == Some(generation) {
            self.switching = None;
        }
    }

    /// Register `action` as in flight.
    pub fn begin_action(&mut self, action: PendingAction) -> Result<Generation, ActionRejection> {
        if self.is_switching() {
            return Err(ActionRejection::Switching);
        }
        if !self.pending.insert(action) {
            return Err(ActionRejection::Busy);
        }
        Ok(self.generation)
    }

    pub fn end_action(&mut self, action: PendingAction) {
        self.pending.remove(&action);
    }

    /// In-flight actions in stable order.
    pub fn pending(&self) -> impl Iterator<Item = PendingAction> + '_ {
        self.pending.iter().copied()
    }

    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    /// Queue `notification`, evicting the oldest past
    /// [`NOTIFICATION_CAPACITY`].
    pub fn notify(&mut self, notification: Notification) {
        if self.notifications.len() == NOTIFICATION_CAPACITY {
            self.notifications.pop_front();
        }
        self.notifications.push_back(notification);
    }

    /// Remove and return queued notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications).into()
    }
}

/// The backend implementations available to the page.
#[derive(Clone)]
pub struct BackendRegistry {
    sqlx: Arc<dyn UsersBackend>,
    diesel: Arc<dyn UsersBackend>,
}

impl BackendRegistry {
    pub fn new(sqlx: Arc<dyn UsersBackend>, diesel: Arc<dyn UsersBackend>) -> Self {
        Self { sqlx, diesel }
    }

    /// Backend implementing `kind`.
    #[must_use]
    pub fn get(&self, kind: BackendKind) -> Arc<dyn UsersBackend> {
        match kind {
            BackendKind::Sqlx => Arc::clone(&self.sqlx),
            BackendKind::Diesel => Arc::clone(&self.diesel),
        }
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry").finish_non_exhaustive()
    }
}

/// Page state plus the backends it drives, shared by the controller and
/// the selector.
#[derive(Debug)]
pub struct PageContext {
    state: Mutex<PageState>,
    backends: BackendRegistry,
}

impl PageContext {
    pub fn new(initial: BackendKind, backends: BackendRegistry) -> Self {
        Self {
            state: Mutex::new(PageState::new(initial)),
            backends,
        }
    }

    /// Lock the state; a poisoned lock is recovered since every critical
    /// section leaves the state consistent.
    pub fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn backends(&self) -> &BackendRegistry {
        &self.backends
    }
}

/// Clears a pending-action marker when dropped.
pub(crate) struct PendingGuard {
    context: Arc<PageContext>,
    action: PendingAction,
}

impl PendingGuard {
    pub(crate) fn new(context: Arc<PageContext>, action: PendingAction) -> Self {
        Self { context, action }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.context.lock().end_action(self.action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn state() -> PageState {
        PageState::new(BackendKind::Sqlx)
    }

    #[rstest]
    fn switch_bumps_generation_and_marks_loading(mut state: PageState) {
        let before = state.generation();
        let generation = state.begin_switch(BackendKind::Diesel);
        assert!(generation > before);
        assert!(state.is_switching());
        assert_eq!(state.active(), BackendKind::Diesel);
        assert!(!state.is_current(before));
    }

    #[rstest]
    fn only_the_latest_switch_clears_loading(mut state: PageState) {
        let first = state.begin_switch(BackendKind::Diesel);
        let second = state.begin_switch(BackendKind::Sqlx);
        state.finish_switch(first);
        assert!(state.is_switching());
        state.finish_switch(second);
        assert!(!state.is_switching());
    }

    #[rstest]
    fn undrained_notifications_keep_only_the_newest(mut state: PageState) {
        for index in 0..NOTIFICATION_CAPACITY + 25 {
            state.notify(Notification::error(format!("failure {index}")));
        }

        let queued = state.take_notifications();
        assert_eq!(queued.len(), NOTIFICATION_CAPACITY);
        assert_eq!(queued[0].message, "failure 25");
        assert_eq!(
            queued[NOTIFICATION_CAPACITY - 1].message,
            format!("failure {}", NOTIFICATION_CAPACITY + 24)
        );
        assert!(state.take_notifications().is_empty());
    }

    #[rstest]
    fn duplicate_actions_are_busy(mut state: PageState) {
        let action = PendingAction::DeleteUser(UserId::new(1));
        assert!(state.begin_action(action).is_ok());
        assert_eq!(state.begin_action(action), Err(ActionRejection::Busy));
        assert!(state.begin_action(PendingAction::DeleteUser(UserId::new(2))).is_ok());
        state.end_action(action);
        assert!(state.begin_action(action).is_ok());
    }

    #[rstest]
    fn actions_are_rejected_while_switching(mut state: PageState) {
        state.begin_switch(BackendKind::Diesel);
        assert_eq!(
            state.begin_action(PendingAction::CreateUser),
            Err(ActionRejection::Switching)
        );
    }

    #[rstest]
    fn notifications_drain_in_order(mut state: PageState) {
        state.notify(Notification::success("one"));
        state.notify(Notification::error("two"));
        let drained = state.take_notifications();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "one");
        assert!(state.take_notifications().is_empty());
    }

    #[rstest]
    fn pending_actions_render_stable_labels() {
        assert_eq!(PendingAction::DeletePost(PostId::new(4)).to_string(), "delete-post:4");
        assert_eq!(PendingAction::CreateUser.to_string(), "create-user");
    }
}
