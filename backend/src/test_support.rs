//! Test utilities for the showcase crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

pub mod clock {
    //! Deterministic clocks for timestamp assertions.

    use std::sync::Mutex;

    use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
    use mockable::Clock;

    /// Clock that advances by a fixed step every time it is read.
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: TimeDelta,
    }

    impl SteppingClock {
        pub fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }

        /// Clock starting at 2024-01-01T00:00:00Z, one second per read.
        pub fn per_second() -> Self {
            let start = match Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single() {
                Some(start) => start,
                None => panic!("valid fixture timestamp"),
            };
            Self::new(start, TimeDelta::seconds(1))
        }
    }

    impl Clock for SteppingClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            let mut next = match self.next.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            };
            let now = *next;
            *next = now + self.step;
            now
        }
    }
}

pub mod backends {
    //! Backend wrappers that let tests interleave concurrent page actions.

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use crate::domain::ports::{UsersBackend, UsersBackendError};
    use crate::domain::{
        PostForm, PostId, PostUpdateForm, User, UserForm, UserId, UserUpdateForm,
    };

    type Hold = (oneshot::Sender<()>, oneshot::Receiver<()>);

    /// Delegating backend whose next `list_users` call can be paused.
    pub struct GatedUsersBackend {
        inner: Arc<dyn UsersBackend>,
        hold: Mutex<Option<Hold>>,
    }

    /// Handle for a paused `list_users` call.
    pub struct HeldList {
        started: oneshot::Receiver<()>,
        release: oneshot::Sender<()>,
    }

    impl HeldList {
        /// Wait until the paused call has been entered.
        pub async fn wait_started(&mut self) {
            let _ = (&mut self.started).await;
        }

        /// Let the paused call continue.
        pub fn release(self) {
            let _ = self.release.send(());
        }
    }

    impl GatedUsersBackend {
        pub fn new(inner: Arc<dyn UsersBackend>) -> Self {
            Self {
                inner,
                hold: Mutex::new(None),
            }
        }

        /// Pause the next `list_users` call until the handle is released.
        pub fn hold_next_list(&self) -> HeldList {
            let (started_tx, started_rx) = oneshot::channel();
            let (release_tx, release_rx) = oneshot::channel();
            *self.lock_hold() = Some((started_tx, release_rx));
            HeldList {
                started: started_rx,
                release: release_tx,
            }
        }

        fn lock_hold(&self) -> std::sync::MutexGuard<'_, Option<Hold>> {
            match self.hold.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("hold mutex"),
            }
        }
    }

    #[async_trait]
    impl UsersBackend for GatedUsersBackend {
        async fn create_user(&self, form: &UserForm) -> Result<(), UsersBackendError> {
            self.inner.create_user(form).await
        }

        async fn create_post(&self, form: &PostForm) -> Result<(), UsersBackendError> {
            self.inner.create_post(form).await
        }

        async fn delete_user(&self, id: UserId) -> Result<(), UsersBackendError> {
            self.inner.delete_user(id).await
        }

        async fn delete_post(&self, id: PostId) -> Result<(), UsersBackendError> {
            self.inner.delete_post(id).await
        }

        async fn list_users(&self) -> Result<Vec<User>, UsersBackendError> {
            let hold = self.lock_hold().take();
            if let Some((started, release)) = hold {
                let _ = started.send(());
                let _ = release.await;
            }
            self.inner.list_users().await
        }

        async fn update_user(
            &self,
            id: UserId,
            form: &UserUpdateForm,
        ) -> Result<(), UsersBackendError> {
            self.inner.update_user(id, form).await
        }

        async fn update_post(
            &self,
            id: PostId,
            form: &PostUpdateForm,
        ) -> Result<(), UsersBackendError> {
            self.inner.update_post(id, form).await
        }
    }
}

pub mod sqlite {
    //! Scratch SQLite databases for adapter integration tests.

    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    /// Database file inside a temporary directory removed on drop.
    pub struct TempDatabase {
        _dir: TempDir,
        path: PathBuf,
    }

    impl TempDatabase {
        pub fn new() -> std::io::Result<Self> {
            let dir = tempfile::tempdir()?;
            let path = dir.path().join("showcase.db");
            Ok(Self { _dir: dir, path })
        }

        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }
    }
}
