//! Contract tests run against both SQLite adapters.
//!
//! Each case opens a fresh database file, migrates it through the Diesel
//! pool and connects the sqlx pool to the same file, mirroring start-up.

use std::sync::Arc;

use mockable::Clock;
use rstest::rstest;
use showcase::domain::ports::{UsersBackend, UsersBackendError};
use showcase::domain::{
    PostForm, PostId, PostUpdateForm, User, UserForm, UserId, UserUpdateForm,
};
use showcase::outbound::persistence::{
    DbPool, DieselUsersBackend, PoolConfig, SqlxUsersBackend, connect_sqlx,
};
use showcase::test_support::clock::SteppingClock;
use sqlx::SqlitePool;
use showcase::test_support::sqlite::TempDatabase;

#[derive(Debug, Clone, Copy)]
enum Library {
    Sqlx,
    Diesel,
}

struct Harness {
    _db: TempDatabase,
    raw: SqlitePool,
    sqlx: SqlxUsersBackend,
    diesel: DieselUsersBackend,
}

impl Harness {
    async fn open() -> Self {
        let db = TempDatabase::new().expect("temporary database");
        let config = PoolConfig::new(db.path());
        let clock: Arc<dyn Clock> = Arc::new(SteppingClock::per_second());
        let diesel_pool = DbPool::open(&config).await.expect("open diesel pool");
        let sqlx_pool = connect_sqlx(&config).await.expect("open sqlx pool");
        Self {
            raw: sqlx_pool.clone(),
            sqlx: SqlxUsersBackend::new(sqlx_pool, Arc::clone(&clock)),
            diesel: DieselUsersBackend::new(diesel_pool, clock),
            _db: db,
        }
    }

    fn backend(&self, library: Library) -> &dyn UsersBackend {
        match library {
            Library::Sqlx => &self.sqlx,
            Library::Diesel => &self.diesel,
        }
    }
}

fn ana() -> UserForm {
    UserForm::new("Ana", "ana@x.com", "1990-05-01")
}

async fn only_user(backend: &dyn UsersBackend) -> User {
    let mut users = backend.list_users().await.expect("list users");
    assert_eq!(users.len(), 1, "expected exactly one user");
    users.remove(0)
}

#[rstest]
#[case::sqlx(Library::Sqlx)]
#[case::diesel(Library::Diesel)]
#[tokio::test]
async fn create_user_adds_exactly_one_user(#[case] library: Library) {
    let harness = Harness::open().await;
    let backend = harness.backend(library);

    backend.create_user(&ana()).await.expect("create user");

    let user = only_user(backend).await;
    assert_eq!(user.name, "Ana");
    assert_eq!(user.email, "ana@x.com");
    assert_eq!(user.birth_date.to_string(), "1990-05-01");
    assert!(user.posts.is_empty());
    assert!(user.created_at.timestamp() > 0);
}

#[rstest]
#[case::sqlx(Library::Sqlx)]
#[case::diesel(Library::Diesel)]
#[tokio::test]
async fn duplicate_email_is_rejected(#[case] library: Library) {
    let harness = Harness::open().await;
    let backend = harness.backend(library);
    backend.create_user(&ana()).await.expect("first create");

    let err = backend
        .create_user(&UserForm::new("Other Ana", "ana@x.com", "1985-01-01"))
        .await
        .expect_err("duplicate email");

    assert_eq!(err, UsersBackendError::duplicate_email("ana@x.com"));
    assert_eq!(only_user(backend).await.name, "Ana");
}

#[rstest]
#[case::sqlx(Library::Sqlx)]
#[case::diesel(Library::Diesel)]
#[tokio::test]
async fn post_for_missing_user_persists_nothing(#[case] library: Library) {
    let harness = Harness::open().await;
    let backend = harness.backend(library);

    let err = backend
        .create_post(&PostForm::new("Hi", "First", "41"))
        .await
        .expect_err("missing author");

    assert!(matches!(err, UsersBackendError::Unknown { .. }), "{err:?}");
    assert!(backend.list_users().await.expect("list").is_empty());
}

#[rstest]
#[case::sqlx(Library::Sqlx)]
#[case::diesel(Library::Diesel)]
#[tokio::test]
async fn invalid_forms_never_reach_the_database(#[case] library: Library) {
    let harness = Harness::open().await;
    let backend = harness.backend(library);

    let err = backend
        .create_user(&UserForm::new("  ", "ana@x.com", "1990-05-01"))
        .await
        .expect_err("blank name");

    assert!(matches!(err, UsersBackendError::Validation { .. }));
    assert!(backend.list_users().await.expect("list").is_empty());
}

#[rstest]
#[case::sqlx(Library::Sqlx)]
#[case::diesel(Library::Diesel)]
#[tokio::test]
async fn deleting_a_user_removes_their_posts(#[case] library: Library) {
    let harness = Harness::open().await;
    let backend = harness.backend(library);
    backend.create_user(&ana()).await.expect("create user");
    let user = only_user(backend).await;
    for title in ["Hi", "Again"] {
        backend
            .create_post(&PostForm::new(title, "body", user.id.to_string()))
            .await
            .expect("create post");
    }
    assert_eq!(only_user(backend).await.posts.len(), 2);

    backend.delete_user(user.id).await.expect("delete user");
    assert!(backend.list_users().await.expect("list").is_empty());

    // Recreating the author must not resurrect orphaned posts.
    backend.create_user(&ana()).await.expect("recreate");
    assert!(only_user(backend).await.posts.is_empty());
}

#[rstest]
#[case::sqlx(Library::Sqlx)]
#[case::diesel(Library::Diesel)]
#[tokio::test]
async fn list_is_newest_first_and_idempotent(#[case] library: Library) {
    let harness = Harness::open().await;
    let backend = harness.backend(library);
    backend.create_user(&ana()).await.expect("ana");
    backend
        .create_user(&UserForm::new("Bo", "bo@x.com", "1970-01-01"))
        .await
        .expect("bo");
    let bo = backend.list_users().await.expect("list")[0].clone();
    backend
        .create_post(&PostForm::new("Old", "1", bo.id.to_string()))
        .await
        .expect("old post");
    backend
        .create_post(&PostForm::new("New", "2", bo.id.to_string()))
        .await
        .expect("new post");

    let first = backend.list_users().await.expect("first list");
    let second = backend.list_users().await.expect("second list");

    assert_eq!(first, second);
    let names: Vec<_> = first.iter().map(|user| user.name.as_str()).collect();
    assert_eq!(names, ["Bo", "Ana"]);
    let titles: Vec<_> = first[0].posts.iter().map(|post| post.title.as_str()).collect();
    assert_eq!(titles, ["New", "Old"]);
}

#[rstest]
#[case::sqlx(Library::Sqlx)]
#[case::diesel(Library::Diesel)]
#[tokio::test]
async fn updates_touch_only_supplied_fields(#[case] library: Library) {
    let harness = Harness::open().await;
    let backend = harness.backend(library);
    backend.create_user(&ana()).await.expect("create user");
    let user = only_user(backend).await;
    backend
        .create_post(&PostForm::new("Hi", "First", user.id.to_string()))
        .await
        .expect("create post");
    let post_id = only_user(backend).await.posts[0].id;

    backend
        .update_user(
            user.id,
            &UserUpdateForm {
                email: "ana@y.com".to_owned(),
                ..UserUpdateForm::default()
            },
        )
        .await
        .expect("update user");
    backend
        .update_post(
            post_id,
            &PostUpdateForm {
                title: "Hello".to_owned(),
                ..PostUpdateForm::default()
            },
        )
        .await
        .expect("update post");

    let updated = only_user(backend).await;
    assert_eq!(updated.name, "Ana");
    assert_eq!(updated.email, "ana@y.com");
    assert_eq!(updated.created_at, user.created_at);
    assert_eq!(updated.posts[0].title, "Hello");
    assert_eq!(updated.posts[0].content, "First");
}

#[rstest]
#[case::sqlx(Library::Sqlx)]
#[case::diesel(Library::Diesel)]
#[tokio::test]
async fn missing_rows_are_unknown(#[case] library: Library) {
    let harness = Harness::open().await;
    let backend = harness.backend(library);

    let results = [
        backend.delete_user(UserId::new(9)).await,
        backend.delete_post(PostId::new(9)).await,
        backend
            .update_user(
                UserId::new(9),
                &UserUpdateForm {
                    name: "Ghost".to_owned(),
                    ..UserUpdateForm::default()
                },
            )
            .await,
        backend
            .update_post(
                PostId::new(9),
                &PostUpdateForm {
                    content: "Boo".to_owned(),
                    ..PostUpdateForm::default()
                },
            )
            .await,
    ];

    for result in results {
        let err = result.expect_err("missing row");
        assert!(matches!(err, UsersBackendError::Unknown { .. }), "{err:?}");
    }
}

#[rstest]
#[tokio::test]
async fn both_libraries_see_the_same_rows() {
    let harness = Harness::open().await;
    harness.sqlx.create_user(&ana()).await.expect("create via sqlx");
    let through_sqlx = harness.sqlx.list_users().await.expect("sqlx list");

    let author = through_sqlx[0].id.to_string();
    harness
        .diesel
        .create_post(&PostForm::new("Hi", "From diesel", author))
        .await
        .expect("create via diesel");

    let through_diesel = harness.diesel.list_users().await.expect("diesel list");
    let back_to_sqlx = harness.sqlx.list_users().await.expect("sqlx list again");
    assert_eq!(through_diesel, back_to_sqlx);
    assert_eq!(through_diesel[0].posts[0].content, "From diesel");
}

#[rstest]
#[tokio::test]
async fn duplicate_email_on_update_is_reported_by_both() {
    let harness = Harness::open().await;
    harness.sqlx.create_user(&ana()).await.expect("ana");
    harness
        .sqlx
        .create_user(&UserForm::new("Bo", "bo@x.com", "1970-01-01"))
        .await
        .expect("bo");
    let bo = harness.sqlx.list_users().await.expect("list")[0].id;
    let form = UserUpdateForm {
        email: "ana@x.com".to_owned(),
        ..UserUpdateForm::default()
    };

    for backend in [Library::Sqlx, Library::Diesel].map(|lib| harness.backend(lib)) {
        let err = backend.update_user(bo, &form).await.expect_err("taken email");
        assert_eq!(err, UsersBackendError::duplicate_email("ana@x.com"));
    }
}

#[rstest]
#[case::sqlx(Library::Sqlx)]
#[case::diesel(Library::Diesel)]
#[tokio::test]
async fn post_updates_can_move_the_post_to_another_author(#[case] library: Library) {
    let harness = Harness::open().await;
    let backend = harness.backend(library);
    backend.create_user(&ana()).await.expect("ana");
    let ana_id = only_user(backend).await.id;
    backend
        .create_post(&PostForm::new("Hi", "First", ana_id.to_string()))
        .await
        .expect("post");
    backend
        .create_user(&UserForm::new("Bo", "bo@x.com", "1970-01-01"))
        .await
        .expect("bo");

    let users = backend.list_users().await.expect("list");
    let bo_id = users[0].id;
    let post_id = users[1].posts[0].id;

    let move_to = |user_id: String| PostUpdateForm {
        user_id,
        ..PostUpdateForm::default()
    };
    let missing_author = backend
        .update_post(post_id, &move_to("999".to_owned()))
        .await
        .expect_err("missing author");
    assert!(matches!(missing_author, UsersBackendError::Unknown { .. }), "{missing_author:?}");
    let malformed = backend
        .update_post(post_id, &move_to("bo".to_owned()))
        .await
        .expect_err("malformed author");
    assert!(matches!(malformed, UsersBackendError::Validation { .. }), "{malformed:?}");

    backend
        .update_post(post_id, &move_to(bo_id.to_string()))
        .await
        .expect("move post");

    let users = backend.list_users().await.expect("list after move");
    assert_eq!(users[0].id, bo_id);
    assert_eq!(users[0].posts.len(), 1);
    assert_eq!(users[0].posts[0].user_id, bo_id);
    assert!(users[1].posts.is_empty());
}

#[rstest]
#[case::sqlx(Library::Sqlx)]
#[case::diesel(Library::Diesel)]
#[tokio::test]
async fn listing_is_not_limited_by_bind_parameters(#[case] library: Library) {
    const USERS: i64 = 33_000;
    let harness = Harness::open().await;
    sqlx::query(
        "WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < ?) \
         INSERT INTO users (name, email, birth_date, created_at) \
         SELECT 'User ' || n, 'user' || n || '@x.com', '1990-05-01', n FROM seq",
    )
    .bind(USERS)
    .execute(&harness.raw)
    .await
    .expect("bulk insert users");
    sqlx::query("INSERT INTO posts (title, content, user_id, created_at) VALUES ('Hi', 'First', 1, 1)")
        .execute(&harness.raw)
        .await
        .expect("insert post");

    let users = harness.backend(library).list_users().await.expect("list");

    assert_eq!(users.len(), usize::try_from(USERS).expect("count fits"));
    let oldest = users.last().expect("oldest user");
    assert_eq!(oldest.name, "User 1");
    assert_eq!(oldest.posts.len(), 1);
}
