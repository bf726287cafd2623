//! Source excerpts shown beside the page so the two libraries can be
//! compared line by line.

use serde::Serialize;
use utoipa::ToSchema;

use super::BackendKind;
use super::ports::SyntaxHighlighter;

/// What a snippet demonstrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SnippetTopic {
    Schema,
    ListUsers,
    CreateUser,
    CreatePost,
    DeleteUser,
    DeletePost,
}

/// One unhighlighted excerpt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snippet {
    pub backend: BackendKind,
    pub topic: SnippetTopic,
    pub file_name: &'static str,
    pub language: &'static str,
    pub code: &'static str,
}

/// A snippet paired with its highlighted HTML, when highlighting worked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSnippet {
    pub backend: BackendKind,
    pub topic: SnippetTopic,
    pub file_name: String,
    pub language: String,
    pub code: String,
    /// `None` tells the client to show `code` as plain text.
    pub html: Option<String>,
}

const SQLX_SCHEMA: &str = r#"CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    birth_date TEXT NOT NULL,
    created_at BIGINT NOT NULL
);

CREATE TABLE posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at BIGINT NOT NULL
);"#;

const SQLX_LIST_USERS: &str = r#"let users: Vec<UserRecord> = sqlx::query_as(
    "SELECT id, name, email, birth_date, created_at FROM users \
     ORDER BY created_at DESC, id DESC",
)
.fetch_all(&self.pool)
.await?;

let posts: Vec<PostRecord> = sqlx::query_as(
    "SELECT id, title, content, user_id, created_at FROM posts \
     ORDER BY created_at DESC, id DESC",
)
.fetch_all(&self.pool)
.await?;"#;

const SQLX_CREATE_USER: &str = r#"let mut insert = QueryBuilder::<Sqlite>::new(
    "INSERT INTO users (name, email, birth_date, created_at) ",
);
insert.push_values([user], |mut row, user| {
    row.push_bind(user.name)
        .push_bind(user.email)
        .push_bind(user.birth_date.to_string())
        .push_bind(created_at);
});
insert.build().execute(&self.pool).await?;"#;

const SQLX_CREATE_POST: &str = r#"let mut insert = QueryBuilder::<Sqlite>::new(
    "INSERT INTO posts (title, content, user_id, created_at) ",
);
insert.push_values([post], |mut row, post| {
    row.push_bind(post.title)
        .push_bind(post.content)
        .push_bind(post.user_id.get())
        .push_bind(created_at);
});
insert.build().execute(&self.pool).await?;"#;

const SQLX_DELETE_USER: &str = r#"sqlx::query("DELETE FROM users WHERE id = ?")
    .bind(id.get())
    .execute(&self.pool)
    .await?"#;

const SQLX_DELETE_POST: &str = r#"sqlx::query("DELETE FROM posts WHERE id = ?")
    .bind(id.get())
    .execute(&self.pool)
    .await?"#;

const DIESEL_SCHEMA: &str = r#"diesel::table! {
    users (id) {
        id -> BigInt,
        name -> Text,
        email -> Text,
        birth_date -> Text,
        created_at -> BigInt,
    }
}

diesel::table! {
    posts (id) {
        id -> BigInt,
        title -> Text,
        content -> Text,
        user_id -> BigInt,
        created_at -> BigInt,
    }
}

diesel::joinable!(posts -> users (user_id));"#;

const DIESEL_LIST_USERS: &str = r#"let users: Vec<UserRow> = users::table
    .order((users::created_at.desc(), users::id.desc()))
    .select(UserRow::as_select())
    .load(&mut conn)
    .await?;

let posts: Vec<PostRow> = posts::table
    .order((posts::created_at.desc(), posts::id.desc()))
    .select(PostRow::as_select())
    .load(&mut conn)
    .await?;

let grouped = posts.grouped_by(&users);"#;

const DIESEL_CREATE_USER: &str = r#"diesel::insert_into(users::table)
    .values(&NewUserRow {
        name: &user.name,
        email: &user.email,
        birth_date: user.birth_date.to_string(),
        created_at,
    })
    .execute(&mut conn)
    .await?;"#;

const DIESEL_CREATE_POST: &str = r#"diesel::insert_into(posts::table)
    .values(&NewPostRow {
        title: &post.title,
        content: &post.content,
        user_id: post.user_id.get(),
        created_at,
    })
    .execute(&mut conn)
    .await?;"#;

const DIESEL_DELETE_USER: &str = r#"diesel::delete(users::table.find(id.get()))
    .execute(&mut conn)
    .await?"#;

const DIESEL_DELETE_POST: &str = r#"diesel::delete(posts::table.find(id.get()))
    .execute(&mut conn)
    .await?"#;

const SNIPPETS: &[Snippet] = &[
    Snippet {
        backend: BackendKind::Sqlx,
        topic: SnippetTopic::Schema,
        file_name: "migrations/create_users_posts/up.sql",
        language: "sql",
        code: SQLX_SCHEMA,
    },
    Snippet {
        backend: BackendKind::Sqlx,
        topic: SnippetTopic::ListUsers,
        file_name: "sqlx_users_backend.rs",
        language: "rust",
        code: SQLX_LIST_USERS,
    },
    Snippet {
        backend: BackendKind::Sqlx,
        topic: SnippetTopic::CreateUser,
        file_name: "sqlx_users_backend.rs",
        language: "rust",
        code: SQLX_CREATE_USER,
    },
    Snippet {
        backend: BackendKind::Sqlx,
        topic: SnippetTopic::CreatePost,
        file_name: "sqlx_users_backend.rs",
        language: "rust",
        code: SQLX_CREATE_POST,
    },
    Snippet {
        backend: BackendKind::Sqlx,
        topic: SnippetTopic::DeleteUser,
        file_name: "sqlx_users_backend.rs",
        language: "rust",
        code: SQLX_DELETE_USER,
    },
    Snippet {
        backend: BackendKind::Sqlx,
        topic: SnippetTopic::DeletePost,
        file_name: "sqlx_users_backend.rs",
        language: "rust",
        code: SQLX_DELETE_POST,
    },
    Snippet {
        backend: BackendKind::Diesel,
        topic: SnippetTopic::Schema,
        file_name: "schema.rs",
        language: "rust",
        code: DIESEL_SCHEMA,
    },
    Snippet {
        backend: BackendKind::Diesel,
        topic: SnippetTopic::ListUsers,
        file_name: "diesel_users_backend.rs",
        language: "rust",
        code: DIESEL_LIST_USERS,
    },
    Snippet {
        backend: BackendKind::Diesel,
        topic: SnippetTopic::CreateUser,
        file_name: "diesel_users_backend.rs",
        language: "rust",
        code: DIESEL_CREATE_USER,
    },
    Snippet {
        backend: BackendKind::Diesel,
        topic: SnippetTopic::CreatePost,
        file_name: "diesel_users_backend.rs",
        language: "rust",
        code: DIESEL_CREATE_POST,
    },
    Snippet {
        backend: BackendKind::Diesel,
        topic: SnippetTopic::DeleteUser,
        file_name: "diesel_users_backend.rs",
        language: "rust",
        code: DIESEL_DELETE_USER,
    },
    Snippet {
        backend: BackendKind::Diesel,
        topic: SnippetTopic::DeletePost,
        file_name: "diesel_users_backend.rs",
        language: "rust",
        code: DIESEL_DELETE_POST,
    },
];

/// Fixed catalogue of excerpts for both backends.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnippetCatalogue;

impl SnippetCatalogue {
    /// Every snippet, grouped by backend.
    #[must_use]
    pub fn all(self) -> &'static [Snippet] {
        SNIPPETS
    }

    /// Snippets for one backend.
    pub fn for_backend(self, backend: BackendKind) -> impl Iterator<Item = &'static Snippet> {
        SNIPPETS.iter().filter(move |snippet| snippet.backend == backend)
    }

    pub fn find(self, backend: BackendKind, topic: SnippetTopic) -> Option<&'static Snippet> {
        SNIPPETS
            .iter()
            .find(|snippet| snippet.backend == backend && snippet.topic == topic)
    }

    /// Highlight every snippet; failures degrade to `html: None`.
    pub fn render(self, highlighter: &dyn SyntaxHighlighter) -> Vec<RenderedSnippet> {
        SNIPPETS
            .iter()
            .map(|snippet| RenderedSnippet {
                backend: snippet.backend,
                topic: snippet.topic,
                file_name: snippet.file_name.to_owned(),
                language: snippet.language.to_owned(),
                code: snippet.code.to_owned(),
                html: highlighter.highlight(snippet.code, snippet.language),
            })
            .collect()
    }
}
