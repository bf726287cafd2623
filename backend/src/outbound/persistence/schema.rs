//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//! `diesel print-schema` regenerates them from a migrated database.

diesel::table! {
    /// Users listed on the page.
    users (id) {
        /// Primary key assigned by SQLite.
        id -> BigInt,
        name -> Text,
        /// Unique across all users.
        email -> Text,
        /// ISO `YYYY-MM-DD` calendar date.
        birth_date -> Text,
        /// Unix milliseconds (UTC).
        created_at -> BigInt,
    }
}

diesel::table! {
    /// Posts authored by users; removed with their author.
    posts (id) {
        id -> BigInt,
        title -> Text,
        content -> Text,
        /// Foreign key to `users.id` with `ON DELETE CASCADE`.
        user_id -> BigInt,
        /// Unix milliseconds (UTC).
        created_at -> BigInt,
    }
}

diesel::joinable!(posts -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(posts, users);
