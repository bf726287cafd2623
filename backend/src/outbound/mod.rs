//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: the two SQLite `UsersBackend` adapters and their pools
//! - **highlight**: HTML rendering for the code snippet panel
//!
//! Adapters are thin translators between domain types and library-specific
//! representations. They contain no business logic.

pub mod highlight;
pub mod persistence;
