//! Domain primitives, page state and use-case services.
//!
//! Purpose: model users and posts, the page that lists them, and the flows
//! that mutate them through whichever backend is active. Nothing here knows
//! about SQL, HTTP or highlighting engines; those live behind [`ports`].
//!
//! Public surface:
//! - `User`, `Post` and their forms: data model and boundary validation.
//! - `UsersPage`: bound callbacks over the shared page state.
//! - `MutationController`, `BackendSelector`: the flows behind the page.
//! - `SnippetCatalogue`: source excerpts compared on the page.
//! - `Error`, `ErrorCode`: transport-agnostic error payload.

pub mod backend_kind;
pub mod backend_selector;
pub mod confirmation;
pub mod entity_store;
pub mod error;
pub mod mutation_controller;
pub mod notification;
pub mod page_state;
pub mod ports;
pub mod post;
pub mod snippets;
pub mod trace_id;
pub mod user;
pub mod users_page;

pub use self::backend_kind::{BackendKind, ParseBackendKindError};
pub use self::backend_selector::{BackendSelector, LoadOutcome};
pub use self::confirmation::{ConfirmationGate, ConfirmationPrompt, FixedConfirmation};
pub use self::entity_store::EntityStore;
pub use self::error::{Error, ErrorCode};
pub use self::mutation_controller::{MutationController, MutationError, MutationOutcome};
pub use self::notification::{Notification, NotificationLevel};
pub use self::page_state::{
    ActionRejection, BackendRegistry, Generation, PageContext, PageState, PendingAction,
};
pub use self::post::{
    NewPost, Post, PostChanges, PostForm, PostId, PostUpdateForm, PostValidationError,
};
pub use self::snippets::{RenderedSnippet, Snippet, SnippetCatalogue, SnippetTopic};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    BirthDate, NewUser, User, UserChanges, UserForm, UserId, UserUpdateForm,
    UserValidationError,
};
pub use self::users_page::{PageSnapshot, UserView, UsersPage};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use showcase::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::conflict("busy"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
