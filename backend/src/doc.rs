//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer together
//! with the domain types they exchange. The document backs Swagger UI in
//! debug builds and is exported via `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::domain::{
    BackendKind, Error, ErrorCode, LoadOutcome, MutationOutcome, Notification, NotificationLevel,
    PageSnapshot, Post, PostForm, PostUpdateForm, RenderedSnippet, SnippetTopic, UserForm,
    UserUpdateForm, UserView,
};
use crate::inbound::http::page::{MutationResponse, SwitchBackendRequest, SwitchBackendResponse};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Data-access showcase API",
        description = "Drive one users/posts page through either a SQL query builder or an ORM over the same SQLite file.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::page::get_page,
        crate::inbound::http::page::switch_backend,
        crate::inbound::http::page::take_notifications,
        crate::inbound::http::page::list_snippets,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        BackendKind,
        PageSnapshot,
        UserView,
        Post,
        UserForm,
        UserUpdateForm,
        PostForm,
        PostUpdateForm,
        Notification,
        NotificationLevel,
        MutationOutcome,
        LoadOutcome,
        MutationResponse,
        SwitchBackendRequest,
        SwitchBackendResponse,
        RenderedSnippet,
        SnippetTopic,
    )),
    tags(
        (name = "page", description = "Page snapshot, backend switch and notifications"),
        (name = "users", description = "User mutations"),
        (name = "posts", description = "Post mutations"),
        (name = "snippets", description = "Source excerpts for both libraries"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered OpenAPI surface.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_has_field(schema: &RefOr<Schema>, field: &str) -> bool {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.contains_key(field),
            _ => false,
        }
    }

    #[rstest]
    #[case("/api/v1/page")]
    #[case("/api/v1/backend")]
    #[case("/api/v1/users")]
    #[case("/api/v1/users/{id}")]
    #[case("/api/v1/posts/{id}")]
    #[case("/api/v1/snippets")]
    #[case("/health/ready")]
    fn registers_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn every_operation_is_documented() {
        let doc = ApiDoc::openapi();
        for (path, item) in &doc.paths.paths {
            let operations = [
                &item.get,
                &item.put,
                &item.post,
                &item.delete,
                &item.patch,
            ];
            for operation in operations.into_iter().flatten() {
                let summary = operation.summary.as_deref().unwrap_or_default();
                assert!(!summary.is_empty(), "undocumented operation on {path}");
            }
        }
    }

    #[rstest]
    fn post_update_form_accepts_a_new_author() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let form = schemas.get("PostUpdateForm").expect("PostUpdateForm schema");
        assert!(object_has_field(form, "userId"));
    }

    #[rstest]
    fn page_snapshot_uses_camel_case_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let snapshot = schemas.get("PageSnapshot").expect("PageSnapshot schema");
        assert!(object_has_field(snapshot, "activeBackend"));
        assert!(object_has_field(snapshot, "users"));
    }
}
