//! Page-level endpoints: snapshot, backend switch, notifications and the
//! snippet panel.
//!
//! ```text
//! GET /api/v1/page
//! PUT /api/v1/backend {"backend":"diesel"}
//! GET /api/v1/notifications
//! GET /api/v1/snippets
//! ```

use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    BackendKind, Error, LoadOutcome, MutationOutcome, Notification, PageSnapshot,
    RenderedSnippet, SnippetCatalogue,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::no_store_header;
use crate::inbound::http::state::HttpState;

/// Request body for `PUT /api/v1/backend`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SwitchBackendRequest {
    pub backend: BackendKind,
}

/// Response to a backend switch.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchBackendResponse {
    pub outcome: LoadOutcome,
    pub page: PageSnapshot,
}

/// Response to a create, update or delete.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub outcome: MutationOutcome,
    pub page: PageSnapshot,
}

/// Wrap a mutation outcome with the page as it stands afterwards.
pub(crate) fn mutation_response(state: &HttpState, outcome: MutationOutcome) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(no_store_header())
        .json(MutationResponse {
            outcome,
            page: state.page.snapshot(),
        })
}

/// Current page snapshot.
#[utoipa::path(
    get,
    path = "/api/v1/page",
    responses(
        (status = 200, description = "Page snapshot", body = PageSnapshot),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["page"],
    operation_id = "getPage"
)]
#[get("/page")]
pub async fn get_page(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok()
        .insert_header(no_store_header())
        .json(state.page.snapshot()))
}

/// Make another backend active and load its list.
///
/// A failed load keeps the previous list; the response still reports the
/// new active backend and the outcome.
#[utoipa::path(
    put,
    path = "/api/v1/backend",
    request_body = SwitchBackendRequest,
    responses(
        (status = 200, description = "Switch finished", body = SwitchBackendResponse),
        (status = 400, description = "Unknown backend", body = Error)
    ),
    tags = ["page"],
    operation_id = "switchBackend"
)]
#[put("/backend")]
pub async fn switch_backend(
    state: web::Data<HttpState>,
    payload: web::Json<SwitchBackendRequest>,
) -> ApiResult<HttpResponse> {
    let kind = payload.into_inner().backend;
    let outcome = state.page.switch_backend(kind).await;
    info!(backend = %kind, ?outcome, "backend switch requested over http");
    Ok(HttpResponse::Ok()
        .insert_header(no_store_header())
        .json(SwitchBackendResponse {
            outcome,
            page: state.page.snapshot(),
        }))
}

/// Drain queued notifications, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses((status = 200, description = "Pending notifications", body = Vec<Notification>)),
    tags = ["page"],
    operation_id = "takeNotifications"
)]
#[get("/notifications")]
pub async fn take_notifications(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok()
        .insert_header(no_store_header())
        .json(state.page.take_notifications()))
}

/// Rendered snippet catalogue for both backends.
#[utoipa::path(
    get,
    path = "/api/v1/snippets",
    responses((status = 200, description = "Snippets with highlighted HTML", body = Vec<RenderedSnippet>)),
    tags = ["snippets"],
    operation_id = "listSnippets"
)]
#[get("/snippets")]
pub async fn list_snippets(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let rendered = SnippetCatalogue.render(state.highlighter.as_ref());
    Ok(HttpResponse::Ok().json(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationLevel;
    use crate::inbound::http::test_utils::{TestPage, seed_user};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn app(
        state: web::Data<HttpState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(state).service(
            web::scope("/api/v1")
                .service(get_page)
                .service(switch_backend)
                .service(take_notifications)
                .service(list_snippets),
        )
    }

    #[rstest]
    #[actix_web::test]
    async fn page_reports_active_backend_and_users() {
        let page = TestPage::new();
        seed_user(&page.sqlx, "Ana", "ana@x.com").await;
        page.state.page.reload().await;
        let svc = actix_test::init_service(app(page.data())).await;

        let res = actix_test::call_service(
            &svc,
            actix_test::TestRequest::get().uri("/api/v1/page").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get("Cache-Control").and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["activeBackend"], json!("sqlx"));
        assert_eq!(body["users"][0]["name"], json!("Ana"));
    }

    #[rstest]
    #[actix_web::test]
    async fn switching_loads_the_other_backend() {
        let page = TestPage::new();
        seed_user(&page.diesel, "Bo", "bo@x.com").await;
        let svc = actix_test::init_service(app(page.data())).await;

        let res = actix_test::call_service(
            &svc,
            actix_test::TestRequest::put()
                .uri("/api/v1/backend")
                .set_json(json!({ "backend": "diesel" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["outcome"], json!("loaded"));
        assert_eq!(body["page"]["activeBackend"], json!("diesel"));
        assert_eq!(body["page"]["users"][0]["email"], json!("bo@x.com"));
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_backend_is_rejected() {
        let page = TestPage::new();
        let svc = actix_test::init_service(app(page.data())).await;
        let res = actix_test::call_service(
            &svc,
            actix_test::TestRequest::put()
                .uri("/api/v1/backend")
                .set_json(json!({ "backend": "sea-orm" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn notifications_are_drained_once() {
        let page = TestPage::new();
        page.state
            .page
            .submit_create_user(&crate::domain::UserForm::new("", "a@x.com", "1990-01-01"))
            .await
            .expect_err("empty name");
        let svc = actix_test::init_service(app(page.data())).await;

        let first: Vec<Notification> = actix_test::call_and_read_body_json(
            &svc,
            actix_test::TestRequest::get()
                .uri("/api/v1/notifications")
                .to_request(),
        )
        .await;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].level, NotificationLevel::Error);

        let second: Vec<Notification> = actix_test::call_and_read_body_json(
            &svc,
            actix_test::TestRequest::get()
                .uri("/api/v1/notifications")
                .to_request(),
        )
        .await;
        assert!(second.is_empty());
    }

    #[rstest]
    #[actix_web::test]
    async fn snippets_are_rendered_for_both_backends() {
        let page = TestPage::new();
        let svc = actix_test::init_service(app(page.data())).await;
        let body: Value = actix_test::call_and_read_body_json(
            &svc,
            actix_test::TestRequest::get().uri("/api/v1/snippets").to_request(),
        )
        .await;
        let snippets = body.as_array().expect("array");
        assert_eq!(snippets.len(), SnippetCatalogue.all().len());
        assert!(snippets.iter().any(|s| s["backend"] == json!("sqlx")));
        assert!(snippets.iter().any(|s| s["backend"] == json!("diesel")));
        assert!(snippets.iter().all(|s| s["html"].is_string()));
    }
}
