//! Post endpoints.
//!
//! ```text
//! POST   /api/v1/posts {"title":"Hi","content":"First","userId":"1"}
//! PATCH  /api/v1/posts/{id} {"title":"Hello"}
//! DELETE /api/v1/posts/{id}?confirm=true
//! ```

use actix_web::{HttpResponse, delete, patch, post, web};

use crate::domain::{Error, FixedConfirmation, PostForm, PostId, PostUpdateForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::page::{MutationResponse, mutation_response};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::ConfirmQuery;

/// Create a post for an existing user.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = PostForm,
    responses(
        (status = 200, description = "Post created", body = MutationResponse),
        (status = 400, description = "Invalid form", body = Error),
        (status = 409, description = "Action busy or backend switching", body = Error),
        (status = 422, description = "Author does not exist", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    payload: web::Json<PostForm>,
) -> ApiResult<HttpResponse> {
    let outcome = state.page.submit_create_post(&payload).await?;
    Ok(mutation_response(&state, outcome))
}

/// Change some fields of a post. A non-blank `userId` moves it to another
/// author.
#[utoipa::path(
    patch,
    path = "/api/v1/posts/{id}",
    params(("id" = i64, Path, description = "Post identifier")),
    request_body = PostUpdateForm,
    responses(
        (status = 200, description = "Post updated", body = MutationResponse),
        (status = 400, description = "Empty form or malformed userId", body = Error),
        (status = 409, description = "Action busy or backend switching", body = Error),
        (status = 422, description = "Post or new author does not exist", body = Error)
    ),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[patch("/posts/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<PostUpdateForm>,
) -> ApiResult<HttpResponse> {
    let id = PostId::new(path.into_inner());
    let outcome = state.page.submit_update_post(id, &payload).await?;
    Ok(mutation_response(&state, outcome))
}

/// Delete a post once confirmed.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = i64, Path, description = "Post identifier"), ConfirmQuery),
    responses(
        (status = 200, description = "Post deleted, or cancelled without confirmation", body = MutationResponse),
        (status = 409, description = "Action busy or backend switching", body = Error),
        (status = 422, description = "Post does not exist", body = Error)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    query: web::Query<ConfirmQuery>,
) -> ApiResult<HttpResponse> {
    let id = PostId::new(path.into_inner());
    let gate = FixedConfirmation::from_flag(query.confirm);
    let outcome = state.page.request_delete_post(id, &gate).await?;
    Ok(mutation_response(&state, outcome))
}
