//! User endpoints.
//!
//! ```text
//! POST   /api/v1/users {"name":"Ana","email":"ana@x.com","birthDate":"1990-05-01"}
//! PATCH  /api/v1/users/{id} {"email":"ana@y.com"}
//! DELETE /api/v1/users/{id}?confirm=true
//! ```

use actix_web::{HttpResponse, delete, patch, post, web};
use serde::{Deserialize, Deserializer};
use utoipa::IntoParams;

use crate::domain::{Error, FixedConfirmation, UserForm, UserId, UserUpdateForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::page::{MutationResponse, mutation_response};
use crate::inbound::http::state::HttpState;

/// Query flag standing in for the interactive delete confirmation.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ConfirmQuery {
    /// Must be `true` for the delete to run; anything else cancels it.
    #[serde(default, deserialize_with = "exactly_true")]
    pub confirm: bool,
}

fn exactly_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw == "true")
}

/// Create a user on the active backend.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserForm,
    responses(
        (status = 200, description = "User created", body = MutationResponse),
        (status = 400, description = "Invalid form", body = Error),
        (status = 409, description = "Email taken, action busy or backend switching", body = Error),
        (status = 422, description = "Backend rejected the write", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserForm>,
) -> ApiResult<HttpResponse> {
    let outcome = state.page.submit_create_user(&payload).await?;
    Ok(mutation_response(&state, outcome))
}

/// Change some fields of a user. Blank fields are left as they are.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    request_body = UserUpdateForm,
    responses(
        (status = 200, description = "User updated", body = MutationResponse),
        (status = 400, description = "Invalid or empty form", body = Error),
        (status = 409, description = "Email taken, action busy or backend switching", body = Error),
        (status = 422, description = "User does not exist", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<UserUpdateForm>,
) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.into_inner());
    let outcome = state.page.submit_update_user(id, &payload).await?;
    Ok(mutation_response(&state, outcome))
}

/// Delete a user and their posts once confirmed.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User identifier"), ConfirmQuery),
    responses(
        (status = 200, description = "User deleted, or cancelled without confirmation", body = MutationResponse),
        (status = 409, description = "Action busy or backend switching", body = Error),
        (status = 422, description = "User does not exist", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    query: web::Query<ConfirmQuery>,
) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.into_inner());
    let gate = FixedConfirmation::from_flag(query.confirm);
    let outcome = state.page.request_delete_user(id, &gate).await?;
    Ok(mutation_response(&state, outcome))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
