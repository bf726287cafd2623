//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::domain::{Error, ErrorCode, MutationError, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::OperationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

/// Map controller failures onto transport codes.
///
/// `details.reason` carries the variant so clients can tell the conflict
/// flavours apart.
impl From<MutationError> for Error {
    fn from(err: MutationError) -> Self {
        let (base, reason) = match &err {
            MutationError::Validation(message) => {
                (Error::invalid_request(message.clone()), "validation")
            }
            MutationError::DuplicateEmail(_) => (Error::conflict(err.to_string()), "duplicate_email"),
            MutationError::Unknown(message) => {
                (Error::operation_failed(message.clone()), "unknown")
            }
            MutationError::Busy => (Error::conflict(err.to_string()), "busy"),
            MutationError::BackendSwitching => {
                (Error::conflict(err.to_string()), "backend_switching")
            }
            MutationError::StaleBackend => (Error::conflict(err.to_string()), "stale_backend"),
        };
        base.with_details(json!({ "reason": reason }))
    }
}
