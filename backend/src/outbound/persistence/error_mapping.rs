//! Shared mapping from driver errors to the backend error taxonomy.
//!
//! Each library reports constraint failures differently. Both are first
//! classified into a [`DbFailure`], then turned into a
//! [`UsersBackendError`] the same way, so the two backends stay
//! indistinguishable to callers. Raw driver messages are only logged.

use tracing::debug;

use crate::domain::ports::UsersBackendError;

/// Storage failure category relevant to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DbFailure {
    UniqueViolation,
    ForeignKeyViolation,
    Other,
}

/// What the failing statement was doing, for user-facing messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WriteContext<'a> {
    /// Verb phrase such as `"create user"`.
    pub operation: &'static str,
    /// Email being written, reported on unique violations.
    pub email: Option<&'a str>,
}

impl<'a> WriteContext<'a> {
    pub(crate) const fn new(operation: &'static str) -> Self {
        Self {
            operation,
            email: None,
        }
    }

    pub(crate) const fn with_email(mut self, email: Option<&'a str>) -> Self {
        self.email = email;
        self
    }
}

/// Classify a Diesel error, logging the driver details.
pub(crate) fn classify_diesel_error(error: &diesel::result::Error) -> DbFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
            match kind {
                DatabaseErrorKind::UniqueViolation => DbFailure::UniqueViolation,
                DatabaseErrorKind::ForeignKeyViolation => DbFailure::ForeignKeyViolation,
                _ => DbFailure::Other,
            }
        }
        _ => {
            debug!(
                error_type = %std::any::type_name_of_val(error),
                %error,
                "diesel operation failed"
            );
            DbFailure::Other
        }
    }
}

/// Classify a `sqlx` error, logging the driver details.
pub(crate) fn classify_sqlx_error(error: &sqlx::Error) -> DbFailure {
    use sqlx::error::ErrorKind;

    match error {
        sqlx::Error::Database(db) => {
            debug!(code = ?db.code(), message = db.message(), "sqlx operation failed");
            match db.kind() {
                ErrorKind::UniqueViolation => DbFailure::UniqueViolation,
                ErrorKind::ForeignKeyViolation => DbFailure::ForeignKeyViolation,
                _ => DbFailure::Other,
            }
        }
        _ => {
            debug!(%error, "sqlx operation failed");
            DbFailure::Other
        }
    }
}

/// Turn a classified failure into the error reported to the page.
pub(crate) fn to_backend_error(failure: DbFailure, context: WriteContext<'_>) -> UsersBackendError {
    match (failure, context.email) {
        (DbFailure::UniqueViolation, Some(email)) => UsersBackendError::duplicate_email(email),
        (DbFailure::ForeignKeyViolation, _) => UsersBackendError::unknown(format!(
            "could not {}: user does not exist",
            context.operation
        )),
        _ => UsersBackendError::unknown(format!("could not {}: database error", context.operation)),
    }
}

pub(crate) fn map_diesel_error(
    error: diesel::result::Error,
    context: WriteContext<'_>,
) -> UsersBackendError {
    to_backend_error(classify_diesel_error(&error), context)
}

pub(crate) fn map_sqlx_error(error: sqlx::Error, context: WriteContext<'_>) -> UsersBackendError {
    to_backend_error(classify_sqlx_error(&error), context)
}

/// Error for an update or delete that matched no row.
pub(crate) fn missing_row(entity: &'static str, id: i64) -> UsersBackendError {
    UsersBackendError::unknown(format!("{entity} {id} does not exist"))
}
