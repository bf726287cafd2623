//! User data model and form validation.
//!
//! Forms carry raw text exactly as submitted. Both the page controller and
//! every backend adapter validate them into [`NewUser`] / [`UserChanges`]
//! before touching storage.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Post;

/// Accepted textual layout for birth dates.
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Validation errors raised while checking user forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// A required field was blank.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    /// The birth date was not an ISO calendar date.
    #[error("birth date must use the YYYY-MM-DD format")]
    InvalidBirthDate,
    /// An update form did not change anything.
    #[error("no fields to update")]
    NoChanges,
}

/// Backend-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Calendar date of birth without a time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BirthDate(NaiveDate);

impl BirthDate {
    /// Parse a `YYYY-MM-DD` date.
    ///
    /// # Examples
    /// ```
    /// use showcase::domain::BirthDate;
    ///
    /// let date = BirthDate::parse("1990-05-01").expect("valid date");
    /// assert_eq!(date.to_string(), "1990-05-01");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyField {
                field: "birthDate",
            });
        }
        NaiveDate::parse_from_str(trimmed, BIRTH_DATE_FORMAT)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidBirthDate)
    }

    /// Underlying calendar date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// Completed years of age on `today`.
    ///
    /// Returns zero for dates in the future.
    #[must_use]
    pub fn age_on(self, today: NaiveDate) -> u32 {
        let born = self.0;
        let mut years = today.year() - born.year();
        if (today.month(), today.day()) < (born.month(), born.day()) {
            years -= 1;
        }
        u32::try_from(years).unwrap_or(0)
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(BIRTH_DATE_FORMAT))
    }
}

impl From<BirthDate> for String {
    fn from(value: BirthDate) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for BirthDate {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Persisted user together with its posts, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = i64, example = 1)]
    pub id: UserId,
    #[schema(example = "Ana")]
    pub name: String,
    #[schema(example = "ana@x.com")]
    pub email: String,
    #[schema(value_type = String, example = "1990-05-01")]
    pub birth_date: BirthDate,
    pub created_at: DateTime<Utc>,
    pub posts: Vec<Post>,
}

/// Raw create-user form as submitted by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    #[schema(example = "1990-05-01")]
    pub birth_date: String,
}

impl UserForm {
    /// Build a form from borrowed field values.
    pub fn new(name: impl Into<String>, email: impl Into<String>, birth_date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            birth_date: birth_date.into(),
        }
    }

    /// Check required fields and normalise the values.
    ///
    /// # Examples
    /// ```
    /// use showcase::domain::{UserForm, UserValidationError};
    ///
    /// let err = UserForm::new("", "ana@x.com", "1990-05-01").validate().unwrap_err();
    /// assert_eq!(err, UserValidationError::EmptyField { field: "name" });
    /// ```
    pub fn validate(&self) -> Result<NewUser, UserValidationError> {
        let name = required(&self.name, "name")?;
        let email = required(&self.email, "email")?;
        let birth_date = BirthDate::parse(&self.birth_date)?;
        Ok(NewUser {
            name,
            email,
            birth_date,
        })
    }
}

/// Validated create-user payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub birth_date: BirthDate,
}

/// Raw partial-update form; blank fields mean "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserUpdateForm {
    pub name: String,
    pub email: String,
    pub birth_date: String,
}

impl UserUpdateForm {
    /// Collect the fields that would change.
    pub fn validate(&self) -> Result<UserChanges, UserValidationError> {
        let birth_date = match optional(&self.birth_date) {
            Some(raw) => Some(BirthDate::parse(&raw)?),
            None => None,
        };
        let changes = UserChanges {
            name: optional(&self.name),
            email: optional(&self.email),
            birth_date,
        };
        if changes.is_empty() {
            return Err(UserValidationError::NoChanges);
        }
        Ok(changes)
    }
}

/// Validated partial update for a user row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<BirthDate>,
}

impl UserChanges {
    /// True when no column would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.birth_date.is_none()
    }
}

fn required(raw: &str, field: &'static str) -> Result<String, UserValidationError> {
    optional(raw).ok_or(UserValidationError::EmptyField { field })
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
