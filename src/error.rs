//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::ErrorCode;
use serde_json::json;

use crate::database_id::{AccountId, CategoryId};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An empty string was used to create an account or category name.
    #[error("name cannot be empty")]
    EmptyName,

    /// A string could not be parsed as an amount of money.
    #[error("invalid amount {0}")]
    InvalidAmount(String),

    /// An amount does not fit in 18 digits with two decimal places.
    #[error("the amount {0} is out of range for a decimal(18,2)")]
    AmountOutOfRange(String),

    /// The account ID used for a transaction does not refer to an account.
    #[error("the account ID {0} does not refer to a valid account")]
    InvalidAccount(AccountId),

    /// The category ID used for a transaction does not refer to a category.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// The parent ID of a category does not refer to a category.
    #[error("the parent category ID {0} does not refer to a valid category")]
    InvalidParentCategory(CategoryId),

    /// Setting the parent of a category would make the category its own ancestor.
    #[error("a category cannot be its own ancestor")]
    CategoryCycle,

    /// Tried to delete a category with subcategories without saying what
    /// should happen to them.
    #[error("the category has subcategories, reassign or cascade to delete it")]
    CategoryHasChildren,

    /// Tried to delete a category that transactions still refer to.
    #[error("the category is used by one or more transactions")]
    CategoryInUse,

    /// Tried to delete an account that transactions still refer to.
    #[error("the account has transactions, cascade to delete it")]
    AccountHasTransactions,

    /// A foreign key constraint failed in a way not covered by the errors above.
    #[error("a referenced row does not exist")]
    InvalidForeignKey,

    /// The database stayed locked by another connection for longer than the
    /// configured busy timeout.
    #[error("the database is busy")]
    StoreBusy,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

/// The broad classes of [Error] that callers act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The ID does not refer to a stored row.
    NotFound,
    /// The input broke a rule of the domain model and was not stored.
    Validation,
    /// The store could not complete the operation.
    Storage,
}

impl Error {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound => ErrorKind::NotFound,
            Error::EmptyName
            | Error::InvalidAmount(_)
            | Error::AmountOutOfRange(_)
            | Error::InvalidAccount(_)
            | Error::InvalidCategory(_)
            | Error::InvalidParentCategory(_)
            | Error::CategoryCycle
            | Error::CategoryHasChildren
            | Error::CategoryInUse
            | Error::AccountHasTransactions
            | Error::InvalidForeignKey => ErrorKind::Validation,
            Error::StoreBusy | Error::DatabaseLockError | Error::SqlError(_) => ErrorKind::Storage,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidForeignKey,
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_CHECK,
                },
                ref description,
            ) => Error::AmountOutOfRange(description.clone().unwrap_or_default()),
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked,
                    ..
                },
                _,
            ) => {
                tracing::warn!("database busy: {value}");
                Error::StoreBusy
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self.kind() {
            // Storage errors are not intended to be shown to the client.
            ErrorKind::Storage => {
                tracing::error!("An unexpected error occurred: {}", self);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
