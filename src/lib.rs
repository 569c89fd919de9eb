//! Expenses Tracker is a web app for recording income and expense
//! transactions against user-defined categories and viewing aggregated
//! dashboards (totals, category breakdowns, daily trends).
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod alert;
mod app_state;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod export;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod query_params;
mod routing;
mod seed;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use seed::seed_demo_transactions;

use crate::{
    alert::Alert,
    database_id::DatabaseID,
    internal_server_error::{InternalServerErrorPage, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category title.
    #[error("category title cannot be empty")]
    EmptyCategoryTitle,

    /// A category title longer than the allowed maximum was submitted.
    #[error("category title cannot be longer than {0} characters")]
    CategoryTitleTooLong(usize),

    /// The submitted category title already exists in the database.
    #[error("a category with this title already exists")]
    DuplicateCategoryTitle,

    /// Tried to delete a category that still has transactions recorded
    /// against it.
    #[error("the category has {0} dependent transactions and cannot be deleted")]
    CategoryInUse(usize),

    /// The category ID used to create or update a transaction did not match
    /// a valid category.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(DatabaseID),

    /// A string that is not "Income" or "Expense" was used as a category kind.
    #[error("{0} is not a valid category kind, expected \"Income\" or \"Expense\"")]
    InvalidCategoryKind(String),

    /// A zero or negative amount was used to create a transaction.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    NonPositiveAmount(f64),

    /// A transaction note longer than the allowed maximum was submitted.
    #[error("transaction note cannot be longer than {0} characters")]
    NoteTooLong(usize),

    /// A date range where the start date comes after the end date.
    #[error("invalid date range: the start date must not be after the end date")]
    InvalidDateRange,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An error occurred while writing an export file.
    #[error("could not write export file: {0}")]
    ExportError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("category.title") =>
            {
                Error::DuplicateCategoryTitle
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => {
                render_internal_server_error(InternalServerErrorPage {
                    description: "Invalid Timezone Settings",
                    fix: &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                })
            }
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => Alert::error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            Error::EmptyCategoryTitle => Alert::error(
                "Invalid category title",
                "The category title cannot be empty.",
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::CategoryTitleTooLong(max_length) => Alert::error(
                "Invalid category title",
                &format!("The category title cannot be longer than {max_length} characters."),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::DuplicateCategoryTitle => Alert::error(
                "Duplicate category title",
                "A category with this title already exists. \
                Choose a different title, or edit or delete the existing category.",
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::CategoryInUse(count) => Alert::error(
                "Could not delete category",
                &format!(
                    "This category has {count} transactions recorded against it. \
                    Delete or re-categorize those transactions first."
                ),
            )
            .into_response_with_status(StatusCode::CONFLICT),
            Error::InvalidCategory(category_id) => Alert::error(
                "Invalid category",
                &format!("Could not find a category with the ID {category_id}."),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidCategoryKind(kind) => Alert::error(
                "Invalid category kind",
                &format!("{kind} is not a valid category kind. Choose Income or Expense."),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::NonPositiveAmount(amount) => Alert::error(
                "Invalid amount",
                &format!("{amount} is not a valid amount. Amounts must be greater than zero."),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::NoteTooLong(max_length) => Alert::error(
                "Invalid note",
                &format!("The note cannot be longer than {max_length} characters."),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidDateRange => Alert::error(
                "Invalid date range",
                "The start date must not be after the end date.",
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::UpdateMissingTransaction => Alert::error(
                "Could not update transaction",
                "The transaction could not be found.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::DeleteMissingTransaction => Alert::error(
                "Could not delete transaction",
                "The transaction could not be found. \
                Try refreshing the page to see if the transaction has already been deleted.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::UpdateMissingCategory => Alert::error(
                "Could not update category",
                "The category could not be found.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::DeleteMissingCategory => Alert::error(
                "Could not delete category",
                "The category could not be found. \
                Try refreshing the page to see if the category has already been deleted.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            _ => Alert::error(
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.",
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Render the error as a JSON failure envelope for the API routes.
    fn into_api_response(self) -> Response {
        let status = match &self {
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory => StatusCode::NOT_FOUND,
            Error::CategoryInUse(_) => StatusCode::CONFLICT,
            Error::EmptyCategoryTitle
            | Error::CategoryTitleTooLong(_)
            | Error::DuplicateCategoryTitle
            | Error::InvalidCategory(_)
            | Error::InvalidCategoryKind(_)
            | Error::NonPositiveAmount(_)
            | Error::NoteTooLong(_)
            | Error::InvalidDateRange => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}
