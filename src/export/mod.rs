//! Export endpoints: download the current transaction filter result as CSV,
//! XLSX or PDF.
//!
//! The endpoints accept the same query parameters as the transactions page,
//! so the export covers exactly what the listing shows. Filters apply,
//! pagination does not.

mod csv;
mod pdf;
mod xlsx;

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use time::{Date, macros::format_description};

use crate::{
    AppState, Error,
    timezone::today_local,
    transaction::{TransactionRow, TransactionsQuery, get_matching_transactions},
};

pub use csv::write_csv;
pub use pdf::write_pdf;
pub use xlsx::write_xlsx;

/// The state needed for the export endpoints.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Download the matching transactions as a CSV file.
pub async fn export_transactions_csv(
    Query(query): Query<TransactionsQuery>,
    State(state): State<ExportState>,
) -> Result<Response, Error> {
    let rows = matching_rows(&query, &state)?;
    let bytes = write_csv(&rows)?;
    let filename = export_filename("csv", today_local(&state.local_timezone)?)?;

    Ok(download_response(bytes, "text/csv", &filename))
}

/// Download the matching transactions as an XLSX workbook.
pub async fn export_transactions_xlsx(
    Query(query): Query<TransactionsQuery>,
    State(state): State<ExportState>,
) -> Result<Response, Error> {
    let rows = matching_rows(&query, &state)?;
    let bytes = write_xlsx(&rows)?;
    let filename = export_filename("xlsx", today_local(&state.local_timezone)?)?;

    Ok(download_response(
        bytes,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        &filename,
    ))
}

/// Download the matching transactions as a PDF table.
pub async fn export_transactions_pdf(
    Query(query): Query<TransactionsQuery>,
    State(state): State<ExportState>,
) -> Result<Response, Error> {
    let rows = matching_rows(&query, &state)?;
    let bytes = write_pdf(&rows)?;
    let filename = export_filename("pdf", today_local(&state.local_timezone)?)?;

    Ok(download_response(bytes, "application/pdf", &filename))
}

fn matching_rows(
    query: &TransactionsQuery,
    state: &ExportState,
) -> Result<Vec<TransactionRow>, Error> {
    let filter = query.filter()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_matching_transactions(&filter, query.sort_key(), query.sort_order(), &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))
}

fn export_filename(extension: &str, today: Date) -> Result<String, Error> {
    let date_format = format_description!("[year][month][day]");
    let date = today
        .format(&date_format)
        .map_err(|error| Error::ExportError(error.to_string()))?;

    Ok(format!("transactions-{date}.{extension}"))
}

fn download_response(bytes: Vec<u8>, content_type: &str, filename: &str) -> Response {
    (
        [
            (CONTENT_TYPE, content_type.to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod export_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{CategoryKind, CategoryTitle, create_category},
        db::initialize,
        test_utils::get_header,
        transaction::{Transaction, TransactionsQuery, create_transaction},
    };

    use super::{ExportState, export_filename, export_transactions_csv};

    fn get_export_state() -> ExportState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        ExportState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[test]
    fn filename_uses_compact_date() {
        let filename = export_filename("csv", date!(2025 - 06 - 05)).unwrap();

        assert_eq!(filename, "transactions-20250605.csv");
    }

    #[tokio::test]
    async fn csv_download_has_attachment_headers() {
        let state = get_export_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryTitle::new_unchecked("Groceries"),
                "🛒",
                CategoryKind::Expense,
                &connection,
            )
            .expect("Could not create test category");
            create_transaction(Transaction::build(12.5, category.id), &connection)
                .expect("Could not create test transaction");
        }

        let response = export_transactions_csv(Query(TransactionsQuery::default()), State(state))
            .await
            .unwrap();

        assert_eq!(get_header(&response, "content-type"), "text/csv");
        assert!(
            get_header(&response, "content-disposition").starts_with("attachment; filename=")
        );
    }
}
