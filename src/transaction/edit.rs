//! Transaction editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    category::{Category, get_all_categories},
    database_id::DatabaseID,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles, loading_spinner},
    navigation::NavBar,
    timezone::today_local,
    transaction::{
        Transaction,
        create::{TransactionFormData, transaction_form_fields},
        get_transaction, update_transaction,
    },
};

/// The state needed for the edit transaction page and the update endpoint.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the transaction editing page.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<DatabaseID>,
    State(state): State<EditTransactionState>,
) -> Result<Response, Error> {
    let today = today_local(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let edit_endpoint =
        endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_TRANSACTION, transaction_id);

    match get_transaction(transaction_id, &connection) {
        Ok(transaction) => {
            let form_data = TransactionFormData {
                amount: transaction.amount,
                date: transaction.date,
                note: transaction.note.unwrap_or_default(),
                category_id: transaction.category_id,
            };

            Ok(edit_transaction_view(
                &edit_endpoint,
                &update_endpoint,
                &categories,
                &form_data,
                today,
                "",
            )
            .into_response())
        }
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Transaction not found",
                _ => {
                    tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
                    "Failed to load transaction"
                }
            };

            let form_data = TransactionFormData {
                amount: 0.0,
                date: today,
                note: String::new(),
                category_id: 0,
            };

            Ok(edit_transaction_view(
                &edit_endpoint,
                &update_endpoint,
                &categories,
                &form_data,
                today,
                error_message,
            )
            .into_response())
        }
    }
}

/// Handle transaction update form submission.
pub async fn update_transaction_endpoint(
    Path(transaction_id): Path<DatabaseID>,
    State(state): State<EditTransactionState>,
    Form(form_data): Form<TransactionFormData>,
) -> Response {
    let today = match today_local(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let note = match form_data.note.trim() {
        "" => None,
        note => Some(note.to_owned()),
    };
    let transaction = Transaction {
        id: transaction_id,
        amount: form_data.amount,
        date: form_data.date,
        note,
        category_id: form_data.category_id,
    };

    match update_transaction(&transaction, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingTransaction) => {
            Error::UpdateMissingTransaction.into_alert_response()
        }
        Err(
            error @ (Error::NonPositiveAmount(_)
            | Error::NoteTooLong(_)
            | Error::InvalidCategory(_)),
        ) => {
            let update_endpoint =
                endpoints::format_endpoint(endpoints::PUT_TRANSACTION, transaction_id);
            let categories = match get_all_categories(&connection) {
                Ok(categories) => categories,
                Err(error) => {
                    tracing::error!("Failed to retrieve categories: {error}");
                    return error.into_alert_response();
                }
            };

            edit_transaction_form_view(
                &update_endpoint,
                &categories,
                &form_data,
                today,
                &format!("Error: {error}"),
            )
            .into_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_transaction_view(
    edit_endpoint: &str,
    update_endpoint: &str,
    categories: &[Category],
    form_data: &TransactionFormData,
    max_date: Date,
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(edit_endpoint).into_html();
    let form = edit_transaction_form_view(
        update_endpoint,
        categories,
        form_data,
        max_date,
        error_message,
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Transaction", &[dollar_input_styles()], &content)
}

fn edit_transaction_form_view(
    update_endpoint: &str,
    categories: &[Category],
    form_data: &TransactionFormData,
    max_date: Date,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4 md:space-y-6"
        {
            (transaction_form_fields(categories, form_data, max_date))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="htmx-indicator" { (loading_spinner()) }
                "Update Transaction"
            }
        }
    }
}

#[cfg(test)]
mod edit_transaction_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{CategoryKind, CategoryTitle, create_category},
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_endpoint, assert_hx_redirect, assert_valid_html,
            must_get_form, parse_html_document,
        },
        transaction::{
            Transaction, create_transaction,
            create::TransactionFormData,
            edit::{EditTransactionState, get_edit_transaction_page, update_transaction_endpoint},
            get_transaction,
        },
    };

    fn get_edit_state() -> EditTransactionState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        EditTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Pacific/Auckland".to_owned(),
        }
    }

    #[tokio::test]
    async fn get_edit_transaction_page_succeeds() {
        let state = get_edit_state();
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryTitle::new_unchecked("Groceries"),
                "🛒",
                CategoryKind::Expense,
                &connection,
            )
            .expect("Could not create test category");

            create_transaction(
                Transaction::build(12.5, category.id)
                    .date(date!(2025 - 06 - 01))
                    .note("Weekly shop"),
                &connection,
            )
            .expect("Could not create test transaction")
        };

        let response = get_edit_transaction_page(Path(transaction.id), State(state))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::PUT_TRANSACTION, transaction.id),
            "hx-put",
        );
        assert!(html.html().contains("Weekly shop"));
    }

    #[tokio::test]
    async fn get_edit_transaction_page_with_invalid_id_shows_error() {
        let state = get_edit_state();
        let invalid_id = 999999;

        let response = get_edit_transaction_page(Path(invalid_id), State(state))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Transaction not found");
    }

    #[tokio::test]
    async fn update_transaction_endpoint_succeeds() {
        let state = get_edit_state();
        let (transaction, category_id) = {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryTitle::new_unchecked("Groceries"),
                "🛒",
                CategoryKind::Expense,
                &connection,
            )
            .expect("Could not create test category");
            let transaction = create_transaction(
                Transaction::build(12.5, category.id).date(date!(2025 - 06 - 01)),
                &connection,
            )
            .expect("Could not create test transaction");

            (transaction, category.id)
        };

        let form = TransactionFormData {
            amount: 20.0,
            date: date!(2025 - 06 - 02),
            note: "Updated note".to_owned(),
            category_id,
        };

        let response =
            update_transaction_endpoint(Path(transaction.id), State(state.clone()), Form(form))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);

        let updated =
            get_transaction(transaction.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.amount, 20.0);
        assert_eq!(updated.date, date!(2025 - 06 - 02));
        assert_eq!(updated.note.as_deref(), Some("Updated note"));
    }

    #[tokio::test]
    async fn update_transaction_endpoint_with_invalid_id_returns_not_found() {
        let state = get_edit_state();
        let category_id = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                CategoryTitle::new_unchecked("Groceries"),
                "🛒",
                CategoryKind::Expense,
                &connection,
            )
            .expect("Could not create test category")
            .id
        };
        let form = TransactionFormData {
            amount: 20.0,
            date: date!(2025 - 06 - 02),
            note: String::new(),
            category_id,
        };

        let response = update_transaction_endpoint(Path(999999), State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
