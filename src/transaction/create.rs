//! Transaction creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error, endpoints,
    category::{Category, CategoryId, CategoryKind, get_all_categories},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    timezone::today_local,
    transaction::{Transaction, core::MAX_NOTE_LENGTH, create_transaction},
};

/// The state needed for the new transaction page and the creation endpoint.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Form data for transaction creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionFormData {
    pub amount: f64,
    pub date: Date,
    #[serde(default)]
    pub note: String,
    pub category_id: CategoryId,
}

/// Render the transaction creation page.
pub async fn get_new_transaction_page(
    State(state): State<CreateTransactionState>,
) -> Result<Response, Error> {
    let today = today_local(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(new_transaction_view(&categories, today).into_response())
}

/// Handle transaction creation form submission.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
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

    let builder = Transaction::build(form_data.amount, form_data.category_id)
        .date(form_data.date)
        .note(&form_data.note);

    match create_transaction(builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::NonPositiveAmount(_)
            | Error::NoteTooLong(_)
            | Error::InvalidCategory(_)),
        ) => {
            let categories = match get_all_categories(&connection) {
                Ok(categories) => categories,
                Err(error) => {
                    tracing::error!("Failed to retrieve categories: {error}");
                    return error.into_alert_response();
                }
            };

            new_transaction_form_view(
                &categories,
                &form_data,
                today,
                &format!("Error: {error}"),
            )
            .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");

            error.into_alert_response()
        }
    }
}

fn new_transaction_view(categories: &[Category], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form_data = TransactionFormData {
        amount: 0.0,
        date: today,
        note: String::new(),
        category_id: 0,
    };
    let form = new_transaction_form_view(categories, &form_data, today, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Add Transaction", &[dollar_input_styles()], &content)
}

fn new_transaction_form_view(
    categories: &[Category],
    form_data: &TransactionFormData,
    max_date: Date,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
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
                "Add Transaction"
            }
        }
    }
}

/// The amount, date, category and note fields shared by the create and edit
/// forms.
pub(super) fn transaction_form_fields(
    categories: &[Category],
    form_data: &TransactionFormData,
    max_date: Date,
) -> Markup {
    let income_categories = categories
        .iter()
        .filter(|category| category.kind == CategoryKind::Income);
    let expense_categories = categories
        .iter()
        .filter(|category| category.kind == CategoryKind::Expense);

    let category_option = |category: &Category| {
        html!(
            option
                value=(category.id)
                selected[form_data.category_id == category.id]
            {
                (category.icon) " " (category.title)
            }
        )
    };

    html! {
        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            div class="input-wrapper w-full"
            {
                input
                    id="amount"
                    type="number"
                    name="amount"
                    min="0.01"
                    step="0.01"
                    value=[(form_data.amount > 0.0).then_some(form_data.amount)]
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                id="date"
                type="date"
                name="date"
                value=(form_data.date)
                max=(max_date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="category_id"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            select
                id="category_id"
                name="category_id"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" disabled selected[form_data.category_id == 0]
                {
                    "Select a category"
                }

                optgroup label="Income"
                {
                    @for category in income_categories {
                        (category_option(category))
                    }
                }

                optgroup label="Expense"
                {
                    @for category in expense_categories {
                        (category_option(category))
                    }
                }
            }
        }

        div
        {
            label
                for="note"
                class=(FORM_LABEL_STYLE)
            {
                "Note (optional)"
            }

            textarea
                id="note"
                name="note"
                rows="3"
                maxlength=(MAX_NOTE_LENGTH)
                placeholder="e.g. Weekly grocery shop"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                (form_data.note)
            }
        }
    }
}

#[cfg(test)]
mod new_transaction_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::http::StatusCode;
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
        transaction::create::{CreateTransactionState, get_new_transaction_page},
    };

    use axum::extract::State;

    fn get_page_state() -> CreateTransactionState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        CreateTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Pacific/Auckland".to_owned(),
        }
    }

    #[tokio::test]
    async fn render_page() {
        let state = get_page_state();

        let response = get_new_transaction_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, crate::endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "date", "date");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn render_page_lists_seeded_categories() {
        let state = get_page_state();

        let response = get_new_transaction_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        let option_selector = scraper::Selector::parse("select option").unwrap();
        // 12 seeded categories plus the placeholder option.
        assert_eq!(html.select(&option_selector).count(), 13);
    }

    #[tokio::test]
    async fn render_page_fails_on_invalid_timezone() {
        let state = CreateTransactionState {
            local_timezone: "Not/ATimezone".to_owned(),
            ..get_page_state()
        };

        let result = get_new_transaction_page(State(state)).await;

        assert!(result.is_err());
    }
}
