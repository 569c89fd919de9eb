//! JSON endpoint for adding a transaction without going through the form
//! pages, used by the quick-add widget.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use time::Date;

use crate::{
    AppState, Error,
    category::CategoryId,
    transaction::{Transaction, create_transaction},
};

/// The state needed for the quick-add endpoint.
#[derive(Debug, Clone)]
pub struct QuickAddTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for QuickAddTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for the quick-add endpoint.
///
/// The date defaults to today when omitted.
#[derive(Debug, Deserialize)]
pub struct QuickAddRequest {
    pub amount: f64,
    pub category_id: CategoryId,
    pub note: Option<String>,
    pub date: Option<Date>,
}

/// Create a transaction from a JSON request and return it as JSON.
pub async fn quick_add_transaction_endpoint(
    State(state): State<QuickAddTransactionState>,
    Json(request): Json<QuickAddRequest>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_api_response();
        }
    };

    let mut builder = Transaction::build(request.amount, request.category_id);

    if let Some(date) = request.date {
        builder = builder.date(date);
    }

    if let Some(note) = &request.note {
        builder = builder.note(note);
    }

    match create_transaction(builder, &connection) {
        Ok(transaction) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "data": transaction })),
        )
            .into_response(),
        Err(
            error @ (Error::NonPositiveAmount(_)
            | Error::NoteTooLong(_)
            | Error::InvalidCategory(_)),
        ) => error.into_api_response(),
        Err(error) => {
            tracing::error!("Failed to quick-add a transaction: {error}");
            error.into_api_response()
        }
    }
}

#[cfg(test)]
mod quick_add_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{CategoryKind, CategoryTitle, create_category},
        db::initialize,
        test_utils::parse_json_body,
    };

    use super::{QuickAddRequest, QuickAddTransactionState, quick_add_transaction_endpoint};

    fn get_quick_add_state() -> (QuickAddTransactionState, i64) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        let category = create_category(
            CategoryTitle::new_unchecked("Test Category"),
            "🧪",
            CategoryKind::Expense,
            &connection,
        )
        .expect("Could not create test category");

        (
            QuickAddTransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            category.id,
        )
    }

    #[tokio::test]
    async fn creates_transaction_and_returns_it() {
        let (state, category_id) = get_quick_add_state();
        let request = QuickAddRequest {
            amount: 12.5,
            category_id,
            note: Some("Coffee".to_owned()),
            date: Some(date!(2025 - 06 - 01)),
        };

        let response = quick_add_transaction_endpoint(State(state), Json(request)).await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = parse_json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["amount"], 12.5);
        assert_eq!(body["data"]["note"], "Coffee");
        assert_eq!(body["data"]["category_id"], category_id);
    }

    #[tokio::test]
    async fn date_defaults_to_today() {
        let (state, category_id) = get_quick_add_state();
        let request = QuickAddRequest {
            amount: 5.0,
            category_id,
            note: None,
            date: None,
        };

        let response = quick_add_transaction_endpoint(State(state), Json(request)).await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = parse_json_body(response).await;
        assert!(body["data"]["date"].is_string());
    }

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let (state, category_id) = get_quick_add_state();
        let request = QuickAddRequest {
            amount: 0.0,
            category_id,
            note: None,
            date: None,
        };

        let response = quick_add_transaction_endpoint(State(state), Json(request)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = parse_json_body(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn rejects_unknown_category() {
        let (state, _) = get_quick_add_state();
        let request = QuickAddRequest {
            amount: 5.0,
            category_id: 999999,
            note: None,
            date: None,
        };

        let response = quick_add_transaction_endpoint(State(state), Json(request)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
