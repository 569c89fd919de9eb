//! Transaction deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::Alert, database_id::DatabaseID, transaction::delete_transaction};

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle transaction deletion. Returns a success alert or an error alert.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<DatabaseID>,
    State(state): State<DeleteTransactionEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, &connection) {
        Ok(_) => Alert::success("Transaction deleted successfully").into_response(),
        Err(error @ Error::DeleteMissingTransaction) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        category::{CategoryKind, CategoryTitle, create_category},
        db::initialize,
        transaction::{Transaction, count_transactions, create_transaction},
    };

    use super::{DeleteTransactionEndpointState, delete_transaction_endpoint};

    fn get_delete_transaction_state() -> DeleteTransactionEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        DeleteTransactionEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn delete_transaction_endpoint_succeeds() {
        let state = get_delete_transaction_state();
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryTitle::new_unchecked("Test Category"),
                "🧪",
                CategoryKind::Expense,
                &connection,
            )
            .expect("Could not create test category");

            create_transaction(Transaction::build(42.0, category.id), &connection)
                .expect("Could not create test transaction")
        };

        let response = delete_transaction_endpoint(Path(transaction.id), State(state.clone()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            count_transactions(&state.db_connection.lock().unwrap()),
            Ok(0)
        );
    }

    #[tokio::test]
    async fn delete_transaction_endpoint_with_invalid_id_returns_not_found() {
        let state = get_delete_transaction_state();

        let response = delete_transaction_endpoint(Path(999999), State(state))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
