//! JSON endpoint for deleting several transactions at once.

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

use crate::{AppState, Error, database_id::DatabaseID};

/// The state needed for the bulk delete endpoint.
#[derive(Debug, Clone)]
pub struct BulkDeleteTransactionsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BulkDeleteTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for the bulk delete endpoint.
#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<DatabaseID>,
}

/// Delete every transaction whose ID is in the request body.
///
/// IDs that do not match a transaction are skipped, the response reports how
/// many rows were actually deleted.
pub async fn bulk_delete_transactions_endpoint(
    State(state): State<BulkDeleteTransactionsState>,
    Json(request): Json<BulkDeleteRequest>,
) -> Response {
    if request.ids.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "No transaction IDs were provided."
            })),
        )
            .into_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_api_response();
        }
    };

    match delete_transactions(&request.ids, &connection) {
        Ok(deleted) => {
            Json(json!({ "success": true, "deleted": deleted })).into_response()
        }
        Err(error) => {
            tracing::error!("Failed to bulk delete transactions: {error}");
            error.into_api_response()
        }
    }
}

fn delete_transactions(ids: &[DatabaseID], connection: &Connection) -> Result<usize, Error> {
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("DELETE FROM \"transaction\" WHERE id IN ({placeholders})");

    connection
        .execute(&sql, rusqlite::params_from_iter(ids.iter()))
        .map_err(|error| error.into())
}
