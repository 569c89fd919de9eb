//! JSON endpoint listing categories, used by the quick-add widget.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error,
    category::{CategoryKind, get_all_categories, get_categories_by_kind},
};

use std::str::FromStr;

/// The state needed for the categories JSON endpoint.
#[derive(Debug, Clone)]
pub struct CategoriesApiState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoriesApiQuery {
    pub kind: Option<String>,
}

/// List categories as JSON, optionally filtered by kind.
pub async fn get_categories_api(
    Query(query): Query<CategoriesApiQuery>,
    State(state): State<CategoriesApiState>,
) -> Response {
    let kind = match query.kind.as_deref() {
        Some(raw_kind) => match CategoryKind::from_str(raw_kind) {
            Ok(kind) => Some(kind),
            Err(error) => return error.into_api_response(),
        },
        None => None,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_api_response();
        }
    };

    let categories = match kind {
        Some(kind) => get_categories_by_kind(kind, &connection),
        None => get_all_categories(&connection),
    };

    match categories {
        Ok(categories) => Json(json!({ "success": true, "data": categories })).into_response(),
        Err(error) => {
            tracing::error!("Failed to retrieve categories: {error}");
            error.into_api_response()
        }
    }
}
