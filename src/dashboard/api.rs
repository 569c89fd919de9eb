//! JSON endpoint exposing the dashboard aggregates, used by AJAX widgets.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    Error,
    dashboard::{
        Period,
        handlers::{DashboardQuery, DashboardState, build_dashboard_data},
    },
    timezone::today_local,
};

/// Report the dashboard aggregates for a period as JSON.
pub async fn get_dashboard_data_api(
    Query(query): Query<DashboardQuery>,
    State(state): State<DashboardState>,
) -> Response {
    let period = match Period::from_query(query.period.as_deref(), query.start_date, query.end_date)
    {
        Ok(period) => period,
        Err(error) => return error.into_api_response(),
    };

    let today = match today_local(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_api_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_api_response();
        }
    };

    match build_dashboard_data(period, today, &connection) {
        Ok(Some(data)) => Json(json!({ "success": true, "data": data })).into_response(),
        Ok(None) => Json(json!({ "success": true, "data": serde_json::Value::Null })).into_response(),
        Err(error) => {
            tracing::error!("Failed to build dashboard data: {error}");
            error.into_api_response()
        }
    }
}

#[cfg(test)]
mod dashboard_api_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use crate::{
        category::{CategoryKind, CategoryTitle, create_category},
        dashboard::handlers::{DashboardQuery, DashboardState},
        db::initialize,
        test_utils::{assert_status_ok, parse_json_body},
        transaction::{Transaction, create_transaction},
    };

    use super::get_dashboard_data_api;

    fn get_dashboard_state() -> DashboardState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn reports_aggregates_for_the_period() {
        let state = get_dashboard_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryTitle::new_unchecked("Wages"),
                "💰",
                CategoryKind::Income,
                &connection,
            )
            .expect("Could not create test category");
            create_transaction(
                Transaction::build(2000.0, category.id)
                    .date(OffsetDateTime::now_utc().date()),
                &connection,
            )
            .expect("Could not create test transaction");
        }

        let response =
            get_dashboard_data_api(Query(DashboardQuery::default()), State(state)).await;

        assert_status_ok(&response);

        let body = parse_json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["summary"]["total_income"], 2000.0);
        assert_eq!(body["data"]["summary"]["transaction_count"], 1);
        assert!(body["data"]["daily_series"].is_array());
    }

    #[tokio::test]
    async fn empty_period_reports_null_data() {
        let state = get_dashboard_state();

        let response =
            get_dashboard_data_api(Query(DashboardQuery::default()), State(state)).await;

        assert_status_ok(&response);

        let body = parse_json_body(response).await;
        assert_eq!(body["success"], true);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn inverted_custom_range_is_rejected() {
        let state = get_dashboard_state();
        let query = DashboardQuery {
            period: Some("custom".to_owned()),
            start_date: Some(time::macros::date!(2025 - 06 - 30)),
            end_date: Some(time::macros::date!(2025 - 06 - 01)),
        };

        let response = get_dashboard_data_api(Query(query), State(state)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = parse_json_body(response).await;
        assert_eq!(body["success"], false);
    }
}
