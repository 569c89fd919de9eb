//! Application router configuration: pages, JSON API, exports and static
//! files.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde_json::json;
use time::OffsetDateTime;
use tower_http::services::ServeDir;

use crate::{
    AppState,
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_api,
        get_categories_page, get_edit_category_page, get_new_category_page,
        update_category_endpoint,
    },
    dashboard::{get_dashboard_data_api, get_dashboard_page},
    endpoints,
    export::{export_transactions_csv, export_transactions_pdf, export_transactions_xlsx},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{
        bulk_delete_transactions_endpoint, create_transaction_endpoint,
        delete_transaction_endpoint, get_edit_transaction_page, get_new_transaction_page,
        get_transactions_page, quick_add_transaction_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(endpoints::EDIT_TRANSACTION_VIEW, get(get_edit_transaction_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::NEW_CATEGORY_VIEW, get(get_new_category_page))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let exports = Router::new()
        .route(endpoints::EXPORT_CSV, get(export_transactions_csv))
        .route(endpoints::EXPORT_XLSX, get(export_transactions_xlsx))
        .route(endpoints::EXPORT_PDF, get(export_transactions_pdf));

    // POST_CATEGORY and CATEGORIES_API share a path, as do the PUT/DELETE
    // pairs, so each path is registered once with all its methods.
    let api = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::HEALTH, get(get_health))
        .route(
            endpoints::CATEGORIES_API,
            get(get_categories_api).post(create_category_endpoint),
        )
        .route(
            endpoints::PUT_CATEGORY,
            axum::routing::put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(endpoints::TRANSACTIONS_API, post(create_transaction_endpoint))
        .route(
            endpoints::PUT_TRANSACTION,
            axum::routing::put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BULK_DELETE_TRANSACTIONS,
            post(bulk_delete_transactions_endpoint),
        )
        .route(
            endpoints::QUICK_ADD_TRANSACTION,
            post(quick_add_transaction_endpoint),
        )
        .route(endpoints::DASHBOARD_DATA, get(get_dashboard_data_api));

    pages
        .merge(exports)
        .merge(api)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// Report the server status as JSON.
async fn get_health() -> Response {
    Json(json!({
        "status": "ok",
        "timestamp": OffsetDateTime::now_utc().unix_timestamp(),
    }))
    .into_response()
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints, pagination::PaginationConfig, routing::build_router};

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, "Etc/UTC", PaginationConfig::default())
            .expect("Could not create app state");

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.header("location"),
            endpoints::DASHBOARD_VIEW,
            "expected a redirect to the dashboard"
        );
    }

    #[tokio::test]
    async fn coffee_is_a_teapot() {
        let server = get_test_server();

        let response = server.get(endpoints::COFFEE).await;

        response.assert_status(StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let server = get_test_server();

        let response = server.get(endpoints::HEALTH).await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_number());
    }

    #[tokio::test]
    async fn unknown_route_renders_404_page() {
        let server = get_test_server();

        let response = server.get("/no/such/page").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("404"));
    }

    #[tokio::test]
    async fn transactions_page_is_reachable() {
        let server = get_test_server();

        let response = server.get(endpoints::TRANSACTIONS_VIEW).await;

        response.assert_status_ok();
    }
}
