//! Defines the templates and route handlers for the page to display for an internal server error.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub struct InternalServerErrorPage<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerErrorPage<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl InternalServerErrorPage<'_> {
    pub fn into_html(self) -> Html<String> {
        Html(error_view("Internal Server Error", "500", self.description, self.fix).into_string())
    }
}

impl IntoResponse for InternalServerErrorPage<'_> {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.into_html()).into_response()
    }
}

/// Render `page` as a 500 response.
pub fn render_internal_server_error(page: InternalServerErrorPage<'_>) -> Response {
    page.into_response()
}

pub async fn get_internal_server_error_page() -> Response {
    InternalServerErrorPage::default().into_response()
}
