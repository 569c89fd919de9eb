//! Helpers for turning handler responses into parsed HTML trees.

use axum::{body::Body, response::Response};
use scraper::Html;

async fn response_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    String::from_utf8_lossy(&bytes).into_owned()
}

/// Parse a response body as a full HTML document.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&response_text(response).await)
}

/// Parse a response body as an HTML fragment, as returned to htmx swaps.
pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&response_text(response).await)
}

/// Fail the test if the parser recorded any errors for `html`.
#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "HTML did not parse cleanly: {:?}",
        html.errors
    );
}
