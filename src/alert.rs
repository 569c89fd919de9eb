//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are rendered as HTML fragments targeted at the `#alert-container`
//! element that the base layout places on every page. Error responses are
//! swapped in via `hx-target-error`, success responses via an out-of-band
//! swap so they can accompany another swap (e.g. deleting a table row).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, Render, html};

/// A dismissable success or error message.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with no further details.
    Success {
        /// The message shown to the user.
        message: String,
    },
    /// An error message with a short title and an explanation of how to fix it.
    Error {
        /// A short title, e.g. "Invalid amount".
        title: String,
        /// Details on what went wrong and what the user can do about it.
        message: String,
    },
}

const ALERT_SUCCESS_STYLE: &str = "flex items-start gap-3 p-4 mb-2 text-sm rounded border \
    text-green-800 border-green-300 bg-green-50 \
    dark:bg-gray-800 dark:text-green-400 dark:border-green-800";

const ALERT_ERROR_STYLE: &str = "flex items-start gap-3 p-4 mb-2 text-sm rounded border \
    text-red-800 border-red-300 bg-red-50 \
    dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

// Reveals the alert container and hides it again once the alert is dismissed
// or times out.
const ALERT_SCRIPT: &str = r#"
    (() => {
        const container = document.getElementById('alert-container');
        if (container === null) { return; }
        container.classList.remove('hidden');
        setTimeout(() => {
            container.classList.add('hidden');
            container.querySelectorAll('[data-alert]').forEach((alert) => alert.remove());
        }, 5000);
    })();
    "#;

impl Alert {
    /// Create a success alert.
    pub fn success(message: &str) -> Self {
        Self::Success {
            message: message.to_owned(),
        }
    }

    /// Create an error alert.
    pub fn error(title: &str, message: &str) -> Self {
        Self::Error {
            title: title.to_owned(),
            message: message.to_owned(),
        }
    }

    fn into_markup(self) -> Markup {
        match self {
            Alert::Success { message } => html!(
                div data-alert="true" class=(ALERT_SUCCESS_STYLE) role="alert"
                {
                    span class="font-medium" { (message) }
                }
                script { (PreEscaped(ALERT_SCRIPT)) }
            ),
            Alert::Error { title, message } => html!(
                div data-alert="true" class=(ALERT_ERROR_STYLE) role="alert"
                {
                    div
                    {
                        p class="font-medium" { (title) }
                        p { (message) }
                    }
                }
                script { (PreEscaped(ALERT_SCRIPT)) }
            ),
        }
    }

    /// Render the alert as an HTTP response with the given status code.
    ///
    /// Used for error alerts, which forms route into the alert container with
    /// `hx-target-error`.
    pub fn into_response_with_status(self, status_code: StatusCode) -> Response {
        (status_code, self.into_markup().into_string()).into_response()
    }
}

impl Render for Alert {
    fn render(&self) -> Markup {
        self.clone().into_markup()
    }
}

impl IntoResponse for Alert {
    /// Render the alert as a 200 OK response with an out-of-band swap into
    /// the alert container.
    ///
    /// The status code has to be 200 OK or HTMX will not perform the swap
    /// that the alert accompanies (e.g. deleting a table row).
    fn into_response(self) -> Response {
        let markup = html!(
            div hx-swap-oob="beforeend:#alert-container" { (self.into_markup()) }
        );

        (StatusCode::OK, markup.into_string()).into_response()
    }
}

#[cfg(test)]
mod alert_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::{Html, Selector};

    use crate::{
        alert::Alert,
        test_utils::{assert_status_ok, parse_html_fragment},
    };

    #[tokio::test]
    async fn success_alert_swaps_out_of_band_into_alert_container() {
        let response = Alert::success("Category deleted successfully").into_response();

        assert_status_ok(&response);

        let fragment = parse_html_fragment(response).await;
        let oob_selector = Selector::parse("div[hx-swap-oob]").unwrap();
        let oob_div = fragment
            .select(&oob_selector)
            .next()
            .expect("want a div with hx-swap-oob");
        assert_eq!(
            oob_div.value().attr("hx-swap-oob"),
            Some("beforeend:#alert-container")
        );
        assert!(fragment.html().contains("Category deleted successfully"));
    }

    #[tokio::test]
    async fn error_alert_has_title_message_and_status() {
        let response = Alert::error("Invalid amount", "Amounts must be greater than zero.")
            .into_response_with_status(StatusCode::BAD_REQUEST);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");
        let text = String::from_utf8_lossy(&body).to_string();
        let fragment = Html::parse_fragment(&text);

        let alert_selector = Selector::parse("div[role=alert]").unwrap();
        assert!(fragment.select(&alert_selector).next().is_some());
        assert!(text.contains("Invalid amount"));
        assert!(text.contains("Amounts must be greater than zero."));
    }
}
