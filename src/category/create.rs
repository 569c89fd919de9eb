//! Category creation page and endpoint.

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

use crate::{
    AppState, Error, endpoints,
    category::{CategoryKind, CategoryTitle, create_category, domain::CategoryFormData},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

use std::str::FromStr;

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category creation page.
pub async fn get_new_category_page() -> Response {
    new_category_view().into_response()
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    Form(new_category): Form<CategoryFormData>,
) -> Response {
    let title = match CategoryTitle::new(&new_category.title) {
        Ok(title) => title,
        Err(error) => {
            return new_category_form_view(&new_category, &format!("Error: {error}"))
                .into_response();
        }
    };

    let kind = match CategoryKind::from_str(&new_category.kind) {
        Ok(kind) => kind,
        Err(error) => {
            return new_category_form_view(&new_category, &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(title, &new_category.icon, kind, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::DuplicateCategoryTitle) => new_category_form_view(
            &new_category,
            &format!("Error: {}", Error::DuplicateCategoryTitle),
        )
        .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

fn new_category_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();
    let form = new_category_form_view(
        &CategoryFormData {
            title: String::new(),
            icon: String::new(),
            kind: CategoryKind::Expense.to_string(),
        },
        "",
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Category", &[], &content)
}

fn new_category_form_view(form_data: &CategoryFormData, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_CATEGORY)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (category_form_fields(form_data))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Category" }
        }
    }
}

/// The title, icon and kind fields shared by the create and edit forms.
pub(super) fn category_form_fields(form_data: &CategoryFormData) -> Markup {
    let is_income = form_data.kind == CategoryKind::Income.to_string();

    html! {
        div
        {
            label
                for="title"
                class=(FORM_LABEL_STYLE)
            {
                "Title"
            }

            input
                id="title"
                type="text"
                name="title"
                placeholder="e.g. Groceries"
                value=(form_data.title)
                maxlength="50"
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="icon"
                class=(FORM_LABEL_STYLE)
            {
                "Icon"
            }

            input
                id="icon"
                type="text"
                name="icon"
                placeholder="e.g. 🛒"
                value=(form_data.icon)
                maxlength="10"
                class=(FORM_TEXT_INPUT_STYLE);
        }

        fieldset
        {
            legend class=(FORM_LABEL_STYLE) { "Kind" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        id="kind-expense"
                        type="radio"
                        name="kind"
                        value="Expense"
                        checked[!is_income]
                        class=(FORM_RADIO_INPUT_STYLE);

                    label for="kind-expense" class=(FORM_RADIO_LABEL_STYLE) { "Expense" }
                }

                div class="flex items-center gap-3"
                {
                    input
                        id="kind-income"
                        type="radio"
                        name="kind"
                        value="Income"
                        checked[is_income]
                        class=(FORM_RADIO_INPUT_STYLE);

                    label for="kind-income" class=(FORM_RADIO_LABEL_STYLE) { "Income" }
                }
            }
        }
    }
}
