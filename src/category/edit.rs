//! Category editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    category::{
        CategoryId, CategoryKind, CategoryTitle, create::category_form_fields,
        domain::CategoryFormData, get_category, update_category,
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

use std::str::FromStr;

/// The state needed for the edit category page.
#[derive(Debug, Clone)]
pub struct EditCategoryPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating a category.
#[derive(Debug, Clone)]
pub struct UpdateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category editing page.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, category_id);

    match get_category(category_id, &connection) {
        Ok(category) => {
            let form_data = CategoryFormData {
                title: category.title.to_string(),
                icon: category.icon,
                kind: category.kind.to_string(),
            };

            Ok(edit_category_view(&edit_endpoint, &update_endpoint, &form_data, "").into_response())
        }
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Category not found",
                _ => {
                    tracing::error!("Failed to retrieve category {category_id}: {error}");
                    "Failed to load category"
                }
            };

            let form_data = CategoryFormData {
                title: String::new(),
                icon: String::new(),
                kind: CategoryKind::Expense.to_string(),
            };

            Ok(
                edit_category_view(&edit_endpoint, &update_endpoint, &form_data, error_message)
                    .into_response(),
            )
        }
    }
}

/// Handle category update form submission.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<UpdateCategoryEndpointState>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, category_id);

    let title = match CategoryTitle::new(&form_data.title) {
        Ok(title) => title,
        Err(error) => {
            return edit_category_form_view(
                &update_endpoint,
                &form_data,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    let kind = match CategoryKind::from_str(&form_data.kind) {
        Ok(kind) => kind,
        Err(error) => {
            return edit_category_form_view(
                &update_endpoint,
                &form_data,
                &format!("Error: {error}"),
            )
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

    match update_category(category_id, title, &form_data.icon, kind, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingCategory) => Error::UpdateMissingCategory.into_alert_response(),
        Err(Error::DuplicateCategoryTitle) => edit_category_form_view(
            &update_endpoint,
            &form_data,
            &format!("Error: {}", Error::DuplicateCategoryTitle),
        )
        .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_category_view(
    edit_endpoint: &str,
    update_endpoint: &str,
    form_data: &CategoryFormData,
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(edit_endpoint).into_html();
    let form = edit_category_form_view(update_endpoint, form_data, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Category", &[], &content)
}

fn edit_category_form_view(
    update_endpoint: &str,
    form_data: &CategoryFormData,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
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

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Category" }
        }
    }
}
