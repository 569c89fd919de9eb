//! Categories listing page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, endpoints,
    category::{CategoryListingRow, CategorySortKey, db::get_category_listing},
    html::{
        BUTTON_SECONDARY_STYLE, CATEGORY_BADGE_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        edit_delete_action_links,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, PaginationIndicator, create_pagination_indicators},
    transaction::SortOrder,
};

/// The state needed for the categories listing page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters accepted by the categories listing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoriesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
}

impl CategoriesQuery {
    fn sort_key(&self) -> CategorySortKey {
        match self.sort.as_deref() {
            Some("kind") => CategorySortKey::Kind,
            _ => CategorySortKey::Title,
        }
    }

    fn sort_order(&self) -> SortOrder {
        match self.order.as_deref() {
            Some("desc") => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }

    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    fn url_for_page(&self, page: u64) -> String {
        let query = CategoriesQuery {
            page: Some(page),
            ..self.clone()
        };
        let query_string =
            serde_urlencoded::to_string(&query).unwrap_or_else(|_| format!("page={page}"));

        format!("{}?{}", endpoints::CATEGORIES_VIEW, query_string)
    }
}

/// Render the categories listing page with transaction counts.
pub async fn get_categories_page(
    Query(query): Query<CategoriesQuery>,
    State(state): State<CategoriesPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let page = query.page.unwrap_or(state.pagination_config.default_page).max(1);
    let page_size = state.pagination_config.default_page_size;

    let listing = get_category_listing(
        query.search_term(),
        query.sort_key(),
        query.sort_order(),
        page,
        page_size,
        &connection,
    )
    .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let page_count = listing.total_count.div_ceil(page_size).max(1);
    let indicators =
        create_pagination_indicators(page, page_count, state.pagination_config.max_pages);

    Ok(categories_view(&listing.rows, &query, &indicators).into_response())
}

fn categories_view(
    rows: &[CategoryListingRow],
    query: &CategoriesQuery,
    pagination: &[PaginationIndicator],
) -> Markup {
    let new_category_route = endpoints::NEW_CATEGORY_VIEW;
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let table_row = |row: &CategoryListingRow| {
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, row.category.id);
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_CATEGORY, row.category.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? Categories with transactions cannot be deleted.",
            row.category.title
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE)
                    {
                        (row.category.icon) " " (row.category.title)
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (row.category.kind)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (row.transaction_count)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Categories" }

                    a href=(new_category_route) class=(LINK_STYLE)
                    {
                        "Create Category"
                    }
                }

                (search_form(query))

                (categories_cards_view(rows, new_category_route))

                section class="hidden lg:block dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Category"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Kind"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Transactions"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Actions"
                                }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No categories found. "
                                        a href=(new_category_route) class=(LINK_STYLE)
                                        {
                                            "Create a category"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                (pagination_view(query, pagination))
            }
        }
    );

    base("Categories", &[], &content)
}

fn search_form(query: &CategoriesQuery) -> Markup {
    html!(
        form
            method="get"
            action=(endpoints::CATEGORIES_VIEW)
            class="flex flex-wrap items-end gap-2"
        {
            input
                type="text"
                name="search"
                placeholder="Search categories"
                value=[query.search.as_deref()]
                class=(FORM_TEXT_INPUT_STYLE)
                style="max-width: 16rem";

            select name="sort" class=(FORM_TEXT_INPUT_STYLE) style="max-width: 8rem"
            {
                option value="title" selected[query.sort.as_deref() != Some("kind")] { "Title" }
                option value="kind" selected[query.sort.as_deref() == Some("kind")] { "Kind" }
            }

            select name="order" class=(FORM_TEXT_INPUT_STYLE) style="max-width: 8rem"
            {
                option value="asc" selected[query.order.as_deref() != Some("desc")] { "Ascending" }
                option value="desc" selected[query.order.as_deref() == Some("desc")] { "Descending" }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) style="width: auto" { "Apply" }
        }
    )
}

fn pagination_view(query: &CategoriesQuery, indicators: &[PaginationIndicator]) -> Markup {
    let page_link_style = "px-3 py-1 rounded border border-gray-300 dark:border-gray-600 \
        hover:bg-gray-100 dark:hover:bg-gray-700";
    let current_page_style = "px-3 py-1 rounded border border-blue-600 text-blue-700 \
        dark:border-blue-500 dark:text-blue-300 font-semibold";

    html!(
        nav class="flex justify-center gap-2 text-sm" aria-label="Pagination"
        {
            @for indicator in indicators {
                @match indicator {
                    PaginationIndicator::BackButton(page) => {
                        a href=(query.url_for_page(*page)) class=(page_link_style) { "Back" }
                    }
                    PaginationIndicator::Page(page) => {
                        a href=(query.url_for_page(*page)) class=(page_link_style) { (page) }
                    }
                    PaginationIndicator::CurrPage(page) => {
                        span class=(current_page_style) aria-current="page" { (page) }
                    }
                    PaginationIndicator::Ellipsis => {
                        span class="px-1" { "…" }
                    }
                    PaginationIndicator::NextButton(page) => {
                        a href=(query.url_for_page(*page)) class=(page_link_style) { "Next" }
                    }
                }
            }
        }
    )
}

fn categories_cards_view(rows: &[CategoryListingRow], new_category_route: &str) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for row in rows {
                @let edit_url =
                    endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, row.category.id);
                @let delete_url =
                    endpoints::format_endpoint(endpoints::DELETE_CATEGORY, row.category.id);
                @let confirm_message = format!(
                    "Are you sure you want to delete '{}'? Categories with transactions cannot be deleted.",
                    row.category.title
                );

                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-category-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        span class=(CATEGORY_BADGE_STYLE)
                        {
                            (row.category.icon) " " (row.category.title)
                        }
                        span class="text-sm text-gray-500 dark:text-gray-400"
                        { (row.category.kind) }
                        span class="text-sm tabular-nums text-gray-900 dark:text-white"
                        { (row.transaction_count) }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest [data-category-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if rows.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No categories found. "
                    a href=(new_category_route) class=(LINK_STYLE)
                    {
                        "Create a category"
                    }
                }
            }
        }
    )
}
