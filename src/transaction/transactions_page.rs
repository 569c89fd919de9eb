//! Transactions listing page with filtering, sorting, pagination and bulk
//! deletion.

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error, endpoints,
    category::{Category, CategoryId, CategoryKind, get_all_categories},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, CATEGORY_BADGE_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, PaginationIndicator, create_pagination_indicators},
    query_params::{empty_as_none, empty_date_as_none},
    transaction::{
        SortOrder, TransactionFilter, TransactionRow, TransactionSortKey,
        count_matching_transactions, get_transaction_page,
    },
};

/// The largest page size a client may request.
pub(crate) const MAX_PAGE_SIZE: u64 = 100;

/// How many characters of the note are shown in the listing before it is cut
/// off.
const NOTE_PREVIEW_LENGTH: usize = 40;

/// The state needed for the transactions listing page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters accepted by the transactions listing page and the
/// export endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransactionsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_date_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<Date>,
    #[serde(
        default,
        deserialize_with = "empty_date_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<Date>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_amount: Option<f64>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub page: Option<u64>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_size: Option<u64>,
}

impl TransactionsQuery {
    /// Convert the raw query parameters into a [TransactionFilter].
    ///
    /// # Errors
    /// Returns a [Error::InvalidCategoryKind] if `kind` is not "Income" or
    /// "Expense", or a [Error::InvalidDateRange] if the start date comes
    /// after the end date.
    pub(crate) fn filter(&self) -> Result<TransactionFilter, Error> {
        let kind = match self.kind.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(raw_kind) => Some(CategoryKind::from_str(raw_kind)?),
        };

        if let (Some(start_date), Some(end_date)) = (self.start_date, self.end_date)
            && start_date > end_date
        {
            return Err(Error::InvalidDateRange);
        }

        Ok(TransactionFilter {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_owned),
            category_id: self.category,
            kind,
            start_date: self.start_date,
            end_date: self.end_date,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
        })
    }

    pub(crate) fn sort_key(&self) -> TransactionSortKey {
        match self.sort.as_deref() {
            Some("amount") => TransactionSortKey::Amount,
            Some("note") => TransactionSortKey::Note,
            _ => TransactionSortKey::Date,
        }
    }

    pub(crate) fn sort_order(&self) -> SortOrder {
        match self.order.as_deref() {
            Some("asc") => SortOrder::Ascending,
            _ => SortOrder::Descending,
        }
    }

    fn url_for_page(&self, page: u64) -> String {
        let query = TransactionsQuery {
            page: Some(page),
            ..self.clone()
        };
        let query_string =
            serde_urlencoded::to_string(&query).unwrap_or_else(|_| format!("page={page}"));

        format!("{}?{}", endpoints::TRANSACTIONS_VIEW, query_string)
    }

    /// Build an export URL carrying the current filters but not the page
    /// window. Exports always cover every matching transaction.
    fn url_for_export(&self, export_route: &str) -> String {
        let query = TransactionsQuery {
            page: None,
            page_size: None,
            ..self.clone()
        };

        match serde_urlencoded::to_string(&query) {
            Ok(query_string) if !query_string.is_empty() => {
                format!("{export_route}?{query_string}")
            }
            _ => export_route.to_owned(),
        }
    }
}

/// Render the transactions listing page.
pub async fn get_transactions_page(
    Query(query): Query<TransactionsQuery>,
    State(state): State<TransactionsPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let (filter, filter_error) = match query.filter() {
        Ok(filter) => (filter, String::new()),
        Err(error) => (TransactionFilter::default(), format!("Error: {error}")),
    };

    let page = query
        .page
        .unwrap_or(state.pagination_config.default_page)
        .max(1);
    let page_size = query
        .page_size
        .unwrap_or(state.pagination_config.default_page_size)
        .clamp(1, MAX_PAGE_SIZE);

    let total_count = count_matching_transactions(&filter, &connection)
        .inspect_err(|error| tracing::error!("Failed to count transactions: {error}"))?;
    let rows = get_transaction_page(
        &filter,
        query.sort_key(),
        query.sort_order(),
        page,
        page_size,
        &connection,
    )
    .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let page_count = total_count.div_ceil(page_size).max(1);
    let indicators =
        create_pagination_indicators(page, page_count, state.pagination_config.max_pages);

    Ok(
        transactions_view(&rows, &categories, &query, &filter_error, &indicators)
            .into_response(),
    )
}

fn transactions_view(
    rows: &[TransactionRow],
    categories: &[Category],
    query: &TransactionsQuery,
    filter_error: &str,
    pagination: &[PaginationIndicator],
) -> Markup {
    let new_transaction_route = endpoints::NEW_TRANSACTION_VIEW;
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(new_transaction_route) class=(LINK_STYLE)
                    {
                        "Add Transaction"
                    }
                }

                (filter_form(categories, query))

                @if !filter_error.is_empty() {
                    p class="text-red-600 dark:text-red-400" { (filter_error) }
                }

                div class="flex flex-wrap items-center justify-between gap-2"
                {
                    div class="flex gap-4 text-sm"
                    {
                        span class="text-gray-500 dark:text-gray-400" { "Export:" }
                        a href=(query.url_for_export(endpoints::EXPORT_CSV)) class=(LINK_STYLE)
                        { "CSV" }
                        a href=(query.url_for_export(endpoints::EXPORT_XLSX)) class=(LINK_STYLE)
                        { "Excel" }
                        a href=(query.url_for_export(endpoints::EXPORT_PDF)) class=(LINK_STYLE)
                        { "PDF" }
                    }

                    button
                        id="bulk-delete-button"
                        type="button"
                        class=(BUTTON_DELETE_STYLE)
                        style="width: auto"
                    {
                        "Delete Selected"
                    }
                }

                (transactions_cards_view(rows, new_transaction_route))

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
                                    span class="sr-only" { "Select" }
                                }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
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
                                        colspan="6"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions found. "
                                        a href=(new_transaction_route) class=(LINK_STYLE)
                                        {
                                            "Add a transaction"
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

        (bulk_delete_script())
    );

    base("Transactions", &[], &content)
}

fn table_row(row: &TransactionRow) -> Markup {
    let edit_url =
        endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, row.transaction.id);
    let delete_url =
        endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, row.transaction.id);

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                input
                    type="checkbox"
                    name="transaction_ids"
                    value=(row.transaction.id)
                    aria-label="Select transaction";
            }

            td class=(TABLE_CELL_STYLE)
            {
                (row.transaction.date)
            }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE)
                {
                    (row.category_icon) " " (row.category_title)
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                (note_preview(row.transaction.note.as_deref()))
            }

            td class=(TABLE_CELL_STYLE)
            {
                (amount_view(row))
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        "Are you sure you want to delete this transaction?",
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    )
}

fn transactions_cards_view(rows: &[TransactionRow], new_transaction_route: &str) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for row in rows {
                @let edit_url =
                    endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, row.transaction.id);
                @let delete_url =
                    endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, row.transaction.id);

                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-transaction-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        div class="space-y-1"
                        {
                            span class=(CATEGORY_BADGE_STYLE)
                            {
                                (row.category_icon) " " (row.category_title)
                            }
                            p class="text-sm text-gray-500 dark:text-gray-400"
                            {
                                (row.transaction.date)
                            }
                        }

                        (amount_view(row))
                    }

                    @if let Some(note) = row.transaction.note.as_deref() {
                        p class="mt-1 text-sm text-gray-500 dark:text-gray-400"
                        {
                            (note_preview(Some(note)))
                        }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        input
                            type="checkbox"
                            name="transaction_ids"
                            value=(row.transaction.id)
                            aria-label="Select transaction";

                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            "Are you sure you want to delete this transaction?",
                            "closest [data-transaction-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if rows.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No transactions found. "
                    a href=(new_transaction_route) class=(LINK_STYLE)
                    {
                        "Add a transaction"
                    }
                }
            }
        }
    )
}

fn amount_view(row: &TransactionRow) -> Markup {
    match row.category_kind {
        CategoryKind::Income => html!(
            span class="tabular-nums font-medium text-green-600 dark:text-green-400"
            {
                "+" (format_currency(row.transaction.amount))
            }
        ),
        CategoryKind::Expense => html!(
            span class="tabular-nums font-medium text-red-600 dark:text-red-400"
            {
                "-" (format_currency(row.transaction.amount))
            }
        ),
    }
}

fn note_preview(note: Option<&str>) -> String {
    let Some(note) = note else {
        return String::new();
    };

    let graphemes: Vec<&str> = note.graphemes(true).collect();

    if graphemes.len() <= NOTE_PREVIEW_LENGTH {
        note.to_owned()
    } else {
        let mut preview: String = graphemes[..NOTE_PREVIEW_LENGTH].concat();
        preview.push('…');
        preview
    }
}

fn filter_form(categories: &[Category], query: &TransactionsQuery) -> Markup {
    html!(
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="flex flex-wrap items-end gap-2"
        {
            input
                type="text"
                name="search"
                placeholder="Search notes"
                value=[query.search.as_deref()]
                class=(FORM_TEXT_INPUT_STYLE)
                style="max-width: 14rem";

            select name="category" class=(FORM_TEXT_INPUT_STYLE) style="max-width: 12rem"
            {
                option value="" { "All categories" }

                @for category in categories {
                    option
                        value=(category.id)
                        selected[query.category == Some(category.id)]
                    {
                        (category.icon) " " (category.title)
                    }
                }
            }

            select name="kind" class=(FORM_TEXT_INPUT_STYLE) style="max-width: 8rem"
            {
                option value="" { "All kinds" }
                option value="Income" selected[query.kind.as_deref() == Some("Income")]
                { "Income" }
                option value="Expense" selected[query.kind.as_deref() == Some("Expense")]
                { "Expense" }
            }

            input
                type="date"
                name="start_date"
                value=[query.start_date.map(|date| date.to_string())]
                class=(FORM_TEXT_INPUT_STYLE)
                style="max-width: 11rem";

            input
                type="date"
                name="end_date"
                value=[query.end_date.map(|date| date.to_string())]
                class=(FORM_TEXT_INPUT_STYLE)
                style="max-width: 11rem";

            input
                type="number"
                name="min_amount"
                placeholder="Min amount"
                min="0"
                step="0.01"
                value=[query.min_amount]
                class=(FORM_TEXT_INPUT_STYLE)
                style="max-width: 9rem";

            input
                type="number"
                name="max_amount"
                placeholder="Max amount"
                min="0"
                step="0.01"
                value=[query.max_amount]
                class=(FORM_TEXT_INPUT_STYLE)
                style="max-width: 9rem";

            select name="sort" class=(FORM_TEXT_INPUT_STYLE) style="max-width: 8rem"
            {
                option value="date" selected[query.sort.as_deref() != Some("amount")
                    && query.sort.as_deref() != Some("note")] { "Date" }
                option value="amount" selected[query.sort.as_deref() == Some("amount")]
                { "Amount" }
                option value="note" selected[query.sort.as_deref() == Some("note")]
                { "Note" }
            }

            select name="order" class=(FORM_TEXT_INPUT_STYLE) style="max-width: 8rem"
            {
                option value="desc" selected[query.order.as_deref() != Some("asc")]
                { "Descending" }
                option value="asc" selected[query.order.as_deref() == Some("asc")]
                { "Ascending" }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) style="width: auto" { "Apply" }
        }
    )
}

fn pagination_view(query: &TransactionsQuery, indicators: &[PaginationIndicator]) -> Markup {
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

/// Collects the checked row IDs and posts them to the bulk delete endpoint.
fn bulk_delete_script() -> Markup {
    let script = format!(
        r#"
        document.addEventListener('DOMContentLoaded', () => {{
            const button = document.getElementById('bulk-delete-button');
            if (!button) return;

            button.addEventListener('click', () => {{
                const ids = Array.from(
                    document.querySelectorAll("input[name='transaction_ids']:checked")
                ).map((checkbox) => Number(checkbox.value));

                if (ids.length === 0) {{
                    alert('Select at least one transaction to delete.');
                    return;
                }}

                if (!confirm(`Delete ${{ids.length}} selected transaction(s)?`)) return;

                fetch('{bulk_delete_route}', {{
                    method: 'POST',
                    headers: {{ 'Content-Type': 'application/json' }},
                    body: JSON.stringify({{ ids }}),
                }})
                    .then((response) => response.json())
                    .then((body) => {{
                        if (body.success) {{
                            window.location.reload();
                        }} else {{
                            alert(body.message || 'Could not delete the selected transactions.');
                        }}
                    }})
                    .catch(() => alert('Could not delete the selected transactions.'));
            }});
        }});
        "#,
        bulk_delete_route = endpoints::BULK_DELETE_TRANSACTIONS,
    );

    html!(script { (PreEscaped(script)) })
}

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        category::{CategoryKind, CategoryTitle, create_category},
        db::initialize,
        pagination::PaginationConfig,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::{
            Transaction, create_transaction,
            transactions_page::{TransactionsPageState, TransactionsQuery, get_transactions_page},
        },
    };

    fn get_transactions_page_state() -> TransactionsPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        TransactionsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            pagination_config: PaginationConfig::default(),
        }
    }

    fn insert_transactions(state: &TransactionsPageState, count: usize) {
        let connection = state.db_connection.lock().unwrap();
        let category = create_category(
            CategoryTitle::new_unchecked("Test Category"),
            "🧪",
            CategoryKind::Expense,
            &connection,
        )
        .expect("Could not create test category");

        for index in 0..count {
            create_transaction(
                Transaction::build(1.0 + index as f64, category.id)
                    .date(date!(2025 - 06 - 01))
                    .note(&format!("Transaction {index}")),
                &connection,
            )
            .expect("Could not create test transaction");
        }
    }

    #[tokio::test]
    async fn renders_transactions_with_category_badges() {
        let state = get_transactions_page_state();
        insert_transactions(&state, 3);

        let response = get_transactions_page(Query(TransactionsQuery::default()), State(state))
            .await
            .unwrap();

        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 3);
        assert!(html.html().contains("Test Category"));
    }

    #[tokio::test]
    async fn first_page_is_limited_to_page_size() {
        let state = get_transactions_page_state();
        insert_transactions(&state, 15);

        let response = get_transactions_page(Query(TransactionsQuery::default()), State(state))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let row_selector = Selector::parse("tbody tr").unwrap();
        // The default page size is 10.
        assert_eq!(html.select(&row_selector).count(), 10);
    }

    #[tokio::test]
    async fn second_page_shows_the_remainder() {
        let state = get_transactions_page_state();
        insert_transactions(&state, 15);
        let query = TransactionsQuery {
            page: Some(2),
            ..Default::default()
        };

        let response = get_transactions_page(Query(query), State(state))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 5);
    }

    #[tokio::test]
    async fn invalid_date_range_shows_error_message() {
        let state = get_transactions_page_state();
        insert_transactions(&state, 1);
        let query = TransactionsQuery {
            start_date: Some(date!(2025 - 06 - 30)),
            end_date: Some(date!(2025 - 06 - 01)),
            ..Default::default()
        };

        let response = get_transactions_page(Query(query), State(state))
            .await
            .unwrap();

        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert!(html.html().contains("Error: invalid date range"));
    }

    #[tokio::test]
    async fn empty_page_invites_adding_a_transaction() {
        let state = get_transactions_page_state();

        let response = get_transactions_page(Query(TransactionsQuery::default()), State(state))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert!(html.html().contains("No transactions found."));
    }
}
