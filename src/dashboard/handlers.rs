//! Dashboard HTTP handlers and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{
    AppState, Error,
    category::CategoryKind,
    dashboard::{
        Period,
        aggregation::{
            CategoryBreakdownEntry, DailyPoint, FinancialSummary, MonthlyComparison,
            category_breakdown, daily_series, financial_summary, monthly_comparison,
            recent_transactions,
        },
        charts::{
            DashboardChart, charts_script, charts_view, daily_trend_chart,
            expense_breakdown_chart, monthly_comparison_chart,
        },
        tables::{breakdown_table, recent_transactions_table, summary_cards_view},
    },
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, base, link,
    },
    navigation::NavBar,
    query_params::empty_date_as_none,
    timezone::today_local,
    transaction::{
        SortOrder, TransactionFilter, TransactionRow, TransactionSortKey,
        get_matching_transactions,
    },
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters accepted by the dashboard page and data endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub period: Option<String>,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub end_date: Option<Date>,
}

/// Everything the dashboard page and the JSON endpoint report for a period.
#[derive(Debug, Serialize)]
pub(super) struct DashboardData {
    pub summary: FinancialSummary,
    pub expense_breakdown: Vec<CategoryBreakdownEntry>,
    pub income_breakdown: Vec<CategoryBreakdownEntry>,
    pub daily_series: Vec<DailyPoint>,
    pub monthly_comparison: MonthlyComparison,
    pub recent_transactions: Vec<TransactionRow>,
}

/// Display a page with an overview of the user's transactions for a period.
pub async fn get_dashboard_page(
    Query(query): Query<DashboardQuery>,
    State(state): State<DashboardState>,
) -> Result<Response, Error> {
    let today = today_local(&state.local_timezone)?;
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    let (period, period_error) =
        match Period::from_query(query.period.as_deref(), query.start_date, query.end_date) {
            Ok(period) => (period, String::new()),
            Err(error) => (Period::default(), format!("Error: {error}")),
        };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    match build_dashboard_data(period, today, &connection)? {
        Some(data) => {
            Ok(dashboard_view(nav_bar, period, &query, &period_error, &data).into_response())
        }
        None => Ok(dashboard_no_data_view(nav_bar, period, &query, &period_error).into_response()),
    }
}

/// Fetches and aggregates all data needed for the dashboard.
///
/// Returns `None` if the period contains no transactions.
///
/// # Errors
/// Returns a [Error::SqlError] if a database query fails.
pub(super) fn build_dashboard_data(
    period: Period,
    today: Date,
    connection: &Connection,
) -> Result<Option<DashboardData>, Error> {
    let date_range = period.date_range(today);

    let rows = rows_in_range(*date_range.start(), *date_range.end(), connection)
        .inspect_err(|error| {
            tracing::error!("Could not get transactions for the dashboard: {error}")
        })?;

    if rows.is_empty() {
        return Ok(None);
    }

    let current_month_start = today.replace_day(1).unwrap_or(today);
    let previous_month_end = current_month_start - Duration::days(1);
    let previous_month_start = previous_month_end.replace_day(1).unwrap_or(previous_month_end);

    let current_month_rows = rows_in_range(current_month_start, today, connection)?;
    let previous_month_rows =
        rows_in_range(previous_month_start, previous_month_end, connection)?;

    Ok(Some(DashboardData {
        summary: financial_summary(&rows, &date_range),
        expense_breakdown: category_breakdown(&rows, CategoryKind::Expense),
        income_breakdown: category_breakdown(&rows, CategoryKind::Income),
        daily_series: daily_series(&rows, &date_range),
        monthly_comparison: monthly_comparison(&current_month_rows, &previous_month_rows),
        recent_transactions: recent_transactions(&rows),
    }))
}

fn rows_in_range(
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<Vec<TransactionRow>, Error> {
    let filter = TransactionFilter {
        start_date: Some(start),
        end_date: Some(end),
        ..Default::default()
    };

    get_matching_transactions(
        &filter,
        TransactionSortKey::Date,
        SortOrder::Descending,
        connection,
    )
}

fn build_dashboard_charts(data: &DashboardData) -> [DashboardChart; 3] {
    [
        DashboardChart {
            id: "expense-breakdown-chart",
            options: expense_breakdown_chart(&data.expense_breakdown).to_string(),
        },
        DashboardChart {
            id: "daily-trend-chart",
            options: daily_trend_chart(&data.daily_series).to_string(),
        },
        DashboardChart {
            id: "monthly-comparison-chart",
            options: monthly_comparison_chart(&data.monthly_comparison).to_string(),
        },
    ]
}

/// The period selector shown at the top of the dashboard.
fn period_selector(period: Period, query: &DashboardQuery) -> Markup {
    let is_custom = matches!(period, Period::Custom { .. });

    html!(
        form
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="flex flex-wrap items-end gap-2"
        {
            select name="period" class=(FORM_TEXT_INPUT_STYLE) style="max-width: 10rem"
            {
                option value="today" selected[period == Period::Today] { "Today" }
                option value="week" selected[period == Period::Week] { "Last 7 days" }
                option value="month" selected[period == Period::Month] { "Last 30 days" }
                option value="year" selected[period == Period::Year] { "Last 365 days" }
                option value="custom" selected[is_custom] { "Custom range" }
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

            button type="submit" class=(BUTTON_SECONDARY_STYLE) style="width: auto" { "Apply" }
        }
    )
}

/// Renders the dashboard page when the period has no transactions.
fn dashboard_no_data_view(
    nav_bar: NavBar,
    period: Period,
    query: &DashboardQuery,
    period_error: &str,
) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "add a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white space-y-4"
        {
            (period_selector(period, query))

            @if !period_error.is_empty() {
                p class="text-red-600 dark:text-red-400" { (period_error) }
            }

            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once this period has some transactions.
                You can " (new_transaction_link) " to get started."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with cards, charts and tables.
fn dashboard_view(
    nav_bar: NavBar,
    period: Period,
    query: &DashboardQuery,
    period_error: &str,
    data: &DashboardData,
) -> Markup {
    let nav_bar = nav_bar.into_html();
    let charts = build_dashboard_charts(data);

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            div class="w-full mb-4 space-y-2"
            {
                (period_selector(period, query))

                @if !period_error.is_empty() {
                    p class="text-red-600 dark:text-red-400" { (period_error) }
                }
            }

            (summary_cards_view(&data.summary))

            (charts_view(&charts))

            section class="w-full mx-auto mb-4"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    (breakdown_table(CategoryKind::Expense, &data.expense_breakdown))
                    (breakdown_table(CategoryKind::Income, &data.income_breakdown))
                    (recent_transactions_table(&data.recent_transactions))
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}
