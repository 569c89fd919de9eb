//! Chart generation and rendering for the dashboard.
//!
//! This module creates the ECharts visualizations for a period:
//! - **Expense Breakdown**: Doughnut of expense totals by category
//! - **Daily Trend**: Smooth line chart of income/expense/net per day
//! - **Monthly Comparison**: Grouped bars for this month vs the previous one
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization
//! code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger,
    },
    series::{Bar, Line, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    dashboard::aggregation::{CategoryBreakdownEntry, DailyPoint, MonthlyComparison},
    html::HeadElement,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

pub(super) fn expense_breakdown_chart(breakdown: &[CategoryBreakdownEntry]) -> Chart {
    let labels: Vec<String> = breakdown
        .iter()
        .map(|entry| format!("{} {}", entry.icon, entry.title))
        .collect();
    let data: Vec<(f64, &str)> = breakdown
        .iter()
        .zip(&labels)
        .map(|(entry, label)| (entry.total, label.as_str()))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Expenses by category")
                .subtext("Top five categories in the selected period"),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("0%"))
        .series(
            Pie::new()
                .name("Expenses")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

pub(super) fn daily_trend_chart(series: &[DailyPoint]) -> Chart {
    let labels: Vec<String> = series.iter().map(|point| point.date.to_string()).collect();
    let income: Vec<f64> = series.iter().map(|point| point.income).collect();
    let expense: Vec<f64> = series.iter().map(|point| point.expense).collect();
    let net: Vec<f64> = series.iter().map(|point| point.net).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Daily trend")
                .subtext("Income, expense and net per day"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("8%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Income").smooth(0.5).data(income))
        .series(Line::new().name("Expense").smooth(0.5).data(expense))
        .series(Line::new().name("Net").smooth(0.5).data(net))
}

pub(super) fn monthly_comparison_chart(comparison: &MonthlyComparison) -> Chart {
    Chart::new()
        .title(
            Title::new()
                .text("Monthly comparison")
                .subtext("This calendar month vs the previous one"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("8%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(vec!["Previous Month", "Current Month"]),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            Bar::new()
                .name("Income")
                .data(vec![comparison.previous_income, comparison.current_income]),
        )
        .series(
            Bar::new()
                .name("Expense")
                .data(vec![comparison.previous_expense, comparison.current_expense]),
        )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
