//! Card and table views for dashboard data display.

use maud::{Markup, html};

use crate::{
    category::CategoryKind,
    dashboard::aggregation::{CategoryBreakdownEntry, FinancialSummary},
    html::{
        CATEGORY_BADGE_STYLE, TABLE_CELL_STYLE, TABLE_ROW_STYLE, currency_rounded_with_tooltip,
        format_currency,
    },
    transaction::TransactionRow,
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";
const CARD_LABEL_STYLE: &str = "text-sm text-gray-600 dark:text-gray-400";
const AMOUNT_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const AMOUNT_RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// Renders the headline totals as a row of cards.
pub(super) fn summary_cards_view(summary: &FinancialSummary) -> Markup {
    let balance_style = if summary.balance >= 0.0 {
        AMOUNT_GREEN_STYLE
    } else {
        AMOUNT_RED_STYLE
    };

    html! {
        section class="w-full mx-auto mb-4" {
            div class="grid grid-cols-1 sm:grid-cols-2 xl:grid-cols-4 gap-4" {
                div class=(CARD_STYLE) {
                    p class=(CARD_LABEL_STYLE) { "Income" }
                    p class={ "text-2xl font-semibold tabular-nums " (AMOUNT_GREEN_STYLE) } {
                        (currency_rounded_with_tooltip(summary.total_income))
                    }
                    p class=(CARD_LABEL_STYLE) {
                        (summary.income_count) " transactions"
                    }
                }

                div class=(CARD_STYLE) {
                    p class=(CARD_LABEL_STYLE) { "Expenses" }
                    p class={ "text-2xl font-semibold tabular-nums " (AMOUNT_RED_STYLE) } {
                        (currency_rounded_with_tooltip(summary.total_expense))
                    }
                    p class=(CARD_LABEL_STYLE) {
                        (summary.expense_count) " transactions"
                    }
                }

                div class=(CARD_STYLE) {
                    p class=(CARD_LABEL_STYLE) { "Balance" }
                    p class={ "text-2xl font-semibold tabular-nums " (balance_style) } {
                        (currency_rounded_with_tooltip(summary.balance))
                    }
                    p class=(CARD_LABEL_STYLE) {
                        (summary.transaction_count) " transactions in total"
                    }
                }

                div class=(CARD_STYLE) {
                    p class=(CARD_LABEL_STYLE) { "Average daily spend" }
                    p class="text-2xl font-semibold tabular-nums" {
                        (format_currency(summary.average_daily_expense))
                    }
                    p class=(CARD_LABEL_STYLE) {
                        "Largest expense " (format_currency(summary.largest_expense))
                    }
                }
            }
        }
    }
}

/// Renders a per-category totals table for one kind.
pub(super) fn breakdown_table(kind: CategoryKind, entries: &[CategoryBreakdownEntry]) -> Markup {
    let heading = match kind {
        CategoryKind::Income => "Top income categories",
        CategoryKind::Expense => "Top expense categories",
    };

    html! {
        div {
            h3 class="text-xl font-semibold mb-4" { (heading) }

            @if entries.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400" {
                    "No transactions of this kind in the selected period."
                }
            } @else {
                div class="overflow-x-auto rounded-lg shadow" {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                        thead class="text-xs text-gray-900 uppercase bg-gray-100 dark:bg-gray-700 dark:text-gray-400" {
                            tr {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                            }
                        }
                        tbody {
                            @for entry in entries {
                                tr class=(TABLE_ROW_STYLE) {
                                    td class=(TABLE_CELL_STYLE) {
                                        span class=(CATEGORY_BADGE_STYLE) {
                                            (entry.icon) " " (entry.title)
                                        }
                                    }
                                    td class={(TABLE_CELL_STYLE) " tabular-nums"} {
                                        (format_currency(entry.total))
                                    }
                                    td class={(TABLE_CELL_STYLE) " tabular-nums"} {
                                        (format!("{:.1}%", entry.percentage))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the latest transactions as a small table.
pub(super) fn recent_transactions_table(recent: &[TransactionRow]) -> Markup {
    html! {
        div {
            h3 class="text-xl font-semibold mb-4" { "Recent transactions" }

            div class="overflow-x-auto rounded-lg shadow" {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class="text-xs text-gray-900 uppercase bg-gray-100 dark:bg-gray-700 dark:text-gray-400" {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        }
                    }
                    tbody {
                        @for row in recent {
                            tr class=(TABLE_ROW_STYLE) {
                                td class=(TABLE_CELL_STYLE) { (row.transaction.date) }
                                td class=(TABLE_CELL_STYLE) {
                                    span class=(CATEGORY_BADGE_STYLE) {
                                        (row.category_icon) " " (row.category_title)
                                    }
                                }
                                td class={(TABLE_CELL_STYLE) " tabular-nums"} {
                                    @match row.category_kind {
                                        CategoryKind::Income => {
                                            span class=(AMOUNT_GREEN_STYLE) {
                                                "+" (format_currency(row.transaction.amount))
                                            }
                                        }
                                        CategoryKind::Expense => {
                                            span class=(AMOUNT_RED_STYLE) {
                                                "-" (format_currency(row.transaction.amount))
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
