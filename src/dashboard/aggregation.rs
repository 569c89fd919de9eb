//! Pure aggregation functions over transactions joined with their categories.
//!
//! The handlers fetch the rows for a period and these functions turn them
//! into the numbers the dashboard displays. Keeping them free of database
//! access makes them easy to test.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use serde::Serialize;
use time::{Date, Duration};

use crate::{category::CategoryKind, transaction::TransactionRow};

/// How many rows a category breakdown table shows at most.
const BREAKDOWN_ROW_LIMIT: usize = 5;

/// How many transactions the recent list shows.
const RECENT_TRANSACTION_LIMIT: usize = 5;

/// Headline totals for a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(super) struct FinancialSummary {
    pub total_income: f64,
    pub total_expense: f64,
    /// Income minus expense.
    pub balance: f64,
    pub transaction_count: usize,
    pub income_count: usize,
    pub expense_count: usize,
    /// Total expense divided by the number of days in the period.
    pub average_daily_expense: f64,
    pub largest_expense: f64,
    pub largest_income: f64,
}

/// One row of a per-category totals table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(super) struct CategoryBreakdownEntry {
    pub title: String,
    pub icon: String,
    pub total: f64,
    /// This category's share of the kind's total, in percent.
    pub percentage: f64,
}

/// One day of the trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(super) struct DailyPoint {
    pub date: Date,
    pub income: f64,
    pub expense: f64,
    /// Income minus expense for the day.
    pub net: f64,
}

/// Income and expense for the current calendar month against the previous
/// one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(super) struct MonthlyComparison {
    pub current_income: f64,
    pub current_expense: f64,
    pub previous_income: f64,
    pub previous_expense: f64,
}

pub(super) fn financial_summary(
    rows: &[TransactionRow],
    date_range: &RangeInclusive<Date>,
) -> FinancialSummary {
    let mut total_income = 0.0;
    let mut total_expense = 0.0;
    let mut income_count = 0;
    let mut expense_count = 0;
    let mut largest_income = 0.0_f64;
    let mut largest_expense = 0.0_f64;

    for row in rows {
        match row.category_kind {
            CategoryKind::Income => {
                total_income += row.transaction.amount;
                income_count += 1;
                largest_income = largest_income.max(row.transaction.amount);
            }
            CategoryKind::Expense => {
                total_expense += row.transaction.amount;
                expense_count += 1;
                largest_expense = largest_expense.max(row.transaction.amount);
            }
        }
    }

    let days_in_period = ((*date_range.end() - *date_range.start()).whole_days() + 1).max(1);

    FinancialSummary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        transaction_count: rows.len(),
        income_count,
        expense_count,
        average_daily_expense: total_expense / days_in_period as f64,
        largest_expense,
        largest_income,
    }
}

/// Per-category totals for one kind, sorted descending and capped at
/// [BREAKDOWN_ROW_LIMIT] rows. Percentages are relative to the kind's total
/// over all categories, not just the listed ones.
pub(super) fn category_breakdown(
    rows: &[TransactionRow],
    kind: CategoryKind,
) -> Vec<CategoryBreakdownEntry> {
    let mut totals: HashMap<(&str, &str), f64> = HashMap::new();
    let mut kind_total = 0.0;

    for row in rows.iter().filter(|row| row.category_kind == kind) {
        *totals
            .entry((row.category_title.as_str(), row.category_icon.as_str()))
            .or_insert(0.0) += row.transaction.amount;
        kind_total += row.transaction.amount;
    }

    let mut entries: Vec<CategoryBreakdownEntry> = totals
        .into_iter()
        .map(|((title, icon), total)| CategoryBreakdownEntry {
            title: title.to_owned(),
            icon: icon.to_owned(),
            total,
            percentage: if kind_total > 0.0 {
                total / kind_total * 100.0
            } else {
                0.0
            },
        })
        .collect();

    entries.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.title.cmp(&b.title)));
    entries.truncate(BREAKDOWN_ROW_LIMIT);

    entries
}

/// The per-day income/expense/net series over the whole period. Days with no
/// transactions appear with zeros so the series is dense.
pub(super) fn daily_series(
    rows: &[TransactionRow],
    date_range: &RangeInclusive<Date>,
) -> Vec<DailyPoint> {
    let mut totals: HashMap<Date, (f64, f64)> = HashMap::new();

    for row in rows {
        let entry = totals.entry(row.transaction.date).or_insert((0.0, 0.0));
        match row.category_kind {
            CategoryKind::Income => entry.0 += row.transaction.amount,
            CategoryKind::Expense => entry.1 += row.transaction.amount,
        }
    }

    let mut series = Vec::new();
    let mut date = *date_range.start();

    while date <= *date_range.end() {
        let (income, expense) = totals.get(&date).copied().unwrap_or((0.0, 0.0));
        series.push(DailyPoint {
            date,
            income,
            expense,
            net: income - expense,
        });

        date += Duration::days(1);
    }

    series
}

pub(super) fn monthly_comparison(
    current_month_rows: &[TransactionRow],
    previous_month_rows: &[TransactionRow],
) -> MonthlyComparison {
    let totals = |rows: &[TransactionRow]| {
        rows.iter().fold((0.0, 0.0), |(income, expense), row| {
            match row.category_kind {
                CategoryKind::Income => (income + row.transaction.amount, expense),
                CategoryKind::Expense => (income, expense + row.transaction.amount),
            }
        })
    };

    let (current_income, current_expense) = totals(current_month_rows);
    let (previous_income, previous_expense) = totals(previous_month_rows);

    MonthlyComparison {
        current_income,
        current_expense,
        previous_income,
        previous_expense,
    }
}

/// The latest transactions for the recent list. Expects `rows` sorted by
/// date descending, id descending, as the listing query returns them.
pub(super) fn recent_transactions(rows: &[TransactionRow]) -> Vec<TransactionRow> {
    rows.iter().take(RECENT_TRANSACTION_LIMIT).cloned().collect()
}
