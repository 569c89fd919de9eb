//! Filtered, sorted and windowed queries over the transaction table.

use rusqlite::{Connection, Row, types::ToSql};
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    category::{CategoryId, CategoryKind},
    transaction::Transaction,
};

/// The direction to sort transactions or categories in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Sort from smallest to largest (oldest to newest for dates).
    Ascending,
    /// Sort from largest to smallest (newest to oldest for dates).
    #[default]
    Descending,
}

/// The transaction column to sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionSortKey {
    /// Sort by the transaction date.
    #[default]
    Date,
    /// Sort by the transaction amount.
    Amount,
    /// Sort by the transaction note.
    Note,
}

/// The criteria a transaction must match to be included in a listing.
///
/// All fields are optional, an empty filter matches every transaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionFilter {
    /// A case-insensitive substring to look for in the transaction note.
    pub search: Option<String>,
    /// Only include transactions recorded against this category.
    pub category_id: Option<CategoryId>,
    /// Only include transactions whose category has this kind.
    pub kind: Option<CategoryKind>,
    /// Only include transactions on or after this date.
    pub start_date: Option<Date>,
    /// Only include transactions on or before this date.
    pub end_date: Option<Date>,
    /// Only include transactions with at least this amount.
    pub min_amount: Option<f64>,
    /// Only include transactions with at most this amount.
    pub max_amount: Option<f64>,
}

/// A transaction joined with the category it is recorded against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The title of the transaction's category.
    pub category_title: String,
    /// The icon of the transaction's category.
    pub category_icon: String,
    /// Whether the transaction's category is an income or expense category.
    pub category_kind: CategoryKind,
}

/// Builds the WHERE clause and parameter list shared by the count and listing
/// queries.
fn build_where_clause(filter: &TransactionFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut parameters: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(search) = &filter.search {
        clauses.push("t.note LIKE '%' || ? || '%'");
        parameters.push(Box::new(search.clone()));
    }

    if let Some(category_id) = filter.category_id {
        clauses.push("t.category_id = ?");
        parameters.push(Box::new(category_id));
    }

    if let Some(kind) = filter.kind {
        clauses.push("c.kind = ?");
        parameters.push(Box::new(kind.as_str()));
    }

    if let Some(start_date) = filter.start_date {
        clauses.push("t.date >= ?");
        parameters.push(Box::new(start_date));
    }

    if let Some(end_date) = filter.end_date {
        clauses.push("t.date <= ?");
        parameters.push(Box::new(end_date));
    }

    if let Some(min_amount) = filter.min_amount {
        clauses.push("t.amount >= ?");
        parameters.push(Box::new(min_amount));
    }

    if let Some(max_amount) = filter.max_amount {
        clauses.push("t.amount <= ?");
        parameters.push(Box::new(max_amount));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    (where_clause, parameters)
}

// The ORDER BY expression comes from a fixed set of strings, user input never
// reaches the SQL text. Ties always break on the newest row first so rows
// created in the same instant keep a stable order in either direction.
fn order_by_clause(sort_key: TransactionSortKey, sort_order: SortOrder) -> &'static str {
    match (sort_key, sort_order) {
        (TransactionSortKey::Date, SortOrder::Ascending) => "t.date ASC, t.id DESC",
        (TransactionSortKey::Date, SortOrder::Descending) => "t.date DESC, t.id DESC",
        (TransactionSortKey::Amount, SortOrder::Ascending) => "t.amount ASC, t.id DESC",
        (TransactionSortKey::Amount, SortOrder::Descending) => "t.amount DESC, t.id DESC",
        (TransactionSortKey::Note, SortOrder::Ascending) => "t.note ASC, t.id DESC",
        (TransactionSortKey::Note, SortOrder::Descending) => "t.note DESC, t.id DESC",
    }
}

/// Count the transactions matching `filter`.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an unexpected SQL error.
pub fn count_matching_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<u64, Error> {
    let (where_clause, parameters) = build_where_clause(filter);

    let sql = format!(
        "SELECT COUNT(t.id)
        FROM \"transaction\" t
        INNER JOIN category c ON c.id = t.category_id
        {where_clause}"
    );

    // SQLite counts come back as i64, rusqlite has no u64 FromSql impl.
    connection
        .prepare(&sql)?
        .query_row(rusqlite::params_from_iter(parameters.iter()), |row| {
            row.get::<_, i64>(0)
        })
        .map(|count| count as u64)
        .map_err(|error| error.into())
}

/// Retrieve one page of the transactions matching `filter`, joined with their
/// categories.
///
/// `page` starts at one. Pages beyond the last page yield an empty list.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an unexpected SQL error.
pub fn get_transaction_page(
    filter: &TransactionFilter,
    sort_key: TransactionSortKey,
    sort_order: SortOrder,
    page: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<Vec<TransactionRow>, Error> {
    let (where_clause, mut parameters) = build_where_clause(filter);
    let order_by = order_by_clause(sort_key, sort_order);

    let offset = page.saturating_sub(1) * page_size;
    parameters.push(Box::new(page_size as i64));
    parameters.push(Box::new(offset as i64));

    let sql = format!(
        "SELECT t.id, t.amount, t.date, t.note, t.category_id,
            c.title AS category_title, c.icon AS category_icon, c.kind AS category_kind
        FROM \"transaction\" t
        INNER JOIN category c ON c.id = t.category_id
        {where_clause}
        ORDER BY {order_by}
        LIMIT ? OFFSET ?"
    );

    connection
        .prepare(&sql)?
        .query_map(rusqlite::params_from_iter(parameters.iter()), map_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Retrieve all transactions matching `filter` without pagination, joined
/// with their categories. Used by the export endpoints.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an unexpected SQL error.
pub fn get_matching_transactions(
    filter: &TransactionFilter,
    sort_key: TransactionSortKey,
    sort_order: SortOrder,
    connection: &Connection,
) -> Result<Vec<TransactionRow>, Error> {
    let (where_clause, parameters) = build_where_clause(filter);
    let order_by = order_by_clause(sort_key, sort_order);

    let sql = format!(
        "SELECT t.id, t.amount, t.date, t.note, t.category_id,
            c.title AS category_title, c.icon AS category_icon, c.kind AS category_kind
        FROM \"transaction\" t
        INNER JOIN category c ON c.id = t.category_id
        {where_clause}
        ORDER BY {order_by}"
    );

    connection
        .prepare(&sql)?
        .query_map(rusqlite::params_from_iter(parameters.iter()), map_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

fn map_row(row: &Row) -> Result<TransactionRow, rusqlite::Error> {
    use std::str::FromStr;

    let raw_kind: String = row.get("category_kind")?;
    let category_kind = CategoryKind::from_str(&raw_kind).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            row.as_ref().column_index("category_kind").unwrap_or(0),
            rusqlite::types::Type::Text,
            format!("invalid category kind {raw_kind}").into(),
        )
    })?;

    Ok(TransactionRow {
        transaction: super::core::map_transaction_row(row)?,
        category_title: row.get("category_title")?,
        category_icon: row.get("category_icon")?,
        category_kind,
    })
}
