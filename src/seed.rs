//! Seed data: the default category set and demo transactions for manual
//! testing.

use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    category::{CategoryKind, get_all_categories},
    transaction::{Transaction, create_transaction},
};

/// The categories every fresh database starts with.
const DEFAULT_CATEGORIES: [(&str, &str, CategoryKind); 12] = [
    ("Salary", "💰", CategoryKind::Income),
    ("Freelance", "💻", CategoryKind::Income),
    ("Investment", "📈", CategoryKind::Income),
    ("Gift", "🎁", CategoryKind::Income),
    ("Other Income", "💵", CategoryKind::Income),
    ("Food & Dining", "🍔", CategoryKind::Expense),
    ("Transportation", "🚗", CategoryKind::Expense),
    ("Shopping", "🛒", CategoryKind::Expense),
    ("Entertainment", "🎬", CategoryKind::Expense),
    ("Bills & Utilities", "💡", CategoryKind::Expense),
    ("Healthcare", "🏥", CategoryKind::Expense),
    ("Other Expense", "💸", CategoryKind::Expense),
];

/// Insert the default categories into an empty category table.
///
/// Does nothing if the table already has rows, so re-running initialization
/// against an existing database leaves user edits alone.
pub fn seed_default_categories(connection: &Connection) -> Result<(), Error> {
    let category_count: i64 =
        connection.query_row("SELECT COUNT(id) FROM category;", [], |row| row.get(0))?;

    if category_count > 0 {
        return Ok(());
    }

    let mut statement =
        connection.prepare("INSERT INTO category (title, icon, kind) VALUES (?1, ?2, ?3);")?;

    for (title, icon, kind) in DEFAULT_CATEGORIES {
        statement.execute((title, icon, kind.as_str()))?;
    }

    Ok(())
}

/// Populate the database with three months of plausible transactions for
/// manual testing. Amounts and dates are deterministic so repeated demo
/// databases look the same.
pub fn seed_demo_transactions(connection: &Connection) -> Result<(), Error> {
    let categories = get_all_categories(connection)?;
    let category_id = |title: &str| {
        categories
            .iter()
            .find(|category| category.title.as_ref() == title)
            .map(|category| category.id)
            .ok_or_else(|| Error::NotFound)
    };

    let salary = category_id("Salary")?;
    let freelance = category_id("Freelance")?;
    let food = category_id("Food & Dining")?;
    let transport = category_id("Transportation")?;
    let shopping = category_id("Shopping")?;
    let entertainment = category_id("Entertainment")?;
    let bills = category_id("Bills & Utilities")?;

    let today = OffsetDateTime::now_utc().date();

    for month in 0..3 {
        let payday = today - Duration::days(month * 30 + 1);

        create_transaction(
            Transaction::build(4200.0, salary)
                .date(payday)
                .note("Monthly salary"),
            connection,
        )?;
        create_transaction(
            Transaction::build(1850.0, bills)
                .date(payday)
                .note("Rent and utilities"),
            connection,
        )?;
    }

    create_transaction(
        Transaction::build(650.0, freelance)
            .date(today - Duration::days(12))
            .note("Website touch-ups for a client"),
        connection,
    )?;

    for week in 0..12 {
        let day = today - Duration::days(week * 7 + 2);
        // Vary the spend a little from week to week.
        let groceries = 85.0 + (week % 4) as f64 * 12.5;

        create_transaction(
            Transaction::build(groceries, food)
                .date(day)
                .note("Weekly groceries"),
            connection,
        )?;
        create_transaction(
            Transaction::build(32.4, transport).date(day),
            connection,
        )?;
    }

    create_transaction(
        Transaction::build(129.99, shopping)
            .date(today - Duration::days(5))
            .note("New running shoes"),
        connection,
    )?;
    create_transaction(
        Transaction::build(24.0, entertainment)
            .date(today - Duration::days(3))
            .note("Cinema tickets"),
        connection,
    )?;

    Ok(())
}
