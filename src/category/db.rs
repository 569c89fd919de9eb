//! Database operations for categories.

use rusqlite::{Connection, Row, types::Type};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryKind, CategoryTitle},
    transaction::SortOrder,
};

use std::str::FromStr;

/// Create a category and return it with its generated ID.
pub fn create_category(
    title: CategoryTitle,
    icon: &str,
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Category, Error> {
    let icon = super::domain::normalize_icon(icon);

    connection.execute(
        "INSERT INTO category (title, icon, kind) VALUES (?1, ?2, ?3);",
        (title.as_ref(), &icon, kind.as_str()),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        title,
        icon,
        kind,
    })
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, title, icon, kind FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories, income first, then alphabetically by title.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, title, icon, kind FROM category ORDER BY kind DESC, title ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the categories of one kind, ordered alphabetically by title.
pub fn get_categories_by_kind(
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, title, icon, kind FROM category WHERE kind = :kind ORDER BY title ASC;")?
        .query_map(&[(":kind", &kind.as_str())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// The column to sort the category listing by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySortKey {
    /// Sort alphabetically by title.
    Title,
    /// Sort by kind, then alphabetically by title.
    Kind,
}

/// A category together with the number of transactions recorded against it.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryListingRow {
    pub category: Category,
    pub transaction_count: u64,
}

/// A page of the category listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryListing {
    pub rows: Vec<CategoryListingRow>,
    /// The number of categories matching the search, across all pages.
    pub total_count: u64,
}

/// Retrieve one page of categories with their transaction counts.
///
/// `search_term` matches substrings of the title, icon or kind.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_category_listing(
    search_term: Option<&str>,
    sort_key: CategorySortKey,
    sort_order: SortOrder,
    page: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<CategoryListing, Error> {
    let search_pattern = search_term
        .map(|term| format!("%{}%", term.trim()))
        .unwrap_or_else(|| "%".to_string());

    // SQLite counts come back as i64, rusqlite has no u64 FromSql impl.
    let total_count = connection.query_row(
        "SELECT COUNT(id) FROM category \
        WHERE title LIKE :search OR icon LIKE :search OR kind LIKE :search;",
        &[(":search", &search_pattern)],
        |row| row.get::<_, i64>(0),
    )? as u64;

    // The sort expression is chosen from fixed strings, never user input.
    let order_clause = match (sort_key, sort_order) {
        (CategorySortKey::Title, SortOrder::Ascending) => "ORDER BY title ASC",
        (CategorySortKey::Title, SortOrder::Descending) => "ORDER BY title DESC",
        (CategorySortKey::Kind, SortOrder::Ascending) => "ORDER BY kind ASC, title ASC",
        (CategorySortKey::Kind, SortOrder::Descending) => "ORDER BY kind DESC, title ASC",
    };

    let query = format!(
        "SELECT category.id, category.title, category.icon, category.kind, \
        COUNT(\"transaction\".id) \
        FROM category \
        LEFT JOIN \"transaction\" ON \"transaction\".category_id = category.id \
        WHERE category.title LIKE :search OR category.icon LIKE :search OR category.kind LIKE :search \
        GROUP BY category.id \
        {order_clause} \
        LIMIT :limit OFFSET :offset;"
    );

    let offset = (page.saturating_sub(1) * page_size) as i64;
    let limit = page_size as i64;

    let rows = connection
        .prepare(&query)?
        .query_map(
            rusqlite::named_params! {
                ":search": search_pattern,
                ":limit": limit,
                ":offset": offset,
            },
            |row| {
                let category = map_row(row)?;
                let transaction_count = row.get::<_, i64>(4)? as u64;

                Ok(CategoryListingRow {
                    category,
                    transaction_count,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CategoryListing { rows, total_count })
}

/// Count the transactions recorded against a category.
pub fn count_transactions_for_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE category_id = :category_id;",
            &[(":category_id", &category_id)],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count as usize)
        .map_err(|error| error.into())
}

/// Update a category's title, icon and kind. Returns an error if the category doesn't exist.
pub fn update_category(
    category_id: CategoryId,
    title: CategoryTitle,
    icon: &str,
    kind: CategoryKind,
    connection: &Connection,
) -> Result<(), Error> {
    let icon = super::domain::normalize_icon(icon);

    let rows_affected = connection.execute(
        "UPDATE category SET title = ?1, icon = ?2, kind = ?3 WHERE id = ?4",
        (title.as_ref(), &icon, kind.as_str(), category_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category by ID.
///
/// # Errors
/// Returns [Error::CategoryInUse] if transactions still reference the
/// category, or [Error::DeleteMissingCategory] if it doesn't exist.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let transaction_count = count_transactions_for_category(category_id, connection)?;

    if transaction_count > 0 {
        return Err(Error::CategoryInUse(transaction_count));
    }

    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            icon TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('Income', 'Expense'))
        );

        CREATE INDEX IF NOT EXISTS idx_category_kind ON category(kind);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_title: String = row.get(1)?;
    let title = CategoryTitle::new_unchecked(&raw_title);
    let icon = row.get(2)?;
    let raw_kind: String = row.get(3)?;
    let kind = CategoryKind::from_str(&raw_kind)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error)))?;

    Ok(Category {
        id,
        title,
        icon,
        kind,
    })
}


#[cfg(test)]
mod category_listing_tests {
    use rusqlite::Connection;

    use crate::{
        category::db::{CategorySortKey, get_category_listing},
        db::initialize,
        transaction::SortOrder,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn lists_all_seeded_categories() {
        let conn = get_test_connection();

        let listing = get_category_listing(
            None,
            CategorySortKey::Title,
            SortOrder::Ascending,
            1,
            50,
            &conn,
        )
        .unwrap();

        assert_eq!(listing.total_count, 12);
        assert_eq!(listing.rows.len(), 12);
        assert!(listing.rows.iter().all(|row| row.transaction_count == 0));
    }

    #[test]
    fn search_restricts_results() {
        let conn = get_test_connection();

        let listing = get_category_listing(
            Some("Salary"),
            CategorySortKey::Title,
            SortOrder::Ascending,
            1,
            50,
            &conn,
        )
        .unwrap();

        assert_eq!(listing.total_count, 1);
        assert_eq!(listing.rows[0].category.title.as_ref(), "Salary");
    }

    #[test]
    fn search_matches_kind() {
        let conn = get_test_connection();

        let listing = get_category_listing(
            Some("Income"),
            CategorySortKey::Title,
            SortOrder::Ascending,
            1,
            50,
            &conn,
        )
        .unwrap();

        // 5 income categories plus "Other Income" matching by title.
        assert_eq!(listing.total_count, 5);
    }

    #[test]
    fn pagination_returns_requested_page() {
        let conn = get_test_connection();

        let page_one = get_category_listing(
            None,
            CategorySortKey::Title,
            SortOrder::Ascending,
            1,
            5,
            &conn,
        )
        .unwrap();
        let page_three = get_category_listing(
            None,
            CategorySortKey::Title,
            SortOrder::Ascending,
            3,
            5,
            &conn,
        )
        .unwrap();

        assert_eq!(page_one.rows.len(), 5);
        assert_eq!(page_one.total_count, 12);
        // 12 categories at 5 per page leaves 2 on the last page.
        assert_eq!(page_three.rows.len(), 2);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let conn = get_test_connection();

        let listing = get_category_listing(
            None,
            CategorySortKey::Title,
            SortOrder::Ascending,
            10,
            5,
            &conn,
        )
        .unwrap();

        assert_eq!(listing.total_count, 12);
        assert!(listing.rows.is_empty());
    }

    #[test]
    fn sorts_descending_by_title() {
        let conn = get_test_connection();

        let listing = get_category_listing(
            None,
            CategorySortKey::Title,
            SortOrder::Descending,
            1,
            50,
            &conn,
        )
        .unwrap();

        let titles: Vec<&str> = listing
            .rows
            .iter()
            .map(|row| row.category.title.as_ref())
            .collect();
        let mut sorted = titles.clone();
        sorted.sort();
        sorted.reverse();
        assert_eq!(titles, sorted);
    }
}
