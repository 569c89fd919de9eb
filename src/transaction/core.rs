//! The transaction model and the database functions for single transactions.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{Error, category::CategoryId, database_id::DatabaseID};

/// The maximum number of characters allowed in a transaction note.
pub const MAX_NOTE_LENGTH: usize = 500;

/// An amount of money spent or earned, recorded against a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseID,
    /// The amount of money, always greater than zero. Whether the money was
    /// spent or earned is decided by the kind of the category.
    pub amount: f64,
    /// When the transaction happened, with day granularity.
    pub date: Date,
    /// An optional note describing the transaction.
    pub note: Option<String>,
    /// The ID of the category the transaction is recorded against.
    pub category_id: CategoryId,
}

impl Transaction {
    /// Start building a transaction for `amount` against `category_id`.
    ///
    /// The date defaults to today (UTC) and the note to nothing.
    pub fn build(amount: f64, category_id: CategoryId) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            category_id,
            date: None,
            note: None,
        }
    }
}

/// Collects the fields for a new transaction before it is validated and
/// inserted by [create_transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    amount: f64,
    category_id: CategoryId,
    date: Option<Date>,
    note: Option<String>,
}

impl TransactionBuilder {
    /// Set the date of the transaction.
    pub fn date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the note of the transaction.
    pub fn note(mut self, note: &str) -> Self {
        self.note = Some(note.to_owned());
        self
    }
}

/// Validate and insert a new transaction into the database.
///
/// The amount is rounded to two decimal places and must be greater than zero
/// after rounding. The note is trimmed, and a blank note is stored as NULL.
///
/// # Errors
/// Returns a [Error::NonPositiveAmount] if `amount` rounds to zero or less.
///
/// Returns a [Error::NoteTooLong] if the note has more than [MAX_NOTE_LENGTH]
/// characters.
///
/// Returns a [Error::InvalidCategory] if the category ID does not refer to a
/// category in the database.
///
/// Returns a [Error::SqlError] if there is an unexpected SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let amount = (builder.amount * 100.0).round() / 100.0;

    if amount <= 0.0 {
        return Err(Error::NonPositiveAmount(builder.amount));
    }

    let note = match builder.note.as_deref().map(str::trim) {
        Some("") | None => None,
        Some(note) if note.chars().count() > MAX_NOTE_LENGTH => {
            return Err(Error::NoteTooLong(MAX_NOTE_LENGTH));
        }
        Some(note) => Some(note.to_owned()),
    };

    let date = builder
        .date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());

    connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, date, note, category_id)
            VALUES (:amount, :date, :note, :category_id)
            RETURNING id, amount, date, note, category_id",
        )?
        .query_row(
            rusqlite::named_params! {
                ":amount": amount,
                ":date": date,
                ":note": note,
                ":category_id": builder.category_id,
            },
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(builder.category_id),
            error => error.into(),
        })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// Returns a [Error::NotFound] if `id` does not refer to a valid transaction.
///
/// Returns a [Error::SqlError] if there is an unexpected SQL error.
pub fn get_transaction(id: DatabaseID, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, amount, date, note, category_id FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Overwrite the transaction with the ID `transaction.id` in the database.
///
/// The same validation as [create_transaction] applies to the amount and note.
///
/// # Errors
/// Returns a [Error::UpdateMissingTransaction] if the transaction is not in
/// the database.
///
/// Returns a [Error::InvalidCategory] if the category ID does not refer to a
/// category in the database.
///
/// Returns a [Error::SqlError] if there is an unexpected SQL error.
pub fn update_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    let amount = (transaction.amount * 100.0).round() / 100.0;

    if amount <= 0.0 {
        return Err(Error::NonPositiveAmount(transaction.amount));
    }

    let note = match transaction.note.as_deref().map(str::trim) {
        Some("") | None => None,
        Some(note) if note.chars().count() > MAX_NOTE_LENGTH => {
            return Err(Error::NoteTooLong(MAX_NOTE_LENGTH));
        }
        Some(note) => Some(note.to_owned()),
    };

    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\"
            SET amount = :amount, date = :date, note = :note, category_id = :category_id
            WHERE id = :id",
            rusqlite::named_params! {
                ":amount": amount,
                ":date": transaction.date,
                ":note": note,
                ":category_id": transaction.category_id,
                ":id": transaction.id,
            },
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(transaction.category_id),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        Err(Error::UpdateMissingTransaction)
    } else {
        Ok(())
    }
}

/// Delete the transaction with the given `id` from the database.
///
/// # Errors
/// Returns a [Error::DeleteMissingTransaction] if the transaction is not in
/// the database.
///
/// Returns a [Error::SqlError] if there is an unexpected SQL error.
pub fn delete_transaction(id: DatabaseID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = :id", &[(
        ":id", &id,
    )])?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingTransaction)
    } else {
        Ok(())
    }
}

/// Count all transactions in the database.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an unexpected SQL error.
pub fn count_transactions(connection: &Connection) -> Result<usize, Error> {
    connection
        .prepare("SELECT COUNT(id) FROM \"transaction\"")?
        .query_row([], |row| row.get::<_, i64>(0))
        .map(|count| count as usize)
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an unexpected SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            note TEXT,
            category_id INTEGER NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id)
                ON UPDATE CASCADE ON DELETE RESTRICT
        );
        CREATE INDEX IF NOT EXISTS idx_transaction_date_category
            ON \"transaction\" (date, category_id);",
    )?;

    Ok(())
}

pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get("id")?,
        amount: row.get("amount")?,
        date: row.get("date")?,
        note: row.get("note")?,
        category_id: row.get("category_id")?,
    })
}

#[cfg(test)]
mod transaction_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::{Category, CategoryKind, CategoryTitle, create_category},
        db::initialize,
        transaction::{
            Transaction, count_transactions, create_transaction, delete_transaction,
            get_transaction, update_transaction,
        },
    };

    fn get_test_connection() -> (Connection, Category) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        let category = create_category(
            CategoryTitle::new_unchecked("Test Category"),
            "🧪",
            CategoryKind::Expense,
            &connection,
        )
        .expect("Could not create test category");

        (connection, category)
    }

    #[test]
    fn create_transaction_succeeds() {
        let (connection, category) = get_test_connection();

        let transaction = create_transaction(
            Transaction::build(12.5, category.id)
                .date(date!(2025 - 03 - 14))
                .note("Lunch"),
            &connection,
        )
        .expect("Could not create transaction");

        assert_eq!(transaction.amount, 12.5);
        assert_eq!(transaction.date, date!(2025 - 03 - 14));
        assert_eq!(transaction.note.as_deref(), Some("Lunch"));
        assert_eq!(transaction.category_id, category.id);
    }

    #[test]
    fn create_transaction_rounds_amount_to_cents() {
        let (connection, category) = get_test_connection();

        let transaction =
            create_transaction(Transaction::build(9.999, category.id), &connection)
                .expect("Could not create transaction");

        assert_eq!(transaction.amount, 10.0);
    }

    #[test]
    fn create_transaction_fails_on_non_positive_amount() {
        let (connection, category) = get_test_connection();

        for amount in [0.0, -1.0, -100.50] {
            let result = create_transaction(Transaction::build(amount, category.id), &connection);

            assert_eq!(result, Err(Error::NonPositiveAmount(amount)));
        }
    }

    #[test]
    fn create_transaction_fails_on_over_long_note() {
        let (connection, category) = get_test_connection();
        let note = "x".repeat(501);

        let result = create_transaction(
            Transaction::build(1.0, category.id).note(&note),
            &connection,
        );

        assert_eq!(result, Err(Error::NoteTooLong(500)));
    }

    #[test]
    fn create_transaction_stores_blank_note_as_none() {
        let (connection, category) = get_test_connection();

        let transaction = create_transaction(
            Transaction::build(1.0, category.id).note("   "),
            &connection,
        )
        .expect("Could not create transaction");

        assert_eq!(transaction.note, None);
    }

    #[test]
    fn create_transaction_fails_on_invalid_category() {
        let (connection, _) = get_test_connection();
        let invalid_category_id = 999999;

        let result = create_transaction(
            Transaction::build(1.0, invalid_category_id),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidCategory(invalid_category_id)));
    }

    #[test]
    fn get_transaction_succeeds() {
        let (connection, category) = get_test_connection();
        let inserted = create_transaction(
            Transaction::build(42.0, category.id).note("Board games"),
            &connection,
        )
        .expect("Could not create transaction");

        let selected = get_transaction(inserted.id, &connection);

        assert_eq!(Ok(inserted), selected);
    }

    #[test]
    fn get_transaction_fails_on_invalid_id() {
        let (connection, category) = get_test_connection();
        let inserted = create_transaction(Transaction::build(1.0, category.id), &connection)
            .expect("Could not create transaction");

        let selected = get_transaction(inserted.id + 123, &connection);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn update_transaction_succeeds() {
        let (connection, category) = get_test_connection();
        let inserted = create_transaction(Transaction::build(1.0, category.id), &connection)
            .expect("Could not create transaction");

        let updated = Transaction {
            amount: 2.5,
            note: Some("Updated note".to_owned()),
            ..inserted
        };

        update_transaction(&updated, &connection).expect("Could not update transaction");

        let selected = get_transaction(inserted.id, &connection).unwrap();
        assert_eq!(selected.amount, 2.5);
        assert_eq!(selected.note.as_deref(), Some("Updated note"));
    }

    #[test]
    fn update_transaction_fails_on_missing_transaction() {
        let (connection, category) = get_test_connection();

        let transaction = Transaction {
            id: 999999,
            amount: 1.0,
            date: date!(2025 - 01 - 01),
            note: None,
            category_id: category.id,
        };

        let result = update_transaction(&transaction, &connection);

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_transaction_succeeds() {
        let (connection, category) = get_test_connection();
        let inserted = create_transaction(Transaction::build(1.0, category.id), &connection)
            .expect("Could not create transaction");

        delete_transaction(inserted.id, &connection).expect("Could not delete transaction");

        assert_eq!(get_transaction(inserted.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_transaction_fails_on_missing_transaction() {
        let (connection, _) = get_test_connection();

        let result = delete_transaction(999999, &connection);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn count_transactions_counts_all_rows() {
        let (connection, category) = get_test_connection();

        for amount in [1.0, 2.0, 3.0] {
            create_transaction(Transaction::build(amount, category.id), &connection)
                .expect("Could not create transaction");
        }

        assert_eq!(count_transactions(&connection), Ok(3));
    }
}
