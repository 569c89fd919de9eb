//! Database initialization.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, category::create_category_table, seed::seed_default_categories,
    transaction::create_transaction_table,
};

/// Create the application tables and seed the default categories.
///
/// All tables are created inside a single exclusive transaction so a
/// partially initialized database is never left behind. Foreign keys are
/// enabled on the connection, which SQLite requires per connection.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}
