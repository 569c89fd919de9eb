//! Transaction management for the expenses tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and its builder for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - View handlers for listing, creating, and editing transactions
//! - JSON endpoints for quick-add and bulk deletion

mod bulk_delete;
mod core;
mod create;
mod delete;
mod edit;
mod query;
mod quick_add;
mod transactions_page;

pub use bulk_delete::bulk_delete_transactions_endpoint;
pub use core::{
    Transaction, count_transactions, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, update_transaction,
};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use query::{
    SortOrder, TransactionFilter, TransactionRow, TransactionSortKey, count_matching_transactions,
    get_matching_transactions, get_transaction_page,
};
pub use quick_add::quick_add_transaction_endpoint;
pub use transactions_page::{TransactionsQuery, get_transactions_page};
