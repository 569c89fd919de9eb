//! Category management for classifying transactions as income or expenses.

mod api;
mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use api::get_categories_api;
pub use create::{create_category_endpoint, get_new_category_page};
pub use db::{
    CategoryListingRow, CategorySortKey, create_category, create_category_table,
    get_all_categories, get_categories_by_kind, get_category, update_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryId, CategoryKind, CategoryTitle};
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use list::get_categories_page;
