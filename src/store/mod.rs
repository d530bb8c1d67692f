//! Storage abstraction for the catalog.
//!
//! The [`Store`] trait covers the two relational concerns of the service:
//! resolving category names to stable identifiers, and persisting and
//! querying items. Callers only ever see the joined category name on an
//! [`Item`], never the category identifier.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`resolve_category`](Store::resolve_category) | Get-or-create a category id by exact name |
//! | [`insert_item`](Store::insert_item) | Resolve the category and insert the item atomically |
//! | [`list_items`](Store::list_items) | All items, oldest first (empty is fine) |
//! | [`get_item`](Store::get_item) | One item by identifier |
//! | [`search_items`](Store::search_items) | Items whose name contains a keyword (no match is an error) |
//! | [`list_categories`](Store::list_categories) | All categories, oldest first |
//! | [`list_items_by_category`](Store::list_items_by_category) | Items in one category |
//!
//! Two backends are provided: [`SqliteStore`] for the service and
//! [`MemoryStore`] for tests and embedding.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, Item, NewItem};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Return the identifier for `name`, creating the category if needed.
    ///
    /// Repeated calls with the same name return the same identifier and
    /// never create a second row, including under concurrent callers.
    async fn resolve_category(&self, name: &str) -> CatalogResult<i64>;

    /// Insert an item, creating its category on first reference.
    ///
    /// Category resolution and the item insert commit together; a failure
    /// leaves neither behind.
    async fn insert_item(&self, item: &NewItem) -> CatalogResult<Item>;

    async fn list_items(&self) -> CatalogResult<Vec<Item>>;

    /// Fails with `Invalid` for non-positive ids and `NotFound` when absent.
    async fn get_item(&self, id: i64) -> CatalogResult<Item>;

    /// Case-sensitive substring match on the item name.
    ///
    /// Unlike [`list_items`](Store::list_items), an empty result is reported
    /// as `NotFound`.
    async fn search_items(&self, keyword: &str) -> CatalogResult<Vec<Item>>;

    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    /// Items whose category name equals `name` exactly. An unknown or empty
    /// category is `NotFound`.
    async fn list_items_by_category(&self, name: &str) -> CatalogResult<Vec<Item>>;
}

pub(crate) fn check_category_name(name: &str) -> CatalogResult<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::invalid("category name must not be empty"));
    }
    Ok(())
}

pub(crate) fn check_keyword(keyword: &str) -> CatalogResult<()> {
    if keyword.trim().is_empty() {
        return Err(CatalogError::invalid("keyword must not be empty"));
    }
    Ok(())
}

pub(crate) fn check_item_id(id: i64) -> CatalogResult<()> {
    if id <= 0 {
        return Err(CatalogError::invalid(format!(
            "item_id must be a positive integer, got {}",
            id
        )));
    }
    Ok(())
}

pub(crate) fn no_match(keyword: &str) -> CatalogError {
    CatalogError::not_found(format!("no items match keyword '{}'", keyword))
}
