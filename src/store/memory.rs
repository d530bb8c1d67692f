//! In-memory [`Store`] implementation for tests and embedding.
//!
//! Mirrors the SQLite semantics exactly: identifiers start at 1 and are
//! assigned in insertion order, category names are unique and matched
//! case-sensitively, and keyword search is a literal substring test.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, Item, NewItem};

use super::{check_category_name, check_item_id, check_keyword, no_match, Store};

struct StoredItem {
    id: i64,
    name: String,
    category_id: i64,
    image_name: String,
}

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    items: Vec<StoredItem>,
}

impl Tables {
    fn upsert_category(&mut self, name: &str) -> i64 {
        if let Some(existing) = self.categories.iter().find(|c| c.name == name) {
            return existing.id;
        }
        let id = self.categories.len() as i64 + 1;
        self.categories.push(Category {
            id,
            name: name.to_string(),
        });
        id
    }

    fn category_name(&self, id: i64) -> CatalogResult<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
            .ok_or_else(|| CatalogError::not_found(format!("category {}", id)))
    }

    fn view(&self, stored: &StoredItem) -> CatalogResult<Item> {
        Ok(Item {
            id: stored.id,
            name: stored.name.clone(),
            category: self.category_name(stored.category_id)?.to_string(),
            image_name: stored.image_name.clone(),
        })
    }

    fn views<'a>(&self, items: impl Iterator<Item = &'a StoredItem>) -> CatalogResult<Vec<Item>> {
        items.map(|stored| self.view(stored)).collect()
    }
}

/// In-memory store guarded by a single lock, so every operation is atomic.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> CatalogError {
    CatalogError::Io(std::io::Error::other("memory store lock poisoned"))
}

#[async_trait]
impl Store for MemoryStore {
    async fn resolve_category(&self, name: &str) -> CatalogResult<i64> {
        check_category_name(name)?;
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        Ok(tables.upsert_category(name))
    }

    async fn insert_item(&self, item: &NewItem) -> CatalogResult<Item> {
        check_category_name(item.category())?;
        let mut tables = self.tables.write().map_err(|_| poisoned())?;

        let category_id = tables.upsert_category(item.category());
        let id = tables.items.len() as i64 + 1;
        tables.items.push(StoredItem {
            id,
            name: item.name().to_string(),
            category_id,
            image_name: item.image_name().to_string(),
        });

        Ok(Item {
            id,
            name: item.name().to_string(),
            category: item.category().to_string(),
            image_name: item.image_name().to_string(),
        })
    }

    async fn list_items(&self) -> CatalogResult<Vec<Item>> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        tables.views(tables.items.iter())
    }

    async fn get_item(&self, id: i64) -> CatalogResult<Item> {
        check_item_id(id)?;
        let tables = self.tables.read().map_err(|_| poisoned())?;
        match tables.items.iter().find(|i| i.id == id) {
            Some(stored) => tables.view(stored),
            None => Err(CatalogError::not_found(format!("item {}", id))),
        }
    }

    async fn search_items(&self, keyword: &str) -> CatalogResult<Vec<Item>> {
        check_keyword(keyword)?;
        let tables = self.tables.read().map_err(|_| poisoned())?;
        let found = tables.views(tables.items.iter().filter(|i| i.name.contains(keyword)))?;
        if found.is_empty() {
            return Err(no_match(keyword));
        }
        Ok(found)
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.categories.clone())
    }

    async fn list_items_by_category(&self, name: &str) -> CatalogResult<Vec<Item>> {
        check_category_name(name)?;
        let tables = self.tables.read().map_err(|_| poisoned())?;
        let category_id = tables
            .categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id);
        let found = match category_id {
            Some(id) => tables.views(tables.items.iter().filter(|i| i.category_id == id))?,
            None => Vec::new(),
        };
        if found.is_empty() {
            return Err(CatalogError::not_found(format!(
                "no items in category '{}'",
                name
            )));
        }
        Ok(found)
    }
}
