//! Core data models used throughout the catalog.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// An item as seen by callers: the category is the joined name, never the
/// numeric category identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub image_name: String,
}

/// Validated input for an item insertion.
///
/// Fields are private so the only way to obtain one is through
/// [`NewItem::new`], which rejects empty names and categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    name: String,
    category: String,
    image_name: String,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        image_name: impl Into<String>,
    ) -> CatalogResult<Self> {
        let name = name.into();
        let category = category.into();
        if name.trim().is_empty() {
            return Err(CatalogError::invalid("name is required"));
        }
        if category.trim().is_empty() {
            return Err(CatalogError::invalid("category is required"));
        }
        Ok(Self {
            name,
            category,
            image_name: image_name.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// May reference an image that has not been written yet.
    pub fn image_name(&self) -> &str {
        &self.image_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Parse an item identifier taken from a request path or CLI argument.
///
/// Only positive integers are identifiers; anything else is `Invalid`
/// rather than `NotFound`.
pub fn parse_item_id(raw: &str) -> CatalogResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CatalogError::invalid("item_id is required"));
    }
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CatalogError::invalid(format!(
            "item_id must be a positive integer, got '{}'",
            raw
        ))),
    }
}
