//! The catalog: a [`Store`] and an [`ImageStore`] working together.
//!
//! This is what the HTTP server and the CLI talk to. Uploads flow image
//! first: the bytes are stored under their content name, then the item is
//! inserted referencing that name. An image written for an insert that
//! later fails is harmless; it is simply a file nothing references yet.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::CatalogResult;
use crate::images::ImageStore;
use crate::models::{Category, Item, NewItem};
use crate::store::Store;

#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn Store>,
    images: ImageStore,
}

impl Catalog {
    pub fn new(store: Arc<dyn Store>, images: ImageStore) -> Self {
        Self { store, images }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Validate, store the image, then insert the item.
    pub async fn add_item(&self, name: &str, category: &str, image: &[u8]) -> CatalogResult<Item> {
        // Validate before touching the filesystem.
        NewItem::new(name, category, "")?;

        let image_name = self.images.put(image).await?;
        let item = NewItem::new(name, category, image_name)?;
        let stored = self.store.insert_item(&item).await?;

        tracing::info!(
            id = stored.id,
            name = %stored.name,
            category = %stored.category,
            image = %stored.image_name,
            "item received"
        );

        Ok(stored)
    }

    pub async fn resolve_category(&self, name: &str) -> CatalogResult<i64> {
        self.store.resolve_category(name).await
    }

    pub async fn list_items(&self) -> CatalogResult<Vec<Item>> {
        self.store.list_items().await
    }

    pub async fn get_item(&self, id: i64) -> CatalogResult<Item> {
        self.store.get_item(id).await
    }

    pub async fn search_items(&self, keyword: &str) -> CatalogResult<Vec<Item>> {
        self.store.search_items(keyword).await
    }

    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.store.list_categories().await
    }

    pub async fn list_items_by_category(&self, name: &str) -> CatalogResult<Vec<Item>> {
        self.store.list_items_by_category(name).await
    }

    pub async fn store_image(&self, bytes: &[u8]) -> CatalogResult<String> {
        self.images.put(bytes).await
    }

    pub async fn resolve_image_path(&self, file_name: &str) -> CatalogResult<PathBuf> {
        self.images.resolve(file_name).await
    }
}
