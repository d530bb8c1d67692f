//! CLI entry points for the `catalog` binary.
//!
//! Each `run_*` function opens what it needs from the configuration, calls
//! the catalog, and prints plain text to stdout.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::db;
use crate::images::ImageStore;
use crate::migrate;
use crate::models::{parse_item_id, Item};
use crate::store::SqliteStore;

async fn open_catalog(config: &Config) -> Result<Catalog> {
    let pool = db::connect(config).await?;
    let images = ImageStore::open(&config.images.dir).await?;
    Ok(Catalog::new(Arc::new(SqliteStore::new(pool)), images))
}

/// Create the schema and the managed image directory.
pub async fn run_init(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool).await?;
    pool.close().await;

    let images = ImageStore::open(&config.images.dir).await?;

    println!("Database initialized successfully.");
    println!("Image directory: {}", images.dir().display());
    Ok(())
}

pub async fn run_add(config: &Config, name: &str, category: &str, image: &Path) -> Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("Failed to read image: {}", image.display()))?;

    let catalog = open_catalog(config).await?;
    let item = catalog.add_item(name, category, &bytes).await?;

    println!("item received: {}", item.name);
    print_item(&item);
    Ok(())
}

pub async fn run_list(config: &Config, category: Option<&str>) -> Result<()> {
    let catalog = open_catalog(config).await?;
    let items = match category {
        Some(name) => catalog.list_items_by_category(name).await?,
        None => catalog.list_items().await?,
    };

    if items.is_empty() {
        println!("No items.");
        return Ok(());
    }
    print_table(&items);
    Ok(())
}

pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let id = parse_item_id(id)?;
    let catalog = open_catalog(config).await?;
    let item = catalog.get_item(id).await?;
    print_item(&item);
    Ok(())
}

pub async fn run_search(config: &Config, keyword: &str) -> Result<()> {
    let catalog = open_catalog(config).await?;
    let items = catalog.search_items(keyword).await?;
    print_table(&items);
    Ok(())
}

pub async fn run_categories(config: &Config) -> Result<()> {
    let catalog = open_catalog(config).await?;
    let categories = catalog.list_categories().await?;

    if categories.is_empty() {
        println!("No categories.");
        return Ok(());
    }
    for category in categories {
        println!("{:>4}  {}", category.id, category.name);
    }
    Ok(())
}

fn print_item(item: &Item) {
    println!("id:         {}", item.id);
    println!("name:       {}", item.name);
    println!("category:   {}", item.category);
    println!("image_name: {}", item.image_name);
}

fn print_table(items: &[Item]) {
    for item in items {
        println!(
            "{:>4}  {:<30}  {:<16}  {}",
            item.id, item.name, item.category, item.image_name
        );
    }
    println!("({} items)", items.len());
}
