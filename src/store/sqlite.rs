//! SQLite-backed [`Store`] implementation.
//!
//! Category resolution is one `INSERT … ON CONFLICT … RETURNING` statement
//! against the `UNIQUE` constraint on `categories.name`, so there is no
//! window between a lookup and an insert for a concurrent caller to slip
//! into. Item insertion runs that upsert and the item insert inside one
//! transaction.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, Item, NewItem};

use super::{check_category_name, check_item_id, check_keyword, no_match, Store};

const ITEM_SELECT: &str = r#"
    SELECT items.id AS id, items.name AS name, categories.name AS category,
           items.image_name AS image_name
    FROM items
    JOIN categories ON categories.id = items.category_id
"#;

/// SQLite implementation of the [`Store`] trait.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_item(row: &SqliteRow) -> Item {
    Item {
        id: row.get("id"),
        name: row.get("name"),
        category: row.get("category"),
        image_name: row.get("image_name"),
    }
}

/// Get-or-create on any connection, including one inside a transaction.
async fn upsert_category(conn: &mut SqliteConnection, name: &str) -> CatalogResult<i64> {
    // The no-op update makes RETURNING yield the existing row on conflict.
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO categories (name) VALUES (?)
        ON CONFLICT(name) DO UPDATE SET name = excluded.name
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

#[async_trait]
impl Store for SqliteStore {
    async fn resolve_category(&self, name: &str) -> CatalogResult<i64> {
        check_category_name(name)?;
        let mut conn = self.pool.acquire().await?;
        upsert_category(&mut conn, name).await
    }

    async fn insert_item(&self, item: &NewItem) -> CatalogResult<Item> {
        check_category_name(item.category())?;

        let mut tx = self.pool.begin().await?;

        let category_id = upsert_category(&mut tx, item.category()).await?;

        let id = sqlx::query("INSERT INTO items (name, category_id, image_name) VALUES (?, ?, ?)")
            .bind(item.name())
            .bind(category_id)
            .bind(item.image_name())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        tx.commit().await?;

        tracing::debug!(id, category_id, name = item.name(), "inserted item");

        Ok(Item {
            id,
            name: item.name().to_string(),
            category: item.category().to_string(),
            image_name: item.image_name().to_string(),
        })
    }

    async fn list_items(&self) -> CatalogResult<Vec<Item>> {
        let rows = sqlx::query(&format!("{} ORDER BY items.id ASC", ITEM_SELECT))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(row_to_item).collect())
    }

    async fn get_item(&self, id: i64) -> CatalogResult<Item> {
        check_item_id(id)?;

        let row = sqlx::query(&format!("{} WHERE items.id = ?", ITEM_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row_to_item(&row)),
            None => Err(CatalogError::not_found(format!("item {}", id))),
        }
    }

    async fn search_items(&self, keyword: &str) -> CatalogResult<Vec<Item>> {
        check_keyword(keyword)?;

        // instr() is a literal, case-sensitive containment test; LIKE would
        // fold ASCII case and treat % and _ as wildcards.
        let rows = sqlx::query(&format!(
            "{} WHERE instr(items.name, ?) > 0 ORDER BY items.id ASC",
            ITEM_SELECT
        ))
        .bind(keyword)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(no_match(keyword));
        }

        Ok(rows.iter().map(row_to_item).collect())
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| Category {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn list_items_by_category(&self, name: &str) -> CatalogResult<Vec<Item>> {
        check_category_name(name)?;

        let rows = sqlx::query(&format!(
            "{} WHERE categories.name = ? ORDER BY items.id ASC",
            ITEM_SELECT
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(CatalogError::not_found(format!(
                "no items in category '{}'",
                name
            )));
        }

        Ok(rows.iter().map(row_to_item).collect())
    }
}
