//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Listing by store and by category
//! - Name search in both languages
//! - Bulk fetch for cart reconciliation
//! - Back-office stock and image updates
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shopper types: "oud"                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LIKE '%oud%' over name_en, name_ar (case-insensitive for ASCII)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Royal Oud | عود ملكي        ← MATCH                                   │
//! │  Oud Al Layl | عود الليل     ← MATCH                                   │
//! │  White Musk | مسك أبيض       │                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog is a few hundred rows, so a scan is fine.

use chrono::Utc;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::{non_negative, parse_column};
use crate::error::{DbError, DbResult};
use zari_core::{Category, Money, Product};

const PRODUCT_COLUMNS: &str =
    "id, store_id, name_en, name_ar, price_fils, image_url, category, stock";

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    store_id: String,
    name_en: String,
    name_ar: String,
    price_fils: i64,
    image_url: String,
    category: String,
    stock: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        let category: Category = parse_column("product", &row.id, &row.category)?;
        let price = non_negative("product", &row.id, "price", row.price_fils)?;
        let stock = non_negative("product", &row.id, "stock", row.stock)?;

        Ok(Product {
            id: row.id,
            name_en: row.name_en,
            name_ar: row.name_ar,
            price: Money::from_fils(price),
            image_url: row.image_url,
            store_id: row.store_id,
            category,
            stock,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> DbResult<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let results = repo.search("oud", 20).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches names in both languages.
    ///
    /// An empty query lists the catalog.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        let pattern = format!("%{}%", query.replace('%', "").replace('_', ""));
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE name_en LIKE ?1 OR name_ar LIKE ?1
            ORDER BY name_en
            LIMIT ?2
            "#
        ))
        .bind(pattern)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Search returned products");
        into_products(rows)
    }

    /// Products of one store.
    pub async fn list_by_store(&self, store_id: &str) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE store_id = ?1 ORDER BY name_en"
        ))
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        into_products(rows)
    }

    /// Products of one category across stores.
    pub async fn list_by_category(&self, category: Category) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category = ?1 ORDER BY name_en"
        ))
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_products(rows)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Fetches several products at once (missing ids are skipped).
    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ("));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        into_products(rows)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name_en, "Inserting product");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO products (
                id, store_id, name_en, name_ar, price_fils,
                image_url, category, stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.store_id)
        .bind(&product.name_en)
        .bind(&product.name_ar)
        .bind(product.price.fils())
        .bind(&product.image_url)
        .bind(product.category.as_str())
        .bind(product.stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Points a product at a newly uploaded image.
    pub async fn update_image_url(&self, id: &str, image_url: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET image_url = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(image_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Sets the stock level.
    pub async fn update_stock(&self, id: &str, stock: i64) -> DbResult<()> {
        debug!(product_id = %id, stock = %stock, "Updating stock");

        let result = sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Counts total products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_support::{perfume, test_db};
    use crate::DbError;
    use zari_core::{Category, Money};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let product = perfume("p-1", "Royal Oud", Category::Oud, 250, 5);
        db.products().insert(&product).await.unwrap();

        let loaded = db.products().get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(loaded, product);
        assert_eq!(loaded.price, Money::from_units(250));
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_listing_and_search() {
        let db = test_db().await;
        let repo = db.products();
        repo.insert(&perfume("p-1", "Royal Oud", Category::Oud, 250, 5)).await.unwrap();
        repo.insert(&perfume("p-2", "White Musk", Category::Musk, 90, 0)).await.unwrap();
        repo.insert(&perfume("p-3", "Oud Al Layl", Category::Oud, 400, 2)).await.unwrap();

        let ouds = repo.list_by_category(Category::Oud).await.unwrap();
        assert_eq!(ouds.len(), 2);

        let found = repo.search("oud", 10).await.unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.name_en.as_str()).collect();
        assert_eq!(names, vec!["Oud Al Layl", "Royal Oud"]);

        assert_eq!(repo.search("", 10).await.unwrap().len(), 3);
        assert_eq!(repo.list_by_store("store-1").await.unwrap().len(), 3);

        let many = repo
            .get_many(&["p-2".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(many.len(), 1);
        assert!(repo.get_many(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_updates() {
        let db = test_db().await;
        let repo = db.products();
        repo.insert(&perfume("p-1", "Royal Oud", Category::Oud, 250, 5)).await.unwrap();

        repo.update_stock("p-1", 1).await.unwrap();
        repo.update_image_url("p-1", "https://cdn.zari.ae/p-1.webp").await.unwrap();

        let loaded = repo.get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(loaded.stock, 1);
        assert_eq!(loaded.image_url, "https://cdn.zari.ae/p-1.webp");

        assert!(matches!(
            repo.update_stock("missing", 1).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_category_rejected() {
        let db = test_db().await;
        db.products()
            .insert(&perfume("p-1", "Royal Oud", Category::Oud, 250, 5))
            .await
            .unwrap();
        sqlx::query("UPDATE products SET category = 'Candle' WHERE id = 'p-1'")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(matches!(
            db.products().get_by_id("p-1").await,
            Err(DbError::Malformed { .. })
        ));
    }
}
