//! Catalog store.

use async_trait::async_trait;
use mockall::automock;
use zari_core::{Category, Product, Store};
use zari_db::Database;

use super::StoreResult;

#[async_trait]
impl CatalogStore for Database {
    async fn list_stores(&self) -> StoreResult<Vec<Store>> {
        Ok(self.stores().list().await?)
    }

    async fn search_products(&self, query: &str, limit: u32) -> StoreResult<Vec<Product>> {
        Ok(self.products().search(query, limit).await?)
    }

    async fn products_by_store(&self, store_id: &str) -> StoreResult<Vec<Product>> {
        Ok(self.products().list_by_store(store_id).await?)
    }

    async fn products_by_category(&self, category: Category) -> StoreResult<Vec<Product>> {
        Ok(self.products().list_by_category(category).await?)
    }

    async fn product(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.products().get_by_id(id).await?)
    }

    async fn products_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Product>> {
        Ok(self.products().get_many(ids).await?)
    }

    async fn set_product_image(&self, id: &str, image_url: &str) -> StoreResult<()> {
        Ok(self.products().update_image_url(id, image_url).await?)
    }

    async fn set_product_stock(&self, id: &str, stock: i64) -> StoreResult<()> {
        Ok(self.products().update_stock(id, stock).await?)
    }
}

#[automock]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Every perfume house.
    async fn list_stores(&self) -> StoreResult<Vec<Store>>;

    /// Name search in both languages. An empty query lists everything.
    async fn search_products(&self, query: &str, limit: u32) -> StoreResult<Vec<Product>>;

    async fn products_by_store(&self, store_id: &str) -> StoreResult<Vec<Product>>;

    async fn products_by_category(&self, category: Category) -> StoreResult<Vec<Product>>;

    async fn product(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Current catalog rows for the given ids; unknown ids are skipped.
    async fn products_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Product>>;

    async fn set_product_image(&self, id: &str, image_url: &str) -> StoreResult<()>;

    async fn set_product_stock(&self, id: &str, stock: i64) -> StoreResult<()>;
}
