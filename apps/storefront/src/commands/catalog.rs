//! # Catalog Commands
//!
//! Browsing: perfume houses, search, category and store listings.

use tracing::debug;
use zari_core::validation::validate_search_query;
use zari_core::{Category, Product, Store};

use crate::error::{ApiError, ApiResult};
use crate::services::Services;

/// Default result count for searches.
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

/// Upper bound on a single search.
pub const MAX_SEARCH_LIMIT: u32 = 200;

pub async fn list_stores(services: &Services) -> ApiResult<Vec<Store>> {
    debug!("list_stores command");
    Ok(services.catalog.list_stores().await?)
}

/// Searches products by name in either language.
///
/// ## Arguments
/// * `query` - Search text; empty lists the whole catalog
/// * `limit` - Max results (default 50, capped at 200)
pub async fn search_products(
    services: &Services,
    query: String,
    limit: Option<u32>,
) -> ApiResult<Vec<Product>> {
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
    debug!(query = %query, limit, "search_products command");

    let query = validate_search_query(&query)?;
    Ok(services.catalog.search_products(&query, limit).await?)
}

/// Lists one category, e.g. `"oud"` or `"perfume"`.
pub async fn products_by_category(
    services: &Services,
    category: String,
) -> ApiResult<Vec<Product>> {
    debug!(category = %category, "products_by_category command");
    let category: Category = category.parse()?;
    Ok(services.catalog.products_by_category(category).await?)
}

pub async fn products_by_store(services: &Services, store_id: String) -> ApiResult<Vec<Product>> {
    debug!(store_id = %store_id, "products_by_store command");
    Ok(services.catalog.products_by_store(&store_id).await?)
}

pub async fn get_product(services: &Services, id: String) -> ApiResult<Product> {
    debug!(id = %id, "get_product command");
    services
        .catalog
        .product(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))
}
