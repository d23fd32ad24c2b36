//! Store repository.

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use zari_core::Store;

#[derive(Debug, FromRow)]
struct StoreRow {
    id: String,
    name_en: String,
    name_ar: String,
    image_url: String,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: row.id,
            name_en: row.name_en,
            name_ar: row.name_ar,
            image_url: row.image_url,
        }
    }
}

/// Repository for stores (perfume houses).
#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    /// All stores, by English name.
    pub async fn list(&self) -> DbResult<Vec<Store>> {
        let rows: Vec<StoreRow> = sqlx::query_as(
            "SELECT id, name_en, name_ar, image_url FROM stores ORDER BY name_en",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Store::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Store>> {
        let row: Option<StoreRow> =
            sqlx::query_as("SELECT id, name_en, name_ar, image_url FROM stores WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Store::from))
    }

    pub async fn insert(&self, store: &Store) -> DbResult<()> {
        debug!(id = %store.id, name = %store.name_en, "Inserting store");

        sqlx::query(
            r#"
            INSERT INTO stores (id, name_en, name_ar, image_url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&store.id)
        .bind(&store.name_en)
        .bind(&store.name_ar)
        .bind(&store.image_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use zari_core::Store;

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for (id, name) in [("s-2", "Oud House"), ("s-1", "Amber Lane")] {
            db.stores()
                .insert(&Store {
                    id: id.to_string(),
                    name_en: name.to_string(),
                    name_ar: "متجر".to_string(),
                    image_url: String::new(),
                })
                .await
                .unwrap();
        }

        let stores = db.stores().list().await.unwrap();
        assert_eq!(stores.len(), 2);
        assert_eq!(stores[0].name_en, "Amber Lane");
        assert!(db.stores().get_by_id("s-2").await.unwrap().is_some());
        assert!(db.stores().get_by_id("nope").await.unwrap().is_none());
    }
}
