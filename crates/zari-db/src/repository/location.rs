//! Delivery location repository.
//!
//! One row per (emirate, city) with its delivery cost.

use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use super::{new_id, non_negative};
use crate::error::{DbError, DbResult};
use zari_core::{DeliveryLocation, Money};

#[derive(Debug, FromRow)]
struct LocationRow {
    id: String,
    emirate: String,
    city: String,
    cost_fils: i64,
}

impl TryFrom<LocationRow> for DeliveryLocation {
    type Error = DbError;

    fn try_from(row: LocationRow) -> DbResult<Self> {
        let cost = non_negative("location", &row.id, "cost", row.cost_fils)?;
        Ok(DeliveryLocation {
            id: row.id,
            emirate: row.emirate,
            city: row.city,
            cost: Money::from_fils(cost),
        })
    }
}

/// Repository for delivery locations.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: SqlitePool,
}

impl LocationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LocationRepository { pool }
    }

    /// Every location, grouped by emirate.
    pub async fn list(&self) -> DbResult<Vec<DeliveryLocation>> {
        let rows: Vec<LocationRow> = sqlx::query_as(
            "SELECT id, emirate, city, cost_fils FROM locations ORDER BY emirate, city",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DeliveryLocation::try_from).collect()
    }

    pub async fn insert(
        &self,
        emirate: &str,
        city: &str,
        cost: Money,
    ) -> DbResult<DeliveryLocation> {
        let location = DeliveryLocation {
            id: new_id(),
            emirate: emirate.trim().to_string(),
            city: city.trim().to_string(),
            cost,
        };

        sqlx::query("INSERT INTO locations (id, emirate, city, cost_fils) VALUES (?1, ?2, ?3, ?4)")
            .bind(&location.id)
            .bind(&location.emirate)
            .bind(&location.city)
            .bind(location.cost.fils())
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate(
                    "location",
                    format!("{}/{}", location.emirate, location.city),
                ),
                other => other,
            })?;

        debug!(emirate = %location.emirate, city = %location.city, "Location added");
        Ok(location)
    }

    /// Sets the delivery cost of a single city.
    pub async fn update_cost(&self, id: &str, cost: Money) -> DbResult<()> {
        let result = sqlx::query("UPDATE locations SET cost_fils = ?2 WHERE id = ?1")
            .bind(id)
            .bind(cost.fils())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Location", id));
        }
        Ok(())
    }

    /// Sets the same cost for every city of an emirate.
    ///
    /// Returns the number of cities updated.
    pub async fn update_cost_for_emirate(&self, emirate: &str, cost: Money) -> DbResult<u64> {
        let result = sqlx::query("UPDATE locations SET cost_fils = ?2 WHERE emirate = ?1")
            .bind(emirate)
            .bind(cost.fils())
            .execute(&self.pool)
            .await?;

        info!(
            emirate = %emirate,
            cost = %cost,
            cities = result.rows_affected(),
            "Emirate delivery cost updated"
        );
        Ok(result.rows_affected())
    }
}
