//! # Coupon Repository
//!
//! Lookup for shoppers, CRUD and the exhausted-coupon sweep for the back
//! office.
//!
//! ## Usage Counter
//! ```text
//! apply (read only)        place order (write)              sweep
//! ───────────────────      ─────────────────────────────    ──────────────────
//! find_active_by_code  ──► UPDATE ... times_used + 1    ──► DELETE WHERE
//!                          WHERE times_used < limit          times_used >= limit
//!                          (inside the order transaction)
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::{new_id, non_negative};
use crate::error::{DbError, DbResult};
use zari_core::Coupon;

#[derive(Debug, FromRow)]
struct CouponRow {
    id: String,
    code: String,
    discount_percent: i64,
    active: bool,
    usage_limit: i64,
    times_used: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = DbError;

    fn try_from(row: CouponRow) -> DbResult<Self> {
        let discount_percent = u32::try_from(row.discount_percent)
            .ok()
            .filter(|p| (1..=100).contains(p))
            .ok_or_else(|| {
                DbError::malformed(
                    "coupon",
                    &row.id,
                    format!("discount {} outside 1..=100", row.discount_percent),
                )
            })?;
        let times_used = non_negative("coupon", &row.id, "times_used", row.times_used)?;

        Ok(Coupon {
            id: row.id,
            code: row.code,
            discount_percent,
            active: row.active,
            usage_limit: row.usage_limit,
            times_used,
            created_at: row.created_at,
        })
    }
}

/// Fields the back office supplies for a new coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    /// Already uppercased.
    pub code: String,
    pub discount_percent: u32,
    pub usage_limit: i64,
}

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Active coupon with this exact (uppercase) code.
    ///
    /// Used-up coupons are returned too; the caller decides what that means.
    pub async fn find_active_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        debug!(code = %code, "Looking up coupon");

        let row: Option<CouponRow> = sqlx::query_as(
            r#"
            SELECT id, code, discount_percent, active, usage_limit, times_used, created_at
            FROM coupons
            WHERE code = ?1 AND active = 1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Coupon::try_from).transpose()
    }

    /// All coupons, newest first.
    pub async fn list(&self) -> DbResult<Vec<Coupon>> {
        let rows: Vec<CouponRow> = sqlx::query_as(
            r#"
            SELECT id, code, discount_percent, active, usage_limit, times_used, created_at
            FROM coupons
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Coupon::try_from).collect()
    }

    /// Creates an active coupon with no uses.
    pub async fn insert(&self, coupon: &NewCoupon) -> DbResult<Coupon> {
        let created = Coupon {
            id: new_id(),
            code: coupon.code.clone(),
            discount_percent: coupon.discount_percent,
            active: true,
            usage_limit: coupon.usage_limit,
            times_used: 0,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO coupons (id, code, discount_percent, active, usage_limit, times_used, created_at)
            VALUES (?1, ?2, ?3, 1, ?4, 0, ?5)
            "#,
        )
        .bind(&created.id)
        .bind(&created.code)
        .bind(i64::from(created.discount_percent))
        .bind(created.usage_limit)
        .bind(created.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("coupon code", &created.code),
            other => other,
        })?;

        info!(code = %created.code, percent = created.discount_percent, "Coupon created");
        Ok(created)
    }

    /// Deletes one coupon. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every used-up coupon. Returns how many went.
    pub async fn sweep_exhausted(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM coupons WHERE times_used >= usage_limit")
            .execute(&self.pool)
            .await?;

        info!(removed = result.rows_affected(), "Swept exhausted coupons");
        Ok(result.rows_affected())
    }
}

/// Takes one use of `code`, unless none are left.
///
/// Runs on the caller's connection so it commits or rolls back with the
/// order that redeems it.
pub(crate) async fn redeem(conn: &mut SqliteConnection, code: &str) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE coupons
        SET times_used = times_used + 1
        WHERE code = ?1 AND active = 1 AND times_used < usage_limit
        "#,
    )
    .bind(code)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::CouponUnavailable(code.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn db_with_coupon(limit: i64) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.coupons()
            .insert(&NewCoupon {
                code: "SAVE10".to_string(),
                discount_percent: 10,
                usage_limit: limit,
            })
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_find_active_by_code() {
        let db = db_with_coupon(5).await;

        let coupon = db.coupons().find_active_by_code("SAVE10").await.unwrap().unwrap();
        assert_eq!(coupon.discount_percent, 10);
        assert_eq!(coupon.times_used, 0);
        assert!(db.coupons().find_active_by_code("save10").await.unwrap().is_none());

        sqlx::query("UPDATE coupons SET active = 0")
            .execute(db.pool())
            .await
            .unwrap();
        assert!(db.coupons().find_active_by_code("SAVE10").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = db_with_coupon(5).await;
        let result = db
            .coupons()
            .insert(&NewCoupon {
                code: "SAVE10".to_string(),
                discount_percent: 20,
                usage_limit: 1,
            })
            .await;
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_redeem_until_exhausted() {
        let db = db_with_coupon(1).await;
        let mut conn = db.pool().acquire().await.unwrap();

        redeem(&mut conn, "SAVE10").await.unwrap();
        assert!(matches!(
            redeem(&mut conn, "SAVE10").await,
            Err(DbError::CouponUnavailable(_))
        ));
        drop(conn);

        let coupon = db.coupons().find_active_by_code("SAVE10").await.unwrap().unwrap();
        assert!(coupon.is_exhausted());
    }

    #[tokio::test]
    async fn test_sweep_and_delete() {
        let db = db_with_coupon(1).await;
        let spare = db
            .coupons()
            .insert(&NewCoupon {
                code: "EID".to_string(),
                discount_percent: 15,
                usage_limit: 3,
            })
            .await
            .unwrap();
        sqlx::query("UPDATE coupons SET times_used = 1 WHERE code = 'SAVE10'")
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(db.coupons().sweep_exhausted().await.unwrap(), 1);
        let remaining = db.coupons().list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].code, "EID");

        assert!(db.coupons().delete(&spare.id).await.unwrap());
        assert!(!db.coupons().delete(&spare.id).await.unwrap());
    }
}
