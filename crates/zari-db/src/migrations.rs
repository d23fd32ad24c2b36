//! # Database Migrations
//!
//! The storefront schema lives in `migrations/sqlite/001_initial_schema.sql`
//! and is compiled into the binary. It creates the catalog (`stores`,
//! `products`), the discount and fee tables (`coupons`, `locations`), order
//! storage (`orders`, `order_items`) and shopper data (`profiles`,
//! `subscribers`).
//!
//! sqlx records applied files in `_sqlx_migrations`, so opening an existing
//! database runs nothing. Schema changes go in a new numbered file; applied
//! files are never edited because sqlx checks their checksums.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration not yet recorded, in filename order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    let (total, applied) = migration_status(pool).await?;
    info!(total, applied, "Schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((MIGRATOR.migrations.len(), usize::try_from(applied).unwrap_or(0)))
}
