//! Newsletter subscriber repository.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use super::new_id;
use crate::error::DbResult;
use zari_core::Subscriber;

#[derive(Debug, FromRow)]
struct SubscriberRow {
    id: String,
    email: String,
    phone: Option<String>,
    unsub_token: String,
    created_at: DateTime<Utc>,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        Subscriber {
            id: row.id,
            email: row.email,
            phone: row.phone,
            unsub_token: row.unsub_token,
            created_at: row.created_at,
        }
    }
}

/// Repository for the newsletter list.
///
/// Emails arrive here already trimmed and lowercased.
#[derive(Debug, Clone)]
pub struct SubscriberRepository {
    pool: SqlitePool,
}

impl SubscriberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SubscriberRepository { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<Subscriber>> {
        let row: Option<SubscriberRow> = sqlx::query_as(
            "SELECT id, email, phone, unsub_token, created_at FROM subscribers WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Subscriber::from))
    }

    /// Adds a subscriber. Returns `false` if the email was already listed.
    pub async fn insert(
        &self,
        email: &str,
        phone: Option<&str>,
        unsub_token: &str,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO subscribers (id, email, phone, unsub_token, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(new_id())
        .bind(email)
        .bind(phone)
        .bind(unsub_token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let added = result.rows_affected() > 0;
        debug!(email = %email, added, "Newsletter subscribe");
        Ok(added)
    }

    pub async fn delete_by_email(&self, email: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM subscribers WHERE email = ?1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        info!(removed = result.rows_affected(), "Unsubscribed by email");
        Ok(result.rows_affected() > 0)
    }

    /// Removes the subscriber holding an unsubscribe link token.
    pub async fn delete_by_token(&self, token: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM subscribers WHERE unsub_token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        info!(removed = result.rows_affected(), "Unsubscribed by link");
        Ok(result.rows_affected() > 0)
    }

    /// Everyone on the list, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Subscriber>> {
        let rows: Vec<SubscriberRow> = sqlx::query_as(
            "SELECT id, email, phone, unsub_token, created_at FROM subscribers ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Subscriber::from).collect())
    }
}
