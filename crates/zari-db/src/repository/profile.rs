//! Shopper profile repository.
//!
//! The profile id is the auth provider's user id, so there is at most one
//! row per shopper and every write is an upsert.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use zari_core::{GeoPoint, Profile, SavedAddress};

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: String,
    full_name: String,
    phone: String,
    emirate: String,
    city: String,
    street: String,
    villa: String,
    lat: Option<f64>,
    lng: Option<f64>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        let location = match (row.lat, row.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        };

        Profile {
            id: row.id,
            full_name: row.full_name,
            phone: row.phone,
            emirate: row.emirate,
            city: row.city,
            street: row.street,
            villa: row.villa,
            location,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for saved shopper profiles.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    pub async fn get(&self, user_id: &str) -> DbResult<Option<Profile>> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, full_name, phone, emirate, city, street, villa, lat, lng, updated_at
            FROM profiles
            WHERE id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    /// Writes every field of the profile. `updated_at` is set here.
    pub async fn upsert(&self, profile: &Profile) -> DbResult<Profile> {
        let now = Utc::now();
        debug!(user_id = %profile.id, "Saving profile");

        sqlx::query(
            r#"
            INSERT INTO profiles (id, full_name, phone, emirate, city, street, villa, lat, lng, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                full_name = excluded.full_name,
                phone = excluded.phone,
                emirate = excluded.emirate,
                city = excluded.city,
                street = excluded.street,
                villa = excluded.villa,
                lat = excluded.lat,
                lng = excluded.lng,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.full_name)
        .bind(&profile.phone)
        .bind(&profile.emirate)
        .bind(&profile.city)
        .bind(&profile.street)
        .bind(&profile.villa)
        .bind(profile.location.map(|p| p.lat))
        .bind(profile.location.map(|p| p.lng))
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Profile {
            updated_at: Some(now),
            ..profile.clone()
        })
    }

    /// Replaces only the address fields, creating the profile if needed.
    ///
    /// Name and phone are left as they were.
    pub async fn update_address(&self, user_id: &str, address: &SavedAddress) -> DbResult<()> {
        debug!(user_id = %user_id, emirate = %address.emirate, "Saving address to profile");

        sqlx::query(
            r#"
            INSERT INTO profiles (id, emirate, city, street, villa, lat, lng, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                emirate = excluded.emirate,
                city = excluded.city,
                street = excluded.street,
                villa = excluded.villa,
                lat = excluded.lat,
                lng = excluded.lng,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(&address.emirate)
        .bind(&address.city)
        .bind(&address.street)
        .bind(&address.villa)
        .bind(address.location.map(|p| p.lat))
        .bind(address.location.map(|p| p.lng))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
