use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use voyage_core::repository::ListingRepository;
use voyage_core::{CoreError, CoreResult, Listing};

use crate::database::map_db_error;

pub struct StoreListingRepository {
    pool: PgPool,
}

impl StoreListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    price_per_night: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Listing {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            price_per_night: row.price_per_night,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_LISTING: &str =
    "SELECT id, title, description, location, price_per_night, created_at, updated_at FROM listings";

#[async_trait]
impl ListingRepository for StoreListingRepository {
    async fn list_listings(&self) -> CoreResult<Vec<Listing>> {
        let rows: Vec<ListingRow> = sqlx::query_as(&format!("{SELECT_LISTING} ORDER BY created_at"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("listing", e))?;

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn get_listing(&self, id: Uuid) -> CoreResult<Option<Listing>> {
        let row: Option<ListingRow> = sqlx::query_as(&format!("{SELECT_LISTING} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("listing", e))?;

        Ok(row.map(Listing::from))
    }

    async fn create_listing(&self, listing: &Listing) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO listings (id, title, description, location, price_per_night, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(listing.id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(&listing.location)
        .bind(listing.price_per_night)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("listing", e))?;

        Ok(())
    }

    async fn update_listing(&self, listing: &Listing) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE listings
            SET title = $2, description = $3, location = $4, price_per_night = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(listing.id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(&listing.location)
        .bind(listing.price_per_night)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("listing", e))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("listing {}", listing.id)));
        }
        Ok(())
    }

    async fn delete_listing(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("listing", e))?;

        Ok(result.rows_affected() > 0)
    }
}
