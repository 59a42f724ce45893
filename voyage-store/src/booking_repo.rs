use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use voyage_core::repository::BookingRepository;
use voyage_core::{Booking, CoreError, CoreResult};

use crate::database::map_db_error;

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    listing_id: Uuid,
    user_id: Uuid,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    total_price: Decimal,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            listing_id: row.listing_id,
            user_id: row.user_id,
            check_in_date: row.check_in_date,
            check_out_date: row.check_out_date,
            total_price: row.total_price,
            created_at: row.created_at,
        }
    }
}

const SELECT_BOOKING: &str =
    "SELECT id, listing_id, user_id, check_in_date, check_out_date, total_price, created_at FROM bookings";

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn list_bookings(&self) -> CoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!("{SELECT_BOOKING} ORDER BY created_at"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("booking", e))?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn get_booking(&self, id: Uuid) -> CoreResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!("{SELECT_BOOKING} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("booking", e))?;

        Ok(row.map(Booking::from))
    }

    async fn create_booking(&self, booking: &Booking) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, listing_id, user_id, check_in_date, check_out_date, total_price, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking.id)
        .bind(booking.listing_id)
        .bind(booking.user_id)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(booking.total_price)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("booking", e))?;

        Ok(())
    }

    async fn update_booking(&self, booking: &Booking) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET listing_id = $2, check_in_date = $3, check_out_date = $4, total_price = $5
            WHERE id = $1
            "#,
        )
        .bind(booking.id)
        .bind(booking.listing_id)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(booking.total_price)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("booking", e))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("booking {}", booking.id)));
        }
        Ok(())
    }

    async fn delete_booking(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("booking", e))?;

        Ok(result.rows_affected() > 0)
    }
}
