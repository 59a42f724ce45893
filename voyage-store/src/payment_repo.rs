use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;
use voyage_core::repository::PaymentRepository;
use voyage_core::{CoreError, CoreResult, Payment};

use crate::database::map_db_error;

pub struct StorePaymentRepository {
    pool: PgPool,
}

impl StorePaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    booking_id: Uuid,
    transaction_ref: String,
    amount: Decimal,
    currency: String,
    status: String,
    gateway_response: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = CoreError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: row.id,
            booking_id: row.booking_id,
            transaction_ref: row.transaction_ref,
            amount: row.amount,
            currency: row.currency,
            status: row.status.parse()?,
            gateway_response: row.gateway_response,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_PAYMENT: &str = "SELECT id, booking_id, transaction_ref, amount, currency, status, gateway_response, created_at, updated_at FROM payments";

#[async_trait]
impl PaymentRepository for StorePaymentRepository {
    async fn create_payment(&self, payment: &Payment) -> CoreResult<()> {
        // booking_id is UNIQUE, so concurrent initiations cannot both land.
        sqlx::query(
            r#"
            INSERT INTO payments (id, booking_id, transaction_ref, amount, currency, status, gateway_response, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(payment.id)
        .bind(payment.booking_id)
        .bind(&payment.transaction_ref)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(payment.status.as_str())
        .bind(&payment.gateway_response)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("payment", e))?;

        Ok(())
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> CoreResult<Option<Payment>> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!("{SELECT_PAYMENT} WHERE booking_id = $1"))
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_by_reference(&self, transaction_ref: &str) -> CoreResult<Option<Payment>> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!("{SELECT_PAYMENT} WHERE transaction_ref = $1"))
            .bind(transaction_ref)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn update_payment(&self, payment: &Payment) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE payments SET status = $2, gateway_response = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(payment.id)
        .bind(payment.status.as_str())
        .bind(&payment.gateway_response)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("payment", e))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("payment {}", payment.transaction_ref)));
        }
        Ok(())
    }
}
