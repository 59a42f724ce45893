use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::pii::Masked;
use crate::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    /// Maps the gateway's transaction status onto ours. Only "success" completes.
    pub fn from_gateway(status: &str) -> Self {
        if status.trim().eq_ignore_ascii_case("success") {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Failed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Completed" => Ok(PaymentStatus::Completed),
            "Failed" => Ok(PaymentStatus::Failed),
            other => Err(CoreError::Storage(format!("unknown payment status {other:?}"))),
        }
    }
}

/// Local record of a gateway transaction, one per booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub transaction_ref: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    /// Raw body of the last gateway response.
    pub gateway_response: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn pending(
        booking_id: Uuid,
        transaction_ref: String,
        amount: Decimal,
        currency: String,
        gateway_response: Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            booking_id,
            transaction_ref,
            amount,
            currency,
            status: PaymentStatus::Pending,
            gateway_response,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record_verification(&mut self, status: PaymentStatus, gateway_response: Value) {
        self.status = status;
        self.gateway_response = gateway_response;
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Customization {
    pub title: String,
    pub description: String,
}

/// Payload of the gateway's transaction initialize call.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub amount: Decimal,
    pub currency: String,
    pub email: Masked<String>,
    pub first_name: String,
    pub last_name: String,
    pub tx_ref: String,
    pub callback_url: String,
    pub return_url: String,
    pub customization: Customization,
}

/// Decoded JSON body of a successful gateway call.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse(pub Value);

impl GatewayResponse {
    pub fn checkout_url(&self) -> Option<&str> {
        self.0.pointer("/data/checkout_url").and_then(Value::as_str)
    }

    /// `data.status` of a verify response, lowercased; empty when absent.
    pub fn transaction_status(&self) -> String {
        self.0
            .pointer("/data/status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase()
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The gateway answered with a non-success status.
    #[error("gateway returned {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("gateway unreachable: {0}")]
    Transport(String),
    #[error("gateway response undecodable: {0}")]
    Decode(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Start a hosted checkout for `request.tx_ref`.
    async fn initialize(&self, request: &CheckoutRequest) -> Result<GatewayResponse, GatewayError>;

    /// Query the gateway's view of a transaction.
    async fn verify(&self, tx_ref: &str) -> Result<GatewayResponse, GatewayError>;
}
