use uuid::Uuid;
use voyage_core::payment::GatewayError;
use voyage_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// `booking_id` is `None` when the request named no booking at all.
    #[error("No booking with ID {}.", .booking_id.map_or("None".to_string(), |id| id.to_string()))]
    BookingNotFound { booking_id: Option<Uuid>, available: Vec<Uuid> },

    #[error("A payment record already exists for booking ID {0}.")]
    AlreadyInitiated(Uuid),

    #[error("No payment record for transaction {0}.")]
    PaymentNotFound(String),

    /// Non-success answer from the gateway, passed through untouched.
    #[error("gateway returned {status}: {detail}")]
    Upstream { status: u16, detail: String },

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Storage(#[from] CoreError),
}

impl From<GatewayError> for PaymentError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { status, detail } => PaymentError::Upstream { status, detail },
            other => PaymentError::Internal(other.to_string()),
        }
    }
}
