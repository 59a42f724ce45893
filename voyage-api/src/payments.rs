use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voyage_payment::{InitiatePayment, PaymentError};

use crate::{
    error::{AppError, ErrorBody},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct InitiatePaymentRequest {
    pub booking_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InitiatePaymentResponse {
    pub checkout_url: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub payment_status: String,
}

/// Payment endpoints are open: the gateway redirects anonymous browsers here.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/initiate-payment/", post(initiate_payment))
        .route("/verify-payment/{tx_ref}/", get(verify_payment))
}

fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

fn initiation_error(err: PaymentError) -> AppError {
    match err {
        PaymentError::BookingNotFound { booking_id, available } => {
            let ids: Vec<String> = available.iter().map(Uuid::to_string).collect();
            let requested = booking_id.map_or_else(|| "None".to_string(), |id| id.to_string());
            AppError::Described(
                StatusCode::NOT_FOUND,
                ErrorBody::new("Booking not found.").message(format!(
                    "No booking with ID {requested}. Available booking IDs: [{}]",
                    ids.join(", ")
                )),
            )
        }
        PaymentError::AlreadyInitiated(booking_id) => AppError::Described(
            StatusCode::BAD_REQUEST,
            ErrorBody::new("Payment already initiated.")
                .message(format!("A payment record already exists for booking ID {booking_id}.")),
        ),
        PaymentError::Upstream { status, detail } => AppError::Described(
            upstream_status(status),
            ErrorBody::new("Failed to initiate payment.").upstream(status, detail),
        ),
        other => AppError::Described(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new("Internal server error during payment initiation.").detail(other.to_string()),
        ),
    }
}

fn verification_error(err: PaymentError) -> AppError {
    match err {
        PaymentError::PaymentNotFound(_) => {
            AppError::Described(StatusCode::NOT_FOUND, ErrorBody::new("Payment record not found."))
        }
        PaymentError::Upstream { status, detail } => AppError::Described(
            upstream_status(status),
            ErrorBody::new("Verification failed.").upstream(status, detail),
        ),
        other => AppError::Described(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new("Internal server error during verification.").detail(other.to_string()),
        ),
    }
}

/// POST /initiate-payment/
async fn initiate_payment(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<InitiatePaymentRequest>, AppError>,
) -> Result<Json<InitiatePaymentResponse>, AppError> {
    let checkout = state
        .payment_orchestrator
        .initiate(InitiatePayment {
            booking_id: req.booking_id,
            amount: req.amount,
            currency: req.currency,
        })
        .await
        .map_err(initiation_error)?;

    Ok(Json(InitiatePaymentResponse { checkout_url: checkout.checkout_url }))
}

/// GET /verify-payment/{tx_ref}/
async fn verify_payment(
    State(state): State<AppState>,
    Path(tx_ref): Path<String>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    tracing::info!("Verifying payment for tx_ref {}", tx_ref);
    let status = state
        .payment_orchestrator
        .verify(&tx_ref)
        .await
        .map_err(verification_error)?;

    Ok(Json(VerifyPaymentResponse { payment_status: status.to_string() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn upstream_errors_keep_gateway_status() {
        let err = initiation_error(PaymentError::Upstream { status: 422, detail: "invalid".into() });
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = verification_error(PaymentError::Upstream { status: 1000, detail: String::new() });
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_booking_id_reads_as_none() {
        let known = Uuid::new_v4();
        let err = initiation_error(PaymentError::BookingNotFound { booking_id: None, available: vec![known] });
        let AppError::Described(status, body) = err else { panic!("expected a described error") };
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body.message.as_deref(),
            Some(format!("No booking with ID None. Available booking IDs: [{known}]").as_str())
        );
    }

    #[test]
    fn duplicate_initiation_is_bad_request() {
        let err = initiation_error(PaymentError::AlreadyInitiated(Uuid::new_v4()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn transport_failures_are_internal() {
        let err = verification_error(PaymentError::Internal("timed out".into()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
