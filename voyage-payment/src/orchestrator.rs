use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use voyage_core::payment::{CheckoutRequest, Customization, PaymentGateway};
use voyage_core::pii::Masked;
use voyage_core::repository::{BookingRepository, PaymentRepository, UserRepository};
use voyage_core::user::DEFAULT_FIRST_NAME;
use voyage_core::{CoreError, Payment, PaymentStatus, User};

use crate::error::PaymentError;

#[derive(Debug, Clone)]
pub struct PaymentSettings {
    /// Where the gateway sends the payer back (and calls back) after checkout.
    pub callback_url: String,
    pub payer_email: String,
    pub default_currency: String,
}

#[derive(Debug, Clone)]
pub struct InitiatePayment {
    /// A request without a booking is answered like an unknown booking.
    pub booking_id: Option<Uuid>,
    /// Falls back to the booking's total price.
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub checkout_url: String,
    pub transaction_ref: String,
}

pub struct PaymentOrchestrator {
    bookings: Arc<dyn BookingRepository>,
    users: Arc<dyn UserRepository>,
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settings: PaymentSettings,
}

impl PaymentOrchestrator {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        users: Arc<dyn UserRepository>,
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settings: PaymentSettings,
    ) -> Self {
        Self { bookings, users, payments, gateway, settings }
    }

    /// Start a hosted checkout for a booking and record it as a pending payment.
    pub async fn initiate(&self, request: InitiatePayment) -> Result<Checkout, PaymentError> {
        let found = match request.booking_id {
            Some(id) => self.bookings.get_booking(id).await?,
            None => None,
        };
        let Some(booking) = found else {
            let available = self
                .bookings
                .list_bookings()
                .await?
                .into_iter()
                .map(|b| b.id)
                .collect();
            return Err(PaymentError::BookingNotFound { booking_id: request.booking_id, available });
        };
        let booking_id = booking.id;

        if self.payments.find_by_booking(booking.id).await?.is_some() {
            return Err(PaymentError::AlreadyInitiated(booking.id));
        }

        let payer = self.users.get_user(booking.user_id).await?;
        let (first_name, last_name) = payer_names(payer.as_ref());
        let amount = request.amount.unwrap_or(booking.total_price);
        let currency = request
            .currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_currency.clone());
        let tx_ref = Uuid::new_v4().to_string();

        let checkout = CheckoutRequest {
            amount,
            currency: currency.clone(),
            email: Masked(self.settings.payer_email.clone()),
            first_name,
            last_name,
            tx_ref: tx_ref.clone(),
            callback_url: self.settings.callback_url.clone(),
            return_url: self.settings.callback_url.clone(),
            customization: Customization {
                title: "Booking Payment".to_string(),
                description: "Payment for booking".to_string(),
            },
        };

        info!(%booking_id, %tx_ref, %amount, %currency, "Initializing gateway transaction");
        let response = self.gateway.initialize(&checkout).await.map_err(|e| {
            warn!(%booking_id, %tx_ref, "Gateway initialization failed: {}", e);
            PaymentError::from(e)
        })?;

        let checkout_url = response
            .checkout_url()
            .ok_or_else(|| PaymentError::Internal("gateway response has no data.checkout_url".to_string()))?
            .to_string();

        let payment = Payment::pending(booking.id, tx_ref.clone(), amount, currency, response.into_inner());
        self.payments.create_payment(&payment).await.map_err(|e| match e {
            // Lost a race with a concurrent initiation for the same booking.
            CoreError::AlreadyExists(_) => PaymentError::AlreadyInitiated(booking.id),
            other => PaymentError::Storage(other),
        })?;

        info!(%booking_id, %tx_ref, "Payment recorded as {}", PaymentStatus::Pending);
        Ok(Checkout { checkout_url, transaction_ref: tx_ref })
    }

    /// Re-query the gateway for `tx_ref` and store the outcome. Calling it again
    /// re-runs the query and may change a previously recorded outcome.
    pub async fn verify(&self, tx_ref: &str) -> Result<PaymentStatus, PaymentError> {
        let mut payment = self
            .payments
            .find_by_reference(tx_ref)
            .await?
            .ok_or_else(|| PaymentError::PaymentNotFound(tx_ref.to_string()))?;

        let response = self.gateway.verify(tx_ref).await.map_err(|e| {
            warn!(tx_ref, "Gateway verification failed: {}", e);
            PaymentError::from(e)
        })?;

        let status = PaymentStatus::from_gateway(&response.transaction_status());
        payment.record_verification(status, response.into_inner());
        self.payments.update_payment(&payment).await?;

        info!(tx_ref, booking_id = %payment.booking_id, "Payment marked {}", status);
        Ok(status)
    }
}

fn payer_names(user: Option<&User>) -> (String, String) {
    match user {
        Some(user) => (user.payer_first_name().to_string(), user.payer_last_name().to_string()),
        None => (DEFAULT_FIRST_NAME.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Reply, ScriptedGateway};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use voyage_core::{Booking, Listing, NewBooking, NewListing};
    use voyage_store::{InMemoryBookingRepository, InMemoryPaymentRepository, InMemoryUserRepository};

    struct Harness {
        orchestrator: PaymentOrchestrator,
        bookings: InMemoryBookingRepository,
        users: InMemoryUserRepository,
        payments: InMemoryPaymentRepository,
        gateway: Arc<ScriptedGateway>,
    }

    fn harness() -> Harness {
        let bookings = InMemoryBookingRepository::new();
        let users = InMemoryUserRepository::new();
        let payments = InMemoryPaymentRepository::new();
        let gateway = Arc::new(ScriptedGateway::new());
        let orchestrator = PaymentOrchestrator::new(
            Arc::new(bookings.clone()),
            Arc::new(users.clone()),
            Arc::new(payments.clone()),
            gateway.clone(),
            PaymentSettings {
                callback_url: "http://localhost:8000/verify-payment/".to_string(),
                payer_email: "payer@example.com".to_string(),
                default_currency: "ETB".to_string(),
            },
        );
        Harness { orchestrator, bookings, users, payments, gateway }
    }

    async fn seed_booking(h: &Harness, user: &User) -> Booking {
        h.users.create_user(user).await.unwrap();
        let listing = Listing::create(NewListing {
            title: "Lalibela Guesthouse".to_string(),
            description: String::new(),
            location: "Lalibela".to_string(),
            price_per_night: dec!(700),
        })
        .unwrap();
        let booking = Booking::create(
            NewBooking {
                listing_id: listing.id,
                check_in_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                check_out_date: NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(),
                total_price: None,
            },
            user.id,
            &listing,
        )
        .unwrap();
        h.bookings.create_booking(&booking).await.unwrap();
        booking
    }

    fn initiate(booking_id: Uuid) -> InitiatePayment {
        InitiatePayment { booking_id: Some(booking_id), amount: Some(dec!(1400)), currency: None }
    }

    #[tokio::test]
    async fn missing_booking_lists_available_ids() {
        let h = harness();
        let user = User::new("Sara".into(), "Tadesse".into(), None);
        let existing = seed_booking(&h, &user).await;

        let err = h.orchestrator.initiate(initiate(Uuid::new_v4())).await.unwrap_err();
        match err {
            PaymentError::BookingNotFound { available, .. } => assert_eq!(available, vec![existing.id]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(h.gateway.initialize_calls(), 0);
    }

    #[tokio::test]
    async fn initiation_records_one_pending_payment() {
        let h = harness();
        let user = User::new("Sara".into(), "Tadesse".into(), None);
        let booking = seed_booking(&h, &user).await;

        let checkout = h.orchestrator.initiate(initiate(booking.id)).await.unwrap();
        assert_eq!(checkout.checkout_url, format!("https://checkout.test/{}", checkout.transaction_ref));
        assert!(Uuid::parse_str(&checkout.transaction_ref).is_ok());

        let payment = h.payments.find_by_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.transaction_ref, checkout.transaction_ref);
        assert_eq!(payment.currency, "ETB");
        assert_eq!(payment.amount, dec!(1400));
        assert_eq!(payment.gateway_response["status"], json!("success"));
        assert_eq!(h.payments.count().await, 1);

        let sent = h.gateway.last_request().unwrap();
        assert_eq!(sent.first_name, "Sara");
        assert_eq!(sent.email.into_inner(), "payer@example.com");
    }

    #[tokio::test]
    async fn second_initiation_is_rejected_without_calling_gateway() {
        let h = harness();
        let user = User::new("Sara".into(), "Tadesse".into(), None);
        let booking = seed_booking(&h, &user).await;

        h.orchestrator.initiate(initiate(booking.id)).await.unwrap();
        let err = h.orchestrator.initiate(initiate(booking.id)).await.unwrap_err();

        assert!(matches!(err, PaymentError::AlreadyInitiated(id) if id == booking.id));
        assert_eq!(h.gateway.initialize_calls(), 1);
        assert_eq!(h.payments.count().await, 1);
    }

    /// Misses every existence check, so only the insert itself can catch a
    /// second payment, as when two initiations interleave.
    struct StaleReads(InMemoryPaymentRepository);

    #[async_trait::async_trait]
    impl PaymentRepository for StaleReads {
        async fn create_payment(&self, payment: &Payment) -> voyage_core::CoreResult<()> {
            self.0.create_payment(payment).await
        }

        async fn find_by_booking(&self, _booking_id: Uuid) -> voyage_core::CoreResult<Option<Payment>> {
            Ok(None)
        }

        async fn find_by_reference(&self, transaction_ref: &str) -> voyage_core::CoreResult<Option<Payment>> {
            self.0.find_by_reference(transaction_ref).await
        }

        async fn update_payment(&self, payment: &Payment) -> voyage_core::CoreResult<()> {
            self.0.update_payment(payment).await
        }
    }

    #[tokio::test]
    async fn concurrent_initiation_loses_at_insert() {
        let h = harness();
        let user = User::new("Sara".into(), "Tadesse".into(), None);
        let booking = seed_booking(&h, &user).await;
        let orchestrator = PaymentOrchestrator::new(
            Arc::new(h.bookings.clone()),
            Arc::new(h.users.clone()),
            Arc::new(StaleReads(h.payments.clone())),
            h.gateway.clone(),
            h.orchestrator.settings.clone(),
        );

        let first = orchestrator.initiate(initiate(booking.id)).await.unwrap();
        let err = orchestrator.initiate(initiate(booking.id)).await.unwrap_err();

        assert!(matches!(err, PaymentError::AlreadyInitiated(id) if id == booking.id));
        assert_eq!(h.gateway.initialize_calls(), 2);
        assert_eq!(h.payments.count().await, 1);
        let stored = h.payments.find_by_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.transaction_ref, first.transaction_ref);
    }

    #[tokio::test]
    async fn request_without_booking_is_not_found() {
        let h = harness();
        let user = User::new("Sara".into(), "Tadesse".into(), None);
        let existing = seed_booking(&h, &user).await;

        let err = h
            .orchestrator
            .initiate(InitiatePayment { booking_id: None, amount: Some(dec!(10)), currency: None })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No booking with ID None.");
        assert!(matches!(err, PaymentError::BookingNotFound { booking_id: None, ref available } if available == &vec![existing.id]));
        assert_eq!(h.gateway.initialize_calls(), 0);
    }

    #[tokio::test]
    async fn blank_profile_uses_default_payer_and_booking_total() {
        let h = harness();
        let user = User::new("".into(), " ".into(), None);
        let booking = seed_booking(&h, &user).await;

        h.orchestrator
            .initiate(InitiatePayment { booking_id: Some(booking.id), amount: None, currency: Some("USD".into()) })
            .await
            .unwrap();

        let sent = h.gateway.last_request().unwrap();
        assert_eq!(sent.first_name, "Customer");
        assert_eq!(sent.last_name, "");
        assert_eq!(sent.amount, dec!(1400));
        assert_eq!(sent.currency, "USD");
    }

    #[tokio::test]
    async fn gateway_rejection_stores_nothing() {
        let h = harness();
        let user = User::new("Sara".into(), "Tadesse".into(), None);
        let booking = seed_booking(&h, &user).await;
        h.gateway.on_initialize(Reply::Reject { status: 400, detail: "{\"message\":\"bad amount\"}".into() });

        let err = h.orchestrator.initiate(initiate(booking.id)).await.unwrap_err();
        assert!(matches!(err, PaymentError::Upstream { status: 400, ref detail } if detail.contains("bad amount")));
        assert_eq!(h.payments.count().await, 0);
    }

    #[tokio::test]
    async fn transport_failure_and_missing_url_are_internal() {
        let h = harness();
        let user = User::new("Sara".into(), "Tadesse".into(), None);
        let booking = seed_booking(&h, &user).await;

        h.gateway.on_initialize(Reply::Unreachable);
        let err = h.orchestrator.initiate(initiate(booking.id)).await.unwrap_err();
        assert!(matches!(err, PaymentError::Internal(_)));

        h.gateway.on_initialize(Reply::Ok(json!({"status": "success", "data": {}})));
        let err = h.orchestrator.initiate(initiate(booking.id)).await.unwrap_err();
        assert!(matches!(err, PaymentError::Internal(_)));
        assert_eq!(h.payments.count().await, 0);
    }

    #[tokio::test]
    async fn verify_unknown_reference_is_not_found() {
        let h = harness();
        let err = h.orchestrator.verify("nope").await.unwrap_err();
        assert!(matches!(err, PaymentError::PaymentNotFound(_)));
        assert_eq!(h.gateway.verify_calls(), 0);
    }

    #[tokio::test]
    async fn verify_maps_gateway_status() {
        let h = harness();
        let user = User::new("Sara".into(), "Tadesse".into(), None);
        let booking = seed_booking(&h, &user).await;
        let checkout = h.orchestrator.initiate(initiate(booking.id)).await.unwrap();

        h.gateway.verify_status("failed/cancelled");
        let status = h.orchestrator.verify(&checkout.transaction_ref).await.unwrap();
        assert_eq!(status, PaymentStatus::Failed);

        h.gateway.verify_status("success");
        let status = h.orchestrator.verify(&checkout.transaction_ref).await.unwrap();
        assert_eq!(status, PaymentStatus::Completed);

        let stored = h.payments.find_by_reference(&checkout.transaction_ref).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Completed);
        assert_eq!(stored.gateway_response["data"]["status"], json!("success"));
    }

    #[tokio::test]
    async fn verify_rejection_leaves_payment_pending() {
        let h = harness();
        let user = User::new("Sara".into(), "Tadesse".into(), None);
        let booking = seed_booking(&h, &user).await;
        let checkout = h.orchestrator.initiate(initiate(booking.id)).await.unwrap();

        h.gateway.on_verify(Reply::Reject { status: 404, detail: "Invalid transaction".into() });
        let err = h.orchestrator.verify(&checkout.transaction_ref).await.unwrap_err();
        assert!(matches!(err, PaymentError::Upstream { status: 404, .. }));

        let stored = h.payments.find_by_reference(&checkout.transaction_ref).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);
    }
}
