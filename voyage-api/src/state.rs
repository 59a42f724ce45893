use std::sync::Arc;
use voyage_core::repository::{
    BookingRepository, ListingRepository, PaymentRepository, UserRepository,
};
use voyage_payment::PaymentOrchestrator;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub listing_repo: Arc<dyn ListingRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub payment_orchestrator: Arc<PaymentOrchestrator>,
    pub auth: AuthConfig,
}
