use async_trait::async_trait;
use uuid::Uuid;

use crate::{Booking, CoreResult, Listing, Payment, User};

/// Repository trait for listing data access
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn list_listings(&self) -> CoreResult<Vec<Listing>>;

    async fn get_listing(&self, id: Uuid) -> CoreResult<Option<Listing>>;

    async fn create_listing(&self, listing: &Listing) -> CoreResult<()>;

    /// Fails with `NotFound` when no row matches `listing.id`.
    async fn update_listing(&self, listing: &Listing) -> CoreResult<()>;

    /// Returns whether a row was removed.
    async fn delete_listing(&self, id: Uuid) -> CoreResult<bool>;
}

/// Repository trait for booking data access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn list_bookings(&self) -> CoreResult<Vec<Booking>>;

    async fn get_booking(&self, id: Uuid) -> CoreResult<Option<Booking>>;

    async fn create_booking(&self, booking: &Booking) -> CoreResult<()>;

    async fn update_booking(&self, booking: &Booking) -> CoreResult<()>;

    async fn delete_booking(&self, id: Uuid) -> CoreResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> CoreResult<()>;

    async fn get_user(&self, id: Uuid) -> CoreResult<Option<User>>;
}

/// Repository trait for payment records. Payments are never deleted.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Inserts atomically with respect to `booking_id`: a second payment for
    /// the same booking fails with `AlreadyExists`.
    async fn create_payment(&self, payment: &Payment) -> CoreResult<()>;

    async fn find_by_booking(&self, booking_id: Uuid) -> CoreResult<Option<Payment>>;

    async fn find_by_reference(&self, transaction_ref: &str) -> CoreResult<Option<Payment>>;

    /// Persists status and gateway response of an existing payment.
    async fn update_payment(&self, payment: &Payment) -> CoreResult<()>;
}
