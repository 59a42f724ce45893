//! Process-local repositories backed by `RwLock<HashMap>`. Used by tests and
//! for running the API without Postgres.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use voyage_core::repository::{
    BookingRepository, ListingRepository, PaymentRepository, UserRepository,
};
use voyage_core::{Booking, CoreError, CoreResult, Listing, Payment, User};

#[derive(Default, Clone)]
pub struct InMemoryListingRepository {
    listings: Arc<RwLock<HashMap<Uuid, Listing>>>,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn list_listings(&self) -> CoreResult<Vec<Listing>> {
        let listings = self.listings.read().await;
        let mut all: Vec<Listing> = listings.values().cloned().collect();
        all.sort_by_key(|l| l.created_at);
        Ok(all)
    }

    async fn get_listing(&self, id: Uuid) -> CoreResult<Option<Listing>> {
        Ok(self.listings.read().await.get(&id).cloned())
    }

    async fn create_listing(&self, listing: &Listing) -> CoreResult<()> {
        let mut listings = self.listings.write().await;
        if listings.contains_key(&listing.id) {
            return Err(CoreError::AlreadyExists(format!("listing {}", listing.id)));
        }
        listings.insert(listing.id, listing.clone());
        Ok(())
    }

    async fn update_listing(&self, listing: &Listing) -> CoreResult<()> {
        let mut listings = self.listings.write().await;
        match listings.get_mut(&listing.id) {
            Some(existing) => {
                *existing = listing.clone();
                Ok(())
            }
            None => Err(CoreError::NotFound(format!("listing {}", listing.id))),
        }
    }

    async fn delete_listing(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.listings.write().await.remove(&id).is_some())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryBookingRepository {
    bookings: Arc<RwLock<HashMap<Uuid, Booking>>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn list_bookings(&self) -> CoreResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mut all: Vec<Booking> = bookings.values().cloned().collect();
        all.sort_by_key(|b| b.created_at);
        Ok(all)
    }

    async fn get_booking(&self, id: Uuid) -> CoreResult<Option<Booking>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn create_booking(&self, booking: &Booking) -> CoreResult<()> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&booking.id) {
            return Err(CoreError::AlreadyExists(format!("booking {}", booking.id)));
        }
        bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn update_booking(&self, booking: &Booking) -> CoreResult<()> {
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&booking.id) {
            Some(existing) => {
                *existing = booking.clone();
                Ok(())
            }
            None => Err(CoreError::NotFound(format!("booking {}", booking.id))),
        }
    }

    async fn delete_booking(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.bookings.write().await.remove(&id).is_some())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: &User) -> CoreResult<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

/// Payments keyed by booking id; the map key enforces one payment per booking.
#[derive(Default, Clone)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<HashMap<Uuid, Payment>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.payments.read().await.len()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn create_payment(&self, payment: &Payment) -> CoreResult<()> {
        let mut payments = self.payments.write().await;
        if payments.contains_key(&payment.booking_id)
            || payments.values().any(|p| p.transaction_ref == payment.transaction_ref)
        {
            return Err(CoreError::AlreadyExists(format!("payment for booking {}", payment.booking_id)));
        }
        payments.insert(payment.booking_id, payment.clone());
        Ok(())
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> CoreResult<Option<Payment>> {
        Ok(self.payments.read().await.get(&booking_id).cloned())
    }

    async fn find_by_reference(&self, transaction_ref: &str) -> CoreResult<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.values().find(|p| p.transaction_ref == transaction_ref).cloned())
    }

    async fn update_payment(&self, payment: &Payment) -> CoreResult<()> {
        let mut payments = self.payments.write().await;
        match payments.get_mut(&payment.booking_id) {
            Some(existing) if existing.id == payment.id => {
                *existing = payment.clone();
                Ok(())
            }
            _ => Err(CoreError::NotFound(format!("payment {}", payment.transaction_ref))),
        }
    }
}
