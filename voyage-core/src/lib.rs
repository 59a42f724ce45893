pub mod booking;
pub mod listing;
pub mod payment;
pub mod pii;
pub mod repository;
pub mod user;

pub use booking::{Booking, BookingPatch, NewBooking};
pub use listing::{Listing, ListingPatch, NewListing};
pub use payment::{Payment, PaymentStatus};
pub use user::User;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
