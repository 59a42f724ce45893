pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod listing_repo;
pub mod memory;
pub mod payment_repo;
pub mod user_repo;

pub use booking_repo::StoreBookingRepository;
pub use database::DbClient;
pub use listing_repo::StoreListingRepository;
pub use memory::{
    InMemoryBookingRepository, InMemoryListingRepository, InMemoryPaymentRepository,
    InMemoryUserRepository,
};
pub use payment_repo::StorePaymentRepository;
pub use user_repo::StoreUserRepository;
