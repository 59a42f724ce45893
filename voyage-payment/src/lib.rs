pub mod chapa;
pub mod error;
pub mod mock;
pub mod orchestrator;

pub use chapa::ChapaAdapter;
pub use error::PaymentError;
pub use orchestrator::{Checkout, InitiatePayment, PaymentOrchestrator, PaymentSettings};
