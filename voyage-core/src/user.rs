use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_FIRST_NAME: &str = "Customer";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(first_name: String, last_name: String, email: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            email,
            created_at: Utc::now(),
        }
    }

    /// Name handed to the gateway; blank profiles fall back to "Customer".
    pub fn payer_first_name(&self) -> &str {
        match self.first_name.trim() {
            "" => DEFAULT_FIRST_NAME,
            name => name,
        }
    }

    pub fn payer_last_name(&self) -> &str {
        self.last_name.trim()
    }
}
