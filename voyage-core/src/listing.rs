use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// A bookable travel offering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price_per_night: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create or full update.
#[derive(Debug, Clone, Deserialize)]
pub struct NewListing {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub price_per_night: Decimal,
}

/// Body of a partial update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price_per_night: Option<Decimal>,
}

impl NewListing {
    pub fn validate(&self) -> CoreResult<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("title may not be blank".to_string()));
        }
        if self.price_per_night.is_sign_negative() {
            return Err(CoreError::Validation("price_per_night may not be negative".to_string()));
        }
        Ok(())
    }
}

impl Listing {
    pub fn create(new: NewListing) -> CoreResult<Self> {
        new.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            location: new.location,
            price_per_night: new.price_per_night,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn replace(&mut self, new: NewListing) -> CoreResult<()> {
        new.validate()?;
        self.title = new.title;
        self.description = new.description;
        self.location = new.location;
        self.price_per_night = new.price_per_night;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn apply(&mut self, patch: ListingPatch) -> CoreResult<()> {
        let merged = NewListing {
            title: patch.title.unwrap_or_else(|| self.title.clone()),
            description: patch.description.unwrap_or_else(|| self.description.clone()),
            location: patch.location.unwrap_or_else(|| self.location.clone()),
            price_per_night: patch.price_per_night.unwrap_or(self.price_per_night),
        };
        self.replace(merged)
    }

    /// Price of a stay from `check_in` up to (not including) `check_out`.
    pub fn quote(&self, check_in: NaiveDate, check_out: NaiveDate) -> Decimal {
        let nights = (check_out - check_in).num_days().max(0);
        self.price_per_night * Decimal::from(nights)
    }
}
