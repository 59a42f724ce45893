use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult, Listing};

/// A reservation of a [`Listing`] by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub listing_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    /// Quoted from the listing when omitted.
    pub total_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingPatch {
    pub listing_id: Option<Uuid>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub total_price: Option<Decimal>,
}

fn validate_stay(check_in: NaiveDate, check_out: NaiveDate, total: Decimal) -> CoreResult<()> {
    if check_out <= check_in {
        return Err(CoreError::Validation(
            "check_out_date must be after check_in_date".to_string(),
        ));
    }
    if total.is_sign_negative() {
        return Err(CoreError::Validation("total_price may not be negative".to_string()));
    }
    Ok(())
}

impl Booking {
    /// `listing` must be the listing named by `new.listing_id`.
    pub fn create(new: NewBooking, user_id: Uuid, listing: &Listing) -> CoreResult<Self> {
        let total_price = new
            .total_price
            .unwrap_or_else(|| listing.quote(new.check_in_date, new.check_out_date));
        validate_stay(new.check_in_date, new.check_out_date, total_price)?;

        Ok(Self {
            id: Uuid::new_v4(),
            listing_id: listing.id,
            user_id,
            check_in_date: new.check_in_date,
            check_out_date: new.check_out_date,
            total_price,
            created_at: Utc::now(),
        })
    }

    /// Full update. The owner never changes.
    pub fn replace(&mut self, new: NewBooking, listing: &Listing) -> CoreResult<()> {
        let total_price = new
            .total_price
            .unwrap_or_else(|| listing.quote(new.check_in_date, new.check_out_date));
        validate_stay(new.check_in_date, new.check_out_date, total_price)?;

        self.listing_id = listing.id;
        self.check_in_date = new.check_in_date;
        self.check_out_date = new.check_out_date;
        self.total_price = total_price;
        Ok(())
    }

    /// Partial update. `listing` must be the listing the booking points at
    /// after the patch; a changed stay or listing without an explicit
    /// `total_price` is re-quoted from it.
    pub fn apply(&mut self, patch: BookingPatch, listing: &Listing) -> CoreResult<()> {
        let check_in = patch.check_in_date.unwrap_or(self.check_in_date);
        let check_out = patch.check_out_date.unwrap_or(self.check_out_date);
        let stay_changed = check_in != self.check_in_date
            || check_out != self.check_out_date
            || listing.id != self.listing_id;
        let total = match patch.total_price {
            Some(total) => total,
            None if stay_changed => listing.quote(check_in, check_out),
            None => self.total_price,
        };
        validate_stay(check_in, check_out, total)?;

        self.listing_id = listing.id;
        self.check_in_date = check_in;
        self.check_out_date = check_out;
        self.total_price = total;
        Ok(())
    }
}
