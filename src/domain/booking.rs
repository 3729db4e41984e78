use super::money::SeatCount;
use crate::error::BookingError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Client-generated key for one booking attempt.
///
/// Sent as `Idempotency-Key` on every call of the attempt so the backend can
/// collapse resubmissions instead of opening duplicate gateway orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(Uuid);

impl AttemptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub full_name: String,
    pub email: String,
    pub age: u8,
}

/// What the passenger filled into the booking form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub train_id: u64,
    pub passenger: Passenger,
    pub travel_date: NaiveDate,
    pub seats: SeatCount,
}

impl BookingRequest {
    pub fn new(
        train_id: u64,
        passenger: Passenger,
        travel_date: NaiveDate,
        seats: SeatCount,
    ) -> Result<Self, BookingError> {
        let full_name = passenger.full_name.trim();
        if full_name.is_empty() {
            return Err(BookingError::ValidationError(
                "Full name is required".to_string(),
            ));
        }
        let email = passenger.email.trim();
        if !is_plausible_email(email) {
            return Err(BookingError::ValidationError(format!(
                "Invalid email format: {email}"
            )));
        }

        Ok(Self {
            train_id,
            passenger: Passenger {
                full_name: full_name.to_string(),
                email: email.to_string(),
                age: passenger.age,
            },
            travel_date,
            seats,
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.ends_with('.')
        }
        None => false,
    }
}
