use crate::error::BookingError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;

/// Minor units per rupee (paise).
pub const MINOR_UNITS_PER_RUPEE: u32 = 100;

/// A rupee value as shown to passengers.
///
/// Wraps `rust_decimal::Decimal` so fares never pick up float rounding.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Rupees(pub Decimal);

impl Rupees {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Converts to gateway minor units, refusing fractional paise.
    pub fn to_minor_units(self) -> Result<MinorUnits, BookingError> {
        let scaled = self
            .0
            .checked_mul(Decimal::from(MINOR_UNITS_PER_RUPEE))
            .ok_or_else(|| BookingError::ValidationError(format!("{self} is out of range")))?;
        if scaled.fract() != Decimal::ZERO {
            return Err(BookingError::ValidationError(format!(
                "{self} is not a whole number of paise"
            )));
        }
        scaled
            .to_u64()
            .map(MinorUnits)
            .ok_or_else(|| BookingError::ValidationError(format!("{self} is out of range")))
    }
}

impl fmt::Display for Rupees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0.normalize())
    }
}

impl Mul<SeatCount> for Rupees {
    type Output = Result<Rupees, BookingError>;
    fn mul(self, rhs: SeatCount) -> Self::Output {
        self.0
            .checked_mul(Decimal::from(rhs.get()))
            .map(Self)
            .ok_or_else(|| {
                BookingError::ValidationError(format!(
                    "{self} for {} seats is out of range",
                    rhs.get()
                ))
            })
    }
}

/// Amount in the gateway's minor currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(pub u64);

impl MinorUnits {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of seats in one booking. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SeatCount(u32);

impl SeatCount {
    pub fn new(value: u32) -> Result<Self, BookingError> {
        if value >= 1 {
            Ok(Self(value))
        } else {
            Err(BookingError::ValidationError(
                "Seat count must be at least 1".to_string(),
            ))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for SeatCount {
    type Error = BookingError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SeatCount> for u32 {
    fn from(seats: SeatCount) -> Self {
        seats.0
    }
}

/// Flat per-seat fare.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fare {
    unit_price: Rupees,
}

impl Fare {
    pub fn new(unit_price: Rupees) -> Result<Self, BookingError> {
        if unit_price.0 > Decimal::ZERO {
            Ok(Self { unit_price })
        } else {
            Err(BookingError::ValidationError(
                "Unit price must be positive".to_string(),
            ))
        }
    }

    pub fn unit_price(&self) -> Rupees {
        self.unit_price
    }

    /// Total shown to the passenger.
    pub fn total(&self, seats: SeatCount) -> Result<Rupees, BookingError> {
        self.unit_price * seats
    }

    /// Amount sent to the gateway: `seats * unit_price * 100`.
    pub fn gateway_amount(&self, seats: SeatCount) -> Result<MinorUnits, BookingError> {
        self.total(seats)?.to_minor_units()
    }
}
