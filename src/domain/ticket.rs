use super::booking::{AttemptId, BookingRequest, Passenger};
use super::money::SeatCount;
use super::payment::{PaymentConfirmation, PaymentOrder, VerifiedPayment};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    #[default]
    Waiting,
    Confirmed,
    Cancelled,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TicketStatus::Waiting => "WAITING",
            TicketStatus::Confirmed => "CONFIRMED",
            TicketStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// A ticket as the ticket service stores it.
///
/// Every field is optional on the wire; older records miss the seat class
/// and seat numbers.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketRecord {
    #[serde(rename = "ticket_id")]
    pub ticket_id: Option<u64>,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub full_name: Option<String>,
    pub age: Option<u32>,
    pub email: Option<String>,
    pub ticket_number: Option<String>,
    pub amount: Option<Decimal>,
    pub booking_date: Option<NaiveDate>,
    pub user_email: Option<String>,
    pub train_id: Option<u64>,
    pub train_name: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub no_of_seats: Option<u32>,
    pub seat_class: Option<String>,
    /// JSON array text, e.g. `"[1,2,3]"`.
    pub seat_numbers: Option<String>,
    pub departure_time: Option<String>,
    pub status: TicketStatus,
}

impl TicketRecord {
    /// Seat numbers stored as JSON text. Unparseable text yields no seats.
    pub fn seat_number_list(&self) -> Vec<u32> {
        self.seat_numbers
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}

/// What the booking endpoint answered.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingReceipt {
    pub raw: String,
    pub record: Option<TicketRecord>,
}

impl BookingReceipt {
    pub fn from_body(raw: String) -> Self {
        let record = if raw.trim_start().starts_with('{') {
            serde_json::from_str(&raw).ok()
        } else {
            None
        };
        Self { raw, record }
    }
}

/// A paid booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub train_id: u64,
    pub passenger: Passenger,
    pub travel_date: NaiveDate,
    pub seats: SeatCount,
    pub order_id: String,
    pub payment_id: String,
    pub status: TicketStatus,
    pub ticket_number: Option<String>,
    pub seat_numbers: Vec<u32>,
}

impl Ticket {
    pub fn confirmed(
        request: &BookingRequest,
        payment: &VerifiedPayment,
        receipt: &BookingReceipt,
    ) -> Self {
        let record = receipt.record.as_ref();
        Self {
            train_id: request.train_id,
            passenger: request.passenger.clone(),
            travel_date: request.travel_date,
            seats: request.seats,
            order_id: payment.order().order_id.clone(),
            payment_id: payment.confirmation().payment_id.clone(),
            status: TicketStatus::Confirmed,
            ticket_number: record.and_then(|r| r.ticket_number.clone()),
            seat_numbers: record.map(TicketRecord::seat_number_list).unwrap_or_default(),
        }
    }
}

/// Answer of the cancel-with-refund endpoint.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CancellationReceipt {
    pub message: String,
    pub refund_processed: bool,
    pub refund_id: Option<String>,
    pub refund_amount: Decimal,
    pub original_amount: Decimal,
    pub cancellation_fee: Decimal,
    pub refund_status: Option<String>,
    pub expected_refund_time: Option<String>,
}

/// A payment that verified but whose ticket was never saved.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PendingPayment {
    pub attempt: AttemptId,
    pub request: BookingRequest,
    pub order: PaymentOrder,
    pub confirmation: PaymentConfirmation,
    pub recorded_at: DateTime<Utc>,
}

impl PendingPayment {
    pub fn new(attempt: AttemptId, request: BookingRequest, payment: &VerifiedPayment) -> Self {
        Self {
            attempt,
            request,
            order: payment.order().clone(),
            confirmation: payment.confirmation().clone(),
            recorded_at: Utc::now(),
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order.order_id
    }
}
