#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use railbook::application::booking::CheckoutPolicy;
use railbook::domain::booking::{AttemptId, BookingRequest, Passenger};
use railbook::domain::money::{Fare, MinorUnits, Rupees, SeatCount};
use railbook::domain::payment::{
    CheckoutBranding, CheckoutOptions, CheckoutOutcome, PaymentConfirmation, PaymentOrder,
    Verification, VerifiedPayment,
};
use railbook::domain::ports::{CheckoutGateway, PaymentBackend, PendingPaymentStore, TicketBackend};
use railbook::domain::ticket::{BookingReceipt, CancellationReceipt, PendingPayment, TicketRecord};
use railbook::error::{BookingError, Result};
use rust_decimal_macros::dec;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Serialize)]
struct Claims<'a> {
    exp: i64,
    email: &'a str,
    role: &'a str,
}

pub fn token_expiring_in(offset: ChronoDuration) -> String {
    encode(
        &Header::default(),
        &Claims {
            exp: (Utc::now() + offset).timestamp(),
            email: "asha@example.com",
            role: "USER",
        },
        &EncodingKey::from_secret(b"gateway-secret"),
    )
    .unwrap()
}

pub fn live_token() -> String {
    token_expiring_in(ChronoDuration::hours(1))
}

pub fn expired_token() -> String {
    token_expiring_in(ChronoDuration::minutes(-5))
}

pub fn request(seats: u32) -> BookingRequest {
    BookingRequest::new(
        7,
        Passenger {
            full_name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            age: 31,
        },
        NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
        SeatCount::new(seats).unwrap(),
    )
    .unwrap()
}

pub fn policy(checkout_timeout: Duration) -> CheckoutPolicy {
    CheckoutPolicy {
        fare: Fare::new(Rupees::new(dec!(140))).unwrap(),
        branding: CheckoutBranding {
            key: "rzp_test_key".into(),
            merchant_name: "Train Ticket Booking".into(),
            description: "Book your train tickets with ease".into(),
            theme_color: "#3399cc".into(),
        },
        checkout_timeout,
    }
}

/// Payment service double. Hands out a fixed order id and a fixed verdict.
#[derive(Clone)]
pub struct ScriptedPayments {
    pub order_id: String,
    pub accept: bool,
    pub orders: Arc<Mutex<Vec<(MinorUnits, AttemptId)>>>,
    pub verifications: Arc<Mutex<Vec<(String, String, AttemptId)>>>,
}

impl ScriptedPayments {
    pub fn new(order_id: &str, accept: bool) -> Self {
        Self {
            order_id: order_id.into(),
            accept,
            orders: Arc::default(),
            verifications: Arc::default(),
        }
    }
}

#[async_trait]
impl PaymentBackend for ScriptedPayments {
    async fn create_order(&self, amount: MinorUnits, attempt: AttemptId) -> Result<PaymentOrder> {
        self.orders.lock().unwrap().push((amount, attempt));
        Ok(PaymentOrder {
            order_id: self.order_id.clone(),
            amount,
            currency: "INR".into(),
        })
    }

    async fn verify_payment(
        &self,
        order: &PaymentOrder,
        confirmation: &PaymentConfirmation,
        attempt: AttemptId,
    ) -> Result<Verification> {
        self.verifications.lock().unwrap().push((
            order.order_id.clone(),
            confirmation.payment_id.clone(),
            attempt,
        ));
        Ok(Verification {
            accepted: self.accept,
            message: if self.accept { "true" } else { "false" }.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookCall {
    pub order_id: String,
    pub payment_id: String,
    pub amount: MinorUnits,
    pub attempt: AttemptId,
}

/// Ticket service double. Fails the first `failures` booking calls with a 503.
#[derive(Clone, Default)]
pub struct RecordingTickets {
    pub calls: Arc<Mutex<Vec<BookCall>>>,
    pub failures: Arc<AtomicUsize>,
    pub records: Vec<TicketRecord>,
}

impl RecordingTickets {
    pub fn failing(times: usize) -> Self {
        let tickets = Self::default();
        tickets.failures.store(times, Ordering::SeqCst);
        tickets
    }

    pub fn calls(&self) -> Vec<BookCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketBackend for RecordingTickets {
    async fn book_ticket(
        &self,
        _request: &BookingRequest,
        payment: &VerifiedPayment,
        attempt: AttemptId,
    ) -> Result<BookingReceipt> {
        self.calls.lock().unwrap().push(BookCall {
            order_id: payment.order().order_id.clone(),
            payment_id: payment.confirmation().payment_id.clone(),
            amount: payment.order().amount,
            attempt,
        });
        let left = self.failures.load(Ordering::SeqCst);
        if left > 0 {
            self.failures.store(left - 1, Ordering::SeqCst);
            return Err(BookingError::Http {
                endpoint: "/bookTicket".into(),
                status: 503,
                body: "ticket service unavailable".into(),
            });
        }
        Ok(BookingReceipt::from_body(
            r#"{"ticket_id":99,"ticketNumber":"TKT-99","seatNumbers":"[11,12]","status":"CONFIRMED"}"#
                .into(),
        ))
    }

    async fn list_tickets(&self) -> Result<Vec<TicketRecord>> {
        Ok(self.records.clone())
    }

    async fn cancel_ticket(&self, ticket_id: u64) -> Result<CancellationReceipt> {
        Ok(CancellationReceipt {
            message: format!("Ticket {ticket_id} cancelled"),
            ..Default::default()
        })
    }
}

pub enum CheckoutScript {
    /// Pays and reports the given order id back.
    Pay { order_id: Option<String> },
    Abandon,
    /// Never resolves.
    Hang,
}

pub struct ScriptedCheckout {
    pub script: CheckoutScript,
    pub opened: Arc<Mutex<Vec<CheckoutOptions>>>,
}

impl ScriptedCheckout {
    pub fn new(script: CheckoutScript) -> Self {
        Self {
            script,
            opened: Arc::default(),
        }
    }
}

#[async_trait]
impl CheckoutGateway for ScriptedCheckout {
    async fn open(&self, options: &CheckoutOptions) -> Result<CheckoutOutcome> {
        self.opened.lock().unwrap().push(options.clone());
        match &self.script {
            CheckoutScript::Pay { order_id } => Ok(CheckoutOutcome::Completed(PaymentConfirmation {
                order_id: order_id.clone().unwrap_or_else(|| options.order_id.clone()),
                payment_id: "pay_Q1".into(),
                signature: "5f1c".into(),
            })),
            CheckoutScript::Abandon => Ok(CheckoutOutcome::Abandoned),
            CheckoutScript::Hang => std::future::pending().await,
        }
    }
}

/// Pending store whose writes always fail.
#[derive(Clone, Default)]
pub struct BrokenPendingStore {
    pub attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl PendingPaymentStore for BrokenPendingStore {
    async fn store(&self, _pending: PendingPayment) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(BookingError::StorageError("disk full".into()))
    }

    async fn remove(&self, _order_id: &str) -> Result<()> {
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<PendingPayment>> {
        Ok(Vec::new())
    }
}
