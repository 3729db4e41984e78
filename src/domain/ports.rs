use super::booking::{AttemptId, BookingRequest};
use super::money::MinorUnits;
use super::payment::{
    CheckoutOptions, CheckoutOutcome, PaymentConfirmation, PaymentOrder, Verification,
    VerifiedPayment,
};
use super::ticket::{BookingReceipt, CancellationReceipt, PendingPayment, TicketRecord};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Order creation and signature verification on the payment service.
#[async_trait]
pub trait PaymentBackend: Send + Sync {
    async fn create_order(&self, amount: MinorUnits, attempt: AttemptId) -> Result<PaymentOrder>;
    async fn verify_payment(
        &self,
        order: &PaymentOrder,
        confirmation: &PaymentConfirmation,
        attempt: AttemptId,
    ) -> Result<Verification>;
}

/// Ticket persistence and lookups on the ticket service.
#[async_trait]
pub trait TicketBackend: Send + Sync {
    async fn book_ticket(
        &self,
        request: &BookingRequest,
        payment: &VerifiedPayment,
        attempt: AttemptId,
    ) -> Result<BookingReceipt>;
    async fn list_tickets(&self) -> Result<Vec<TicketRecord>>;
    async fn cancel_ticket(&self, ticket_id: u64) -> Result<CancellationReceipt>;
}

/// The hosted checkout surface. Resolves once the passenger pays or walks away.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn open(&self, options: &CheckoutOptions) -> Result<CheckoutOutcome>;
}

#[async_trait]
pub trait PendingPaymentStore: Send + Sync {
    async fn store(&self, pending: PendingPayment) -> Result<()>;
    async fn remove(&self, order_id: &str) -> Result<()>;
    async fn get_all(&self) -> Result<Vec<PendingPayment>>;
}

/// Source of the bearer token. Read on every call, never cached.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Result<Option<String>>;
}

pub type PaymentBackendBox = Box<dyn PaymentBackend>;
pub type TicketBackendBox = Box<dyn TicketBackend>;
pub type CheckoutGatewayBox = Box<dyn CheckoutGateway>;
pub type PendingPaymentStoreBox = Box<dyn PendingPaymentStore>;
pub type SharedSession = Arc<dyn SessionStore>;
