use crate::domain::booking::{AttemptId, BookingRequest};
use crate::domain::money::Fare;
use crate::domain::payment::{
    CheckoutBranding, CheckoutOptions, CheckoutOutcome, VerifiedPayment,
};
use crate::domain::ports::{
    CheckoutGatewayBox, PaymentBackendBox, PendingPaymentStoreBox, SessionStore,
    SharedSession, TicketBackendBox,
};
use crate::domain::session::AuthState;
use crate::domain::ticket::{BookingReceipt, PendingPayment, Ticket};
use crate::error::{BookingError, Result};
use chrono::Utc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Fails unless the session's current token is live.
pub fn require_login(session: &dyn SessionStore) -> Result<()> {
    let token = session.token()?;
    match AuthState::inspect(token.as_deref(), Utc::now()) {
        AuthState::Authenticated { .. } => Ok(()),
        AuthState::Expired => Err(BookingError::SessionExpired),
        AuthState::Anonymous => Err(BookingError::NotAuthenticated),
    }
}

/// Checkout parameters that stay fixed across attempts.
#[derive(Debug, Clone)]
pub struct CheckoutPolicy {
    pub fare: Fare,
    pub branding: CheckoutBranding,
    pub checkout_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingOutcome {
    pub attempt: AttemptId,
    pub ticket: Ticket,
    pub receipt: BookingReceipt,
}

/// Runs the payment confirmation sequence for a booking.
///
/// Order creation, checkout, verification and persistence happen strictly in
/// that order. A payment that verifies but cannot be saved is written to the
/// pending store for the `Reconciler` to finish later.
pub struct BookingService {
    payments: PaymentBackendBox,
    tickets: TicketBackendBox,
    checkout: CheckoutGatewayBox,
    pending: PendingPaymentStoreBox,
    session: SharedSession,
    policy: CheckoutPolicy,
}

impl BookingService {
    pub fn new(
        payments: PaymentBackendBox,
        tickets: TicketBackendBox,
        checkout: CheckoutGatewayBox,
        pending: PendingPaymentStoreBox,
        session: SharedSession,
        policy: CheckoutPolicy,
    ) -> Self {
        Self {
            payments,
            tickets,
            checkout,
            pending,
            session,
            policy,
        }
    }

    pub async fn book(&self, request: BookingRequest) -> Result<BookingOutcome> {
        require_login(self.session.as_ref())?;

        let attempt = AttemptId::new();
        let amount = self.policy.fare.gateway_amount(request.seats)?;

        let order = self.payments.create_order(amount, attempt).await?;
        info!(%attempt, order_id = %order.order_id, %amount, "payment order created");

        let options = CheckoutOptions::new(&self.policy.branding, &order, &request);
        let checkout = self.checkout.open(&options);
        let outcome = tokio::time::timeout(self.policy.checkout_timeout, checkout)
            .await
            .unwrap_or(Ok(CheckoutOutcome::Abandoned))?;

        let confirmation = match outcome {
            CheckoutOutcome::Completed(confirmation) => confirmation,
            CheckoutOutcome::Abandoned => {
                warn!(%attempt, order_id = %order.order_id, "checkout abandoned");
                return Err(BookingError::CheckoutAbandoned(order.order_id));
            }
        };

        if confirmation.order_id != order.order_id {
            error!(
                %attempt,
                expected = %order.order_id,
                actual = %confirmation.order_id,
                "checkout confirmed a different order"
            );
            return Err(BookingError::OrderMismatch {
                expected: order.order_id,
                actual: confirmation.order_id,
            });
        }

        let verification = self
            .payments
            .verify_payment(&order, &confirmation, attempt)
            .await?;
        if !verification.accepted {
            error!(%attempt, order_id = %order.order_id, "payment signature rejected");
            return Err(BookingError::SignatureRejected(order.order_id));
        }
        info!(
            %attempt,
            order_id = %order.order_id,
            payment_id = %confirmation.payment_id,
            "payment verified"
        );

        let payment = VerifiedPayment::new(order, confirmation);
        let receipt = self.persist(&request, &payment, attempt).await?;
        let ticket = Ticket::confirmed(&request, &payment, &receipt);
        info!(%attempt, order_id = %ticket.order_id, "ticket booked");

        Ok(BookingOutcome {
            attempt,
            ticket,
            receipt,
        })
    }

    async fn persist(
        &self,
        request: &BookingRequest,
        payment: &VerifiedPayment,
        attempt: AttemptId,
    ) -> Result<BookingReceipt> {
        match self.tickets.book_ticket(request, payment, attempt).await {
            Ok(receipt) => Ok(receipt),
            Err(source) => {
                let order_id = payment.order().order_id.clone();
                let payment_id = payment.confirmation().payment_id.clone();
                error!(
                    %attempt, %order_id, %payment_id, error = %source,
                    "verified payment has no ticket"
                );

                let pending = PendingPayment::new(attempt, request.clone(), payment);
                match self.pending.store(pending).await {
                    Ok(()) => Err(BookingError::BookingNotPersisted {
                        order_id,
                        payment_id,
                        attempt,
                        source: Box::new(source),
                    }),
                    Err(e) => {
                        error!(
                            %attempt, %order_id, %payment_id, error = %e,
                            "failed to record pending payment"
                        );
                        Err(BookingError::PaymentUnrecorded {
                            order_id,
                            payment_id,
                            attempt,
                            booking_error: Box::new(source),
                            source: Box::new(e),
                        })
                    }
                }
            }
        }
    }
}
