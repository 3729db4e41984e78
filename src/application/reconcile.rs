use super::booking::require_login;
use crate::domain::payment::VerifiedPayment;
use crate::domain::ports::{PendingPaymentStoreBox, SharedSession, TicketBackendBox};
use crate::error::Result;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub settled: Vec<String>,
    pub still_pending: Vec<String>,
}

/// Saves tickets for payments that verified but were never persisted.
///
/// Each retry reuses the original attempt id, so a ticket service that saw the
/// first request can recognise the resubmission.
pub struct Reconciler {
    tickets: TicketBackendBox,
    pending: PendingPaymentStoreBox,
    session: SharedSession,
}

impl Reconciler {
    pub fn new(
        tickets: TicketBackendBox,
        pending: PendingPaymentStoreBox,
        session: SharedSession,
    ) -> Self {
        Self {
            tickets,
            pending,
            session,
        }
    }

    pub async fn run(&self) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let pending = self.pending.get_all().await?;
        if pending.is_empty() {
            return Ok(report);
        }
        require_login(self.session.as_ref())?;

        for record in pending {
            let order_id = record.order_id().to_string();
            // Only written after the verify endpoint accepted this confirmation.
            let payment = VerifiedPayment::new(record.order.clone(), record.confirmation.clone());

            match self
                .tickets
                .book_ticket(&record.request, &payment, record.attempt)
                .await
            {
                Ok(_) => {
                    self.pending.remove(&order_id).await?;
                    info!(attempt = %record.attempt, %order_id, "pending payment settled");
                    report.settled.push(order_id);
                }
                Err(e) => {
                    warn!(
                        attempt = %record.attempt, %order_id, error = %e,
                        "pending payment still unsettled"
                    );
                    report.still_pending.push(order_id);
                }
            }
        }

        Ok(report)
    }
}
