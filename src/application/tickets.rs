use crate::domain::ports::TicketBackendBox;
use crate::domain::ticket::{CancellationReceipt, TicketRecord, TicketStatus};
use crate::error::{BookingError, Result};
use tracing::info;

/// Read and cancel operations on already booked tickets.
pub struct TicketDesk {
    tickets: TicketBackendBox,
}

impl TicketDesk {
    pub fn new(tickets: TicketBackendBox) -> Self {
        Self { tickets }
    }

    /// All tickets visible to the session, newest booking date first.
    pub async fn list(&self) -> Result<Vec<TicketRecord>> {
        let mut tickets = self.tickets.list_tickets().await?;
        tickets.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        info!(count = tickets.len(), "fetched booked tickets");
        Ok(tickets)
    }

    pub async fn cancel(&self, ticket_id: u64) -> Result<CancellationReceipt> {
        if ticket_id == 0 {
            return Err(BookingError::ValidationError(
                "Ticket id must be positive".to_string(),
            ));
        }
        let receipt = self.tickets.cancel_ticket(ticket_id).await?;
        info!(
            ticket_id,
            refund_processed = receipt.refund_processed,
            "ticket cancelled"
        );
        Ok(receipt)
    }

    /// Tickets that can still be cancelled.
    pub async fn active(&self) -> Result<Vec<TicketRecord>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|t| t.status != TicketStatus::Cancelled)
            .collect())
    }
}
