use crate::domain::ticket::{TicketRecord, TicketStatus};
use crate::error::{BookingError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct TicketRow<'a> {
    ticket_id: Option<u64>,
    ticket_number: Option<&'a str>,
    train_id: Option<u64>,
    train_name: Option<&'a str>,
    source: Option<&'a str>,
    destination: Option<&'a str>,
    seats: Option<u32>,
    amount: Option<Decimal>,
    booking_date: Option<NaiveDate>,
    status: TicketStatus,
}

impl<'a> From<&'a TicketRecord> for TicketRow<'a> {
    fn from(t: &'a TicketRecord) -> Self {
        Self {
            ticket_id: t.ticket_id,
            ticket_number: t.ticket_number.as_deref(),
            train_id: t.train_id,
            train_name: t.train_name.as_deref(),
            source: t.source.as_deref(),
            destination: t.destination.as_deref(),
            seats: t.no_of_seats,
            amount: t.amount,
            booking_date: t.booking_date,
            status: t.status,
        }
    }
}

/// Column order of `TicketRow`.
pub const COLUMNS: [&str; 10] = [
    "ticket_id",
    "ticket_number",
    "train_id",
    "train_name",
    "source",
    "destination",
    "seats",
    "amount",
    "booking_date",
    "status",
];

/// Writes ticket lists as CSV, one row per ticket, with a header.
///
/// The header is written even when there are no tickets.
pub struct TicketWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> TicketWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink),
        }
    }

    pub fn write_tickets(&mut self, tickets: &[TicketRecord]) -> Result<()> {
        self.writer
            .write_record(COLUMNS)
            .map_err(|e| BookingError::IoError(e.into()))?;
        for ticket in tickets {
            self.writer
                .serialize(TicketRow::from(ticket))
                .map_err(|e| BookingError::IoError(e.into()))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
