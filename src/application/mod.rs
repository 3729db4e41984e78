//! Application layer orchestrating the booking use cases.
//!
//! `BookingService` drives the payment confirmation sequence (order, checkout,
//! verification, persistence). `Reconciler` finishes payments whose ticket was
//! never saved, and `TicketDesk` covers listing and cancelling booked tickets.
//! All of them reach the outside world only through `domain::ports`.

pub mod booking;
pub mod reconcile;
pub mod tickets;
