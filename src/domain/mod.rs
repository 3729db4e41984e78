pub mod booking;
pub mod money;
pub mod payment;
pub mod ports;
pub mod session;
pub mod signature;
pub mod ticket;
