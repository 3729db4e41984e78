use crate::domain::booking::AttemptId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not logged in")]
    NotAuthenticated,
    #[error("Session expired, log in again")]
    SessionExpired,
    #[error("{endpoint} rejected the session token")]
    Unauthorized { endpoint: String },
    #[error("Transport error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Timed out waiting for {0}")]
    Timeout(String),
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
    #[error("Checkout abandoned for order {0}")]
    CheckoutAbandoned(String),
    #[error("Payment confirmed against order {actual}, expected {expected}")]
    OrderMismatch { expected: String, actual: String },
    #[error("Payment signature rejected for order {0}")]
    SignatureRejected(String),
    #[error(
        "Payment {payment_id} for order {order_id} verified but the ticket was not saved \
         (attempt {attempt}): {source}"
    )]
    BookingNotPersisted {
        order_id: String,
        payment_id: String,
        attempt: AttemptId,
        #[source]
        source: Box<BookingError>,
    },
    /// Neither the ticket nor the pending record was written.
    #[error(
        "Payment {payment_id} for order {order_id} verified but neither the ticket nor a \
         pending record was saved (attempt {attempt}): {booking_error}; pending store: {source}"
    )]
    PaymentUnrecorded {
        order_id: String,
        payment_id: String,
        attempt: AttemptId,
        booking_error: Box<BookingError>,
        #[source]
        source: Box<BookingError>,
    },
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
}

impl BookingError {
    /// Whether repeating the same attempt (same idempotency key) can succeed.
    ///
    /// `PaymentUnrecorded` is not: there is no pending record left to replay.
    pub fn is_retryable(&self) -> bool {
        match self {
            BookingError::Transport { .. }
            | BookingError::Timeout(_)
            | BookingError::BookingNotPersisted { .. } => true,
            BookingError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
