use crate::domain::booking::{AttemptId, BookingRequest};
use crate::domain::money::MinorUnits;
use crate::domain::payment::{PaymentConfirmation, PaymentOrder, Verification, VerifiedPayment};
use crate::domain::ports::{PaymentBackend, SharedSession, TicketBackend};
use crate::domain::ticket::{BookingReceipt, CancellationReceipt, TicketRecord};
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

const CREATE_ORDER: &str = "/createOrder";
const VERIFY: &str = "/verify";
const BOOK_TICKET: &str = "/bookTicket";
const ALL_TICKETS: &str = "/tickets/all";
const CANCEL_WITH_REFUND: &str = "/tickets/cancel-with-refund";

/// REST client for the payment and ticket services behind the API gateway.
///
/// Every request reads the bearer token from the session at send time and
/// refuses to dispatch without one.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    session: SharedSession,
    currency: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookTicketBody<'a> {
    train_id: u64,
    full_name: &'a str,
    email: &'a str,
    age: u8,
    seat_count: u32,
    date: NaiveDate,
    order_id: &'a str,
    payment_id: &'a str,
    razorpay_signature: &'a str,
    amount: MinorUnits,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        currency: impl Into<String>,
        timeout: Duration,
        session: SharedSession,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BookingError::ConfigError(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            currency: currency.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.session.token()?.ok_or(BookingError::NotAuthenticated)?;
        Ok(builder.bearer_auth(token))
    }

    async fn send(&self, endpoint: &str, builder: RequestBuilder) -> Result<String> {
        let builder = self.authorized(builder)?;
        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(endpoint, e))?;
        debug!(endpoint, status = status.as_u16(), "response received");

        if status == StatusCode::UNAUTHORIZED {
            return Err(BookingError::Unauthorized {
                endpoint: endpoint.to_string(),
            });
        }
        if !status.is_success() {
            return Err(BookingError::Http {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn transport_error(endpoint: &str, source: reqwest::Error) -> BookingError {
    if source.is_timeout() {
        BookingError::Timeout(endpoint.to_string())
    } else {
        BookingError::Transport {
            endpoint: endpoint.to_string(),
            source,
        }
    }
}

fn malformed(endpoint: &str, reason: impl Into<String>) -> BookingError {
    BookingError::MalformedResponse {
        endpoint: endpoint.to_string(),
        reason: reason.into(),
    }
}

/// Accepts the order id as plain text, a JSON string, or `{"id": ...}`.
pub fn parse_order_id(body: &str) -> Result<String> {
    let body = body.trim();
    let id = if body.starts_with('{') {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| malformed(CREATE_ORDER, e.to_string()))?;
        value
            .get("id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or_else(|| malformed(CREATE_ORDER, "object has no string `id`"))?
    } else if body.starts_with('"') {
        serde_json::from_str::<String>(body).map_err(|e| malformed(CREATE_ORDER, e.to_string()))?
    } else {
        body.to_string()
    };

    let id = id.trim();
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return Err(malformed(CREATE_ORDER, format!("not an order id: {body:?}")));
    }
    Ok(id.to_string())
}

/// The verify endpoint answers a bare boolean. Anything else is malformed.
pub fn interpret_verification(body: &str) -> Result<Verification> {
    let message = body.trim();
    let accepted = if message.eq_ignore_ascii_case("true") {
        true
    } else if message.eq_ignore_ascii_case("false") {
        false
    } else {
        return Err(malformed(
            VERIFY,
            format!("expected `true` or `false`, got {message:?}"),
        ));
    };
    Ok(Verification {
        accepted,
        message: message.to_string(),
    })
}

#[async_trait]
impl PaymentBackend for HttpBackend {
    async fn create_order(&self, amount: MinorUnits, attempt: AttemptId) -> Result<PaymentOrder> {
        let builder = self
            .client
            .get(self.url(CREATE_ORDER))
            .query(&[("amount", amount.value())])
            .header(IDEMPOTENCY_HEADER, attempt.to_string());
        let body = self.send(CREATE_ORDER, builder).await?;

        Ok(PaymentOrder {
            order_id: parse_order_id(&body)?,
            amount,
            currency: self.currency.clone(),
        })
    }

    async fn verify_payment(
        &self,
        order: &PaymentOrder,
        confirmation: &PaymentConfirmation,
        attempt: AttemptId,
    ) -> Result<Verification> {
        let builder = self
            .client
            .post(self.url(VERIFY))
            .header(IDEMPOTENCY_HEADER, attempt.to_string())
            .form(&[
                ("orderId", order.order_id.as_str()),
                ("paymentId", confirmation.payment_id.as_str()),
                ("razorpaySignature", confirmation.signature.as_str()),
            ]);
        let body = self.send(VERIFY, builder).await?;
        interpret_verification(&body)
    }
}

#[async_trait]
impl TicketBackend for HttpBackend {
    async fn book_ticket(
        &self,
        request: &BookingRequest,
        payment: &VerifiedPayment,
        attempt: AttemptId,
    ) -> Result<BookingReceipt> {
        let confirmation = payment.confirmation();
        let body = BookTicketBody {
            train_id: request.train_id,
            full_name: &request.passenger.full_name,
            email: &request.passenger.email,
            age: request.passenger.age,
            seat_count: request.seats.get(),
            date: request.travel_date,
            order_id: &payment.order().order_id,
            payment_id: &confirmation.payment_id,
            razorpay_signature: &confirmation.signature,
            amount: payment.order().amount,
        };
        let builder = self
            .client
            .post(self.url(BOOK_TICKET))
            .header(IDEMPOTENCY_HEADER, attempt.to_string())
            .json(&body);
        let raw = self.send(BOOK_TICKET, builder).await?;
        Ok(BookingReceipt::from_body(raw))
    }

    async fn list_tickets(&self) -> Result<Vec<TicketRecord>> {
        let builder = self.client.get(self.url(ALL_TICKETS));
        let body = self.send(ALL_TICKETS, builder).await?;
        serde_json::from_str(&body).map_err(|e| malformed(ALL_TICKETS, e.to_string()))
    }

    async fn cancel_ticket(&self, ticket_id: u64) -> Result<CancellationReceipt> {
        let builder = self
            .client
            .put(self.url(&format!("{CANCEL_WITH_REFUND}/{ticket_id}")));
        let body = self.send(CANCEL_WITH_REFUND, builder).await?;
        serde_json::from_str(&body).map_err(|e| malformed(CANCEL_WITH_REFUND, e.to_string()))
    }
}
