use super::booking::BookingRequest;
use super::money::MinorUnits;
use serde::{Deserialize, Serialize};

/// A gateway-side reservation of a payment amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount: MinorUnits,
    pub currency: String,
}

/// Merchant-side settings that shape the hosted checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutBranding {
    pub key: String,
    pub merchant_name: String,
    pub description: String,
    pub theme_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub color: String,
}

/// Configuration handed to the hosted checkout widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutOptions {
    pub key: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: Prefill,
    pub theme: Theme,
}

impl CheckoutOptions {
    pub fn new(
        branding: &CheckoutBranding,
        order: &PaymentOrder,
        request: &BookingRequest,
    ) -> Self {
        Self {
            key: branding.key.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
            name: branding.merchant_name.clone(),
            description: branding.description.clone(),
            order_id: order.order_id.clone(),
            prefill: Prefill {
                name: request.passenger.full_name.clone(),
                email: request.passenger.email.clone(),
            },
            theme: Theme {
                color: branding.theme_color.clone(),
            },
        }
    }
}

/// Payload the gateway passes to the checkout success handler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayResponse {
    pub razorpay_payment_id: String,
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    pub razorpay_signature: String,
}

impl GatewayResponse {
    /// Falls back to the opened order when the handler omits the order id.
    pub fn into_confirmation(self, opened_order_id: &str) -> PaymentConfirmation {
        PaymentConfirmation {
            order_id: self
                .razorpay_order_id
                .unwrap_or_else(|| opened_order_id.to_string()),
            payment_id: self.razorpay_payment_id,
            signature: self.razorpay_signature,
        }
    }
}

/// Unverified proof of payment received from the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Completed(PaymentConfirmation),
    Abandoned,
}

/// Answer of the verification endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub accepted: bool,
    pub message: String,
}

/// A confirmation the verification endpoint accepted for a matching order.
///
/// Only this crate can build one, so tickets can only be saved for payments
/// that went through verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    order: PaymentOrder,
    confirmation: PaymentConfirmation,
}

impl VerifiedPayment {
    pub(crate) fn new(order: PaymentOrder, confirmation: PaymentConfirmation) -> Self {
        Self {
            order,
            confirmation,
        }
    }

    pub fn order(&self) -> &PaymentOrder {
        &self.order
    }

    pub fn confirmation(&self) -> &PaymentConfirmation {
        &self.confirmation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::Passenger;
    use crate::domain::money::SeatCount;
    use chrono::NaiveDate;

    #[test]
    fn test_checkout_options_wire_names() {
        let request = BookingRequest::new(
            3,
            Passenger {
                full_name: "Ravi".into(),
                email: "ravi@example.com".into(),
                age: 41,
            },
            NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            SeatCount::new(3).unwrap(),
        )
        .unwrap();
        let order = PaymentOrder {
            order_id: "order_abc".into(),
            amount: MinorUnits(42000),
            currency: "INR".into(),
        };
        let branding = CheckoutBranding {
            key: "rzp_test_key".into(),
            merchant_name: "Train Ticket Booking".into(),
            description: "Book your train tickets with ease".into(),
            theme_color: "#3399cc".into(),
        };

        let json = serde_json::to_value(CheckoutOptions::new(&branding, &order, &request)).unwrap();
        assert_eq!(json["order_id"], "order_abc");
        assert_eq!(json["amount"], 42000);
        assert_eq!(json["prefill"]["email"], "ravi@example.com");
        assert_eq!(json["theme"]["color"], "#3399cc");
    }

    #[test]
    fn test_gateway_response_without_order_id() {
        let response: GatewayResponse = serde_json::from_str(
            r#"{"razorpay_payment_id":"pay_1","razorpay_signature":"abc"}"#,
        )
        .unwrap();
        let confirmation = response.into_confirmation("order_1");
        assert_eq!(confirmation.order_id, "order_1");
        assert_eq!(confirmation.payment_id, "pay_1");
    }
}
