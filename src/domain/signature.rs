//! Gateway payment signatures.
//!
//! The gateway signs `"{order_id}|{payment_id}"` with HMAC-SHA256 keyed by the
//! merchant secret and hex-encodes the digest.

use crate::error::{BookingError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn keyed(order_id: &str, payment_id: &str, secret: &str) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BookingError::ValidationError(format!("Invalid signing secret: {e}")))?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(mac)
}

/// Computes the lowercase hex signature for an order/payment pair.
pub fn sign(order_id: &str, payment_id: &str, secret: &str) -> Result<String> {
    let mac = keyed(order_id, payment_id, secret)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks `signature` in constant time. Non-hex input is simply not valid.
pub fn verify(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> Result<bool> {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return Ok(false);
    };
    let mac = keyed(order_id, payment_id, secret)?;
    Ok(mac.verify_slice(&expected).is_ok())
}
