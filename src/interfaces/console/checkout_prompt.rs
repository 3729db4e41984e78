use crate::domain::payment::{CheckoutOptions, CheckoutOutcome, GatewayResponse};
use crate::domain::ports::CheckoutGateway;
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Checkout bridge for terminals.
///
/// Prints the widget options as JSON, then waits for one line holding the
/// gateway's success-handler payload. An empty line or end of input means the
/// passenger closed the checkout.
pub struct CheckoutPrompt<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl<R, W> CheckoutPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }
}

#[async_trait]
impl<R, W> CheckoutGateway for CheckoutPrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn open(&self, options: &CheckoutOptions) -> Result<CheckoutOutcome> {
        let rendered = serde_json::to_string_pretty(options)
            .map_err(|e| BookingError::ValidationError(format!("cannot render checkout: {e}")))?;
        {
            let mut out = self.output.lock().await;
            out.write_all(rendered.as_bytes()).await?;
            out.write_all(
                b"\nComplete the payment, then paste the handler response JSON (empty line to abandon):\n",
            )
            .await?;
            out.flush().await?;
        }

        let mut line = String::new();
        let read = self.input.lock().await.read_line(&mut line).await?;
        let line = line.trim();
        if read == 0 || line.is_empty() {
            return Ok(CheckoutOutcome::Abandoned);
        }

        let response: GatewayResponse = serde_json::from_str(line).map_err(|e| {
            BookingError::MalformedResponse {
                endpoint: "checkout".to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(CheckoutOutcome::Completed(
            response.into_confirmation(&options.order_id),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::MinorUnits;
    use crate::domain::payment::{Prefill, Theme};

    fn options() -> CheckoutOptions {
        CheckoutOptions {
            key: "rzp_test_k".into(),
            amount: MinorUnits(42000),
            currency: "INR".into(),
            name: "Train Ticket Booking".into(),
            description: "Book your train tickets with ease".into(),
            order_id: "order_7".into(),
            prefill: Prefill {
                name: "Asha".into(),
                email: "asha@example.com".into(),
            },
            theme: Theme {
                color: "#3399cc".into(),
            },
        }
    }

    #[tokio::test]
    async fn test_prompt_completes() {
        let input: &[u8] =
            br#"{"razorpay_payment_id":"pay_7","razorpay_order_id":"order_7","razorpay_signature":"ab12"}
"#;
        let mut output = Vec::new();
        let outcome = CheckoutPrompt::new(input, &mut output)
            .open(&options())
            .await
            .unwrap();

        match outcome {
            CheckoutOutcome::Completed(c) => {
                assert_eq!(c.order_id, "order_7");
                assert_eq!(c.payment_id, "pay_7");
                assert_eq!(c.signature, "ab12");
            }
            CheckoutOutcome::Abandoned => panic!("expected completion"),
        }
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("\"order_id\": \"order_7\""));
    }

    #[tokio::test]
    async fn test_prompt_empty_input_abandons() {
        for input in [&b""[..], &b"\n"[..]] {
            let outcome = CheckoutPrompt::new(input, Vec::new())
                .open(&options())
                .await
                .unwrap();
            assert_eq!(outcome, CheckoutOutcome::Abandoned);
        }
    }

    #[tokio::test]
    async fn test_prompt_rejects_garbage() {
        let input: &[u8] = b"paid!\n";
        let result = CheckoutPrompt::new(input, Vec::new()).open(&options()).await;
        assert!(matches!(
            result,
            Err(BookingError::MalformedResponse { .. })
        ));
    }
}
