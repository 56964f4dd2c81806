//! Payment routing
//!
//! Maps the payment method chosen at checkout to the order's initial
//! payment status and to the follow-up step shown to the caller.
//!
//! | Method        | Initial status | Next action        |
//! |---------------|----------------|--------------------|
//! | COD           | pending        | NONE               |
//! | BANK_TRANSFER | review         | UPLOAD_SLIP        |
//! | PROMPTPAY     | pending        | SHOW_PROMPTPAY     |
//! | CARD          | pending        | REDIRECT_GATEWAY   |

use rust_decimal::Decimal;
use shared::models::{NextAction, PaymentMethod, PaymentStatus};

/// Builds payment follow-up actions from configured endpoints
#[derive(Debug, Clone)]
pub struct PaymentRouter {
    promptpay_qr_base_url: String,
    card_gateway_url: String,
}

impl PaymentRouter {
    pub fn new(promptpay_qr_base_url: impl Into<String>, card_gateway_url: impl Into<String>) -> Self {
        Self {
            promptpay_qr_base_url: promptpay_qr_base_url.into().trim_end_matches('/').to_string(),
            card_gateway_url: card_gateway_url.into(),
        }
    }

    /// Payment status written with the order header
    pub fn initial_status(method: PaymentMethod) -> PaymentStatus {
        match method {
            PaymentMethod::BankTransfer => PaymentStatus::Review,
            PaymentMethod::Cod | PaymentMethod::PromptPay | PaymentMethod::Card => {
                PaymentStatus::Pending
            }
        }
    }

    /// Follow-up step for a committed order
    pub fn next_action(&self, method: PaymentMethod, order_id: i64, total: Decimal) -> NextAction {
        match method {
            PaymentMethod::Cod => NextAction::None,
            PaymentMethod::BankTransfer => NextAction::UploadSlip,
            PaymentMethod::PromptPay => NextAction::ShowPromptPay {
                qr_image_url: format!("{}/{}.png", self.promptpay_qr_base_url, order_id),
                payload_text: format!("PromptPay order #{} amount {:.2} THB", order_id, total),
            },
            PaymentMethod::Card => {
                let sep = if self.card_gateway_url.contains('?') { '&' } else { '?' };
                NextAction::RedirectGateway {
                    url: format!(
                        "{}{}order_id={}&amount={:.2}",
                        self.card_gateway_url, sep, order_id, total
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> PaymentRouter {
        PaymentRouter::new("https://qr.example.com/promptpay/", "https://pay.example.com/checkout")
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(
            PaymentRouter::initial_status(PaymentMethod::Cod),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentRouter::initial_status(PaymentMethod::BankTransfer),
            PaymentStatus::Review
        );
        assert_eq!(
            PaymentRouter::initial_status(PaymentMethod::PromptPay),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentRouter::initial_status(PaymentMethod::Card),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_cod_and_bank_transfer_actions() {
        let total = Decimal::new(3000, 2);
        assert_eq!(router().next_action(PaymentMethod::Cod, 1, total), NextAction::None);
        assert_eq!(
            router().next_action(PaymentMethod::BankTransfer, 1, total),
            NextAction::UploadSlip
        );
    }

    #[test]
    fn test_promptpay_qr() {
        let action = router().next_action(PaymentMethod::PromptPay, 42, Decimal::new(12050, 2));
        match action {
            NextAction::ShowPromptPay {
                qr_image_url,
                payload_text,
            } => {
                assert_eq!(qr_image_url, "https://qr.example.com/promptpay/42.png");
                assert!(payload_text.contains("#42"));
                assert!(payload_text.contains("120.50"));
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_card_redirect() {
        let action = router().next_action(PaymentMethod::Card, 7, Decimal::new(999, 2));
        assert_eq!(
            action,
            NextAction::RedirectGateway {
                url: "https://pay.example.com/checkout?order_id=7&amount=9.99".into()
            }
        );

        let with_query = PaymentRouter::new("https://qr.example.com", "https://gw.example.com/p?m=shop");
        let NextAction::RedirectGateway { url } =
            with_query.next_action(PaymentMethod::Card, 7, Decimal::new(10, 0))
        else {
            panic!("expected a redirect");
        };
        assert_eq!(url, "https://gw.example.com/p?m=shop&order_id=7&amount=10.00");
    }
}
