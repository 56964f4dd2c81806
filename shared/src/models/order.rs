//! Order Model
//!
//! Orders and their line items as stored by the order ledger, plus the
//! checkout request/response payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a stored or submitted label is not part of an enum's vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownLabel {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ========== Order lifecycle ==========

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Paid,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "paid" => Ok(OrderStatus::Paid),
            "shipped" => Ok(OrderStatus::Shipped),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownLabel::new("order status", other)),
        }
    }
}

// ========== Payment ==========

/// Payment method chosen at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "COD")]
    Cod,
    #[serde(rename = "BANK_TRANSFER")]
    BankTransfer,
    #[serde(rename = "PROMPTPAY")]
    PromptPay,
    #[serde(rename = "CARD")]
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "COD",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::PromptPay => "PROMPTPAY",
            PaymentMethod::Card => "CARD",
        }
    }

    /// Resolve a caller-supplied method label.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// An absent, blank or unrecognized label resolves to cash on delivery.
    pub fn from_request(label: Option<&str>) -> Self {
        label
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.to_ascii_uppercase().parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(PaymentMethod::Cod),
            "BANK_TRANSFER" => Ok(PaymentMethod::BankTransfer),
            "PROMPTPAY" => Ok(PaymentMethod::PromptPay),
            "CARD" => Ok(PaymentMethod::Card),
            other => Err(UnknownLabel::new("payment method", other)),
        }
    }
}

/// Payment settlement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    /// Waiting for staff to review an uploaded transfer slip
    Review,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Review => "review",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "review" => Ok(PaymentStatus::Review),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(UnknownLabel::new("payment status", other)),
        }
    }
}

/// Follow-up step the caller must perform to complete payment.
///
/// Produced on every checkout, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NextAction {
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "UPLOAD_SLIP")]
    UploadSlip,
    #[serde(rename = "SHOW_PROMPTPAY")]
    ShowPromptPay {
        qr_image_url: String,
        payload_text: String,
    },
    #[serde(rename = "REDIRECT_GATEWAY")]
    RedirectGateway { url: String },
}

impl NextAction {
    /// Wire name of the action type
    pub fn kind(&self) -> &'static str {
        match self {
            NextAction::None => "NONE",
            NextAction::UploadSlip => "UPLOAD_SLIP",
            NextAction::ShowPromptPay { .. } => "SHOW_PROMPTPAY",
            NextAction::RedirectGateway { .. } => "REDIRECT_GATEWAY",
        }
    }
}

// ========== Ledger records ==========

/// Order header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_ref: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line snapshot, frozen at checkout time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// Order header with its items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Post-commit update of the mutable order fields.
///
/// `None` leaves the field untouched. A blank `payment_ref` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, deserialize_with = "trimmed_non_blank")]
    pub payment_ref: Option<String>,
}

impl OrderStatusUpdate {
    /// Trimmed payment reference, `None` when absent or blank
    pub fn payment_ref(&self) -> Option<&str> {
        self.payment_ref
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none() && self.payment_ref().is_none()
    }
}

fn trimmed_non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

// ========== Checkout payloads ==========

/// One requested line of a checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderItemRequest {
    /// Required; a missing value is reported as a validation error
    #[serde(default)]
    pub product_id: String,
    /// Required, > 0
    #[serde(default)]
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// Checkout request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<CreateOrderItemRequest>,
    /// COD | BANK_TRANSFER | PROMPTPAY | CARD; defaults to COD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

/// Priced line echoed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
}

/// Checkout response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub message: String,
    pub next_action: NextAction,
    pub items: Vec<OrderLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_from_request() {
        assert_eq!(PaymentMethod::from_request(None), PaymentMethod::Cod);
        assert_eq!(PaymentMethod::from_request(Some("")), PaymentMethod::Cod);
        assert_eq!(PaymentMethod::from_request(Some("   ")), PaymentMethod::Cod);
        assert_eq!(
            PaymentMethod::from_request(Some("promptpay")),
            PaymentMethod::PromptPay
        );
        assert_eq!(
            PaymentMethod::from_request(Some(" Bank_Transfer ")),
            PaymentMethod::BankTransfer
        );
        assert_eq!(PaymentMethod::from_request(Some("card")), PaymentMethod::Card);
        assert_eq!(
            PaymentMethod::from_request(Some("BITCOIN")),
            PaymentMethod::Cod
        );
    }

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Paid,
            OrderStatus::Shipped,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Review,
            PaymentStatus::Paid,
            PaymentStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>(), Ok(status));
        }
        let err = "refunded".parse::<PaymentStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown payment status 'refunded'");
    }

    #[test]
    fn test_serde_labels_match_as_str() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"BANK_TRANSFER\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Review).unwrap(),
            "\"review\""
        );
    }

    #[test]
    fn test_next_action_wire_shape() {
        let none = serde_json::to_value(NextAction::None).unwrap();
        assert_eq!(none, serde_json::json!({ "type": "NONE" }));

        let qr = serde_json::to_value(NextAction::ShowPromptPay {
            qr_image_url: "https://pay.example/qr/7.png".into(),
            payload_text: "Order #7".into(),
        })
        .unwrap();
        assert_eq!(qr["type"], "SHOW_PROMPTPAY");
        assert_eq!(qr["qr_image_url"], "https://pay.example/qr/7.png");
        assert!(qr.get("url").is_none());

        let redirect = NextAction::RedirectGateway {
            url: "https://gw.example/?order_id=7".into(),
        };
        assert_eq!(redirect.kind(), "REDIRECT_GATEWAY");
        let back: NextAction =
            serde_json::from_value(serde_json::to_value(&redirect).unwrap()).unwrap();
        assert_eq!(back, redirect);
    }

    #[test]
    fn test_create_order_request_defaults() {
        let req: CreateOrderRequest =
            serde_json::from_str(r#"{"items":[{"quantity":2}]}"#).unwrap();
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.items[0].product_id, "");
        assert_eq!(req.items[0].variant, None);
        assert_eq!(req.payment_method, None);

        let empty: CreateOrderRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_money_serializes_as_number() {
        let line = OrderLine {
            product_id: "P1".into(),
            name: "Leash".into(),
            price: Decimal::new(1000, 2),
            quantity: 3,
            variant: None,
            line_total: Decimal::new(3000, 2),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["price"], serde_json::json!(10.0));
        assert_eq!(json["line_total"], serde_json::json!(30.0));
        assert!(json.get("variant").is_none());
    }

    #[test]
    fn test_status_update_is_empty() {
        assert!(OrderStatusUpdate::default().is_empty());
        let update: OrderStatusUpdate =
            serde_json::from_str(r#"{"payment_status":"paid"}"#).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.payment_status, Some(PaymentStatus::Paid));
        assert!(serde_json::from_str::<OrderStatusUpdate>(r#"{"status":"lost"}"#).is_err());
    }

    #[test]
    fn test_blank_payment_ref_is_absent() {
        let update: OrderStatusUpdate = serde_json::from_str(r#"{"payment_ref":"   "}"#).unwrap();
        assert_eq!(update.payment_ref, None);
        assert!(update.is_empty());

        let update: OrderStatusUpdate =
            serde_json::from_str(r#"{"payment_ref":" SLIP-9 ","status":"paid"}"#).unwrap();
        assert_eq!(update.payment_ref.as_deref(), Some("SLIP-9"));

        let built = OrderStatusUpdate {
            payment_ref: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(built.payment_ref(), None);
        assert!(built.is_empty());
    }
}
