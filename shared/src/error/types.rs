//! `AppError` and the JSON body it renders to

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error returned by every handler.
///
/// `details` carries machine-readable context such as the offending
/// field or the stock left for a product.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn product_not_found(product_id: impl Into<String>) -> Self {
        let id = product_id.into();
        Self::with_message(ErrorCode::ProductNotFound, format!("Product {} not found", id))
            .with_detail("product_id", id)
    }

    /// Out-of-stock error with the units left and the units asked for
    pub fn insufficient_stock(
        product_id: impl Into<String>,
        stock_left: i32,
        request_qty: i32,
    ) -> Self {
        let id = product_id.into();
        Self::with_message(
            ErrorCode::ProductOutOfStock,
            format!(
                "Insufficient stock for {}: {} left, {} requested",
                id, stock_left, request_qty
            ),
        )
        .with_detail("product_id", id)
        .with_detail("stock_left", stock_left)
        .with_detail("request_qty", request_qty)
    }
}

/// JSON body of an error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error occurred");
        }
        (self.http_status(), axum::Json(ErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message() {
        let err = AppError::new(ErrorCode::OrderEmpty);
        assert_eq!(err.message, "Order has no items");
        assert_eq!(err.to_string(), "Order has no items");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_details_accumulate() {
        let err = AppError::validation("bad line")
            .with_detail("field", "product_id")
            .with_detail("index", 2);
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details["field"], "product_id");
        assert_eq!(details["index"], 2);
    }

    #[test]
    fn test_insufficient_stock() {
        let err = AppError::insufficient_stock("P1", 2, 3);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
        let body = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(body["code"], 6003);
        assert_eq!(body["details"]["product_id"], "P1");
        assert_eq!(body["details"]["stock_left"], 2);
        assert_eq!(body["details"]["request_qty"], 3);
    }

    #[test]
    fn test_auth_errors() {
        assert_eq!(
            AppError::not_authenticated().http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::token_expired().code.code(), 1003);
        assert_eq!(AppError::invalid_token("nope").code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_body_omits_empty_details() {
        let err = AppError::product_not_found("SKU-9");
        assert!(err.message.contains("SKU-9"));
        let body = serde_json::to_value(ErrorBody::from(&AppError::new(ErrorCode::DatabaseError)))
            .unwrap();
        assert_eq!(body, serde_json::json!({ "code": 9002, "message": "Database error" }));
    }
}
