//! Checkout failures

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::StoreError;

/// Why a checkout was rejected. Every variant leaves the store untouched.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("caller is not authenticated")]
    Unauthorized,

    #[error("order must contain at least one item")]
    EmptyOrder,

    #[error("item {index}: product_id is required")]
    MissingProductId { index: usize },

    #[error("item {index} ({product_id}): quantity must be positive, got {quantity}")]
    InvalidQuantity {
        index: usize,
        product_id: String,
        quantity: i32,
    },

    #[error("product {product_id} not found")]
    ProductNotFound { product_id: String },

    #[error("insufficient stock for {product_id}: {stock_left} left, {request_qty} requested")]
    InsufficientStock {
        product_id: String,
        stock_left: i32,
        request_qty: i32,
    },

    #[error("storage failure: {0}")]
    Persistence(#[from] StoreError),
}

impl CheckoutError {
    /// Coarse failure class, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::Unauthorized => "unauthorized",
            CheckoutError::EmptyOrder
            | CheckoutError::MissingProductId { .. }
            | CheckoutError::InvalidQuantity { .. } => "validation",
            CheckoutError::ProductNotFound { .. } => "not_found",
            CheckoutError::InsufficientStock { .. } => "insufficient_stock",
            CheckoutError::Persistence(_) => "persistence",
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Unauthorized => AppError::not_authenticated(),
            CheckoutError::EmptyOrder => AppError::new(ErrorCode::OrderEmpty),
            CheckoutError::MissingProductId { index } => {
                AppError::with_message(ErrorCode::RequiredField, err.to_string())
                    .with_detail("field", "product_id")
                    .with_detail("index", index)
            }
            CheckoutError::InvalidQuantity {
                index,
                ref product_id,
                quantity,
            } => AppError::with_message(ErrorCode::InvalidQuantity, err.to_string())
                .with_detail("index", index)
                .with_detail("product_id", product_id.clone())
                .with_detail("quantity", quantity),
            CheckoutError::ProductNotFound { product_id } => {
                AppError::product_not_found(product_id)
            }
            CheckoutError::InsufficientStock {
                product_id,
                stock_left,
                request_qty,
            } => AppError::insufficient_stock(product_id, stock_left, request_qty),
            CheckoutError::Persistence(e) => e.into(),
        }
    }
}
