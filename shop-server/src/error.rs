//! Storage to API error bridge
//!
//! Storage failures are logged here with their full cause and reach the
//! client as a bare `DatabaseError`, so SQL text and row data never leak.

use shared::error::{AppError, ErrorCode};

use crate::db::StoreError;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::LockTimeout(product_id) => {
                tracing::warn!(product_id = %product_id, "Row lock wait timed out");
            }
            _ => {
                tracing::error!(error = %err, "Store error");
            }
        }
        AppError::new(ErrorCode::DatabaseError)
    }
}
