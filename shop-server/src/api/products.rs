//! Catalog lookup

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::AppError;
use shared::models::Product;

use crate::state::AppState;

use super::ApiResult;

/// GET /api/products/{product_id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Product> {
    state
        .store
        .get_product(&product_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::product_not_found(product_id))
}
