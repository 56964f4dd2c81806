//! Order endpoints: checkout, history, detail, status update

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    CreateOrderRequest, CreateOrderResponse, Order, OrderDetail, OrderStatus, OrderStatusUpdate,
};

use crate::auth::CurrentUser;
use crate::db::OrderQuery;
use crate::state::AppState;

use super::ApiResult;

fn order_not_found(order_id: i64) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", order_id))
        .with_detail("order_id", order_id)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| AppError::validation(e.body_text()))
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    let request = body(payload)?;
    let response = state
        .checkout
        .place_order(&user.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/orders
#[derive(Deserialize)]
pub struct OrdersQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<OrdersQuery>,
) -> ApiResult<Vec<Order>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(|e| {
            AppError::with_message(ErrorCode::InvalidOrderStatus, e.to_string())
                .with_detail("field", "status")
        })?;

    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1).checked_mul(per_page).ok_or_else(|| {
        AppError::validation(format!("page {} is out of range", page)).with_detail("field", "page")
    })?;

    let orders = state
        .store
        .list_orders(&OrderQuery {
            user_id: user.user_id,
            status,
            limit: per_page,
            offset,
        })
        .await?;

    Ok(Json(orders))
}

/// GET /api/orders/{id}
///
/// Orders of other users are reported as missing.
pub async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<OrderDetail> {
    match state.store.get_order(order_id).await? {
        Some(detail) if detail.order.user_id == user.user_id => Ok(Json(detail)),
        _ => Err(order_not_found(order_id)),
    }
}

/// PATCH /api/orders/{id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(order_id): Path<i64>,
    payload: Result<Json<OrderStatusUpdate>, JsonRejection>,
) -> ApiResult<Order> {
    if !user.is_staff() {
        return Err(AppError::new(ErrorCode::RoleRequired));
    }
    let update = body(payload)?;
    if update.is_empty() {
        return Err(AppError::validation(
            "At least one of status, payment_status, payment_ref is required",
        ));
    }

    let order = state
        .store
        .update_order_status(order_id, &update)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;

    tracing::info!(
        order_id,
        staff = %user.user_id,
        status = %order.status,
        payment_status = %order.payment_status,
        "Order status updated"
    );
    Ok(Json(order))
}
