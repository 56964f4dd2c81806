//! API routes for shop-server

pub mod health;
pub mod orders;
pub mod products;

use axum::Router;
use axum::routing::{get, patch};
use shared::error::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Bearer-authenticated through the `CurrentUser` extractor
    let orders = Router::new()
        .route(
            "/api/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/orders/{id}/status", patch(orders::update_order_status));

    let catalog = Router::new().route("/api/products/{product_id}", get(products::get_product));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(orders)
        .merge(catalog)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
