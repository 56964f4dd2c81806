//! Order placement
//!
//! [`CheckoutService::place_order`] turns a validated cart into a committed
//! order inside one store transaction:
//!
//! 1. Validating - request shape, no storage access
//! 2. Pricing - lock each product row, check stock, price from catalog
//! 3. Persisting - order header, then one item per priced line
//! 4. StockAdjusting - decrement every line, then commit
//!
//! Any failure drops the transaction, which discards its writes and
//! releases its row locks. The payment follow-up is derived after commit.

mod error;
pub mod payment;
pub mod pricing;

use std::fmt;
use std::sync::Arc;

use shared::models::{CreateOrderRequest, CreateOrderResponse, PaymentMethod};

use crate::db::{NewOrder, Store};

pub use error::CheckoutError;
pub use payment::PaymentRouter;

/// Where a checkout was when it finished or gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Validating,
    Pricing,
    Persisting,
    StockAdjusting,
    Committed,
}

impl CheckoutPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPhase::Validating => "validating",
            CheckoutPhase::Pricing => "pricing",
            CheckoutPhase::Persisting => "persisting",
            CheckoutPhase::StockAdjusting => "stock_adjusting",
            CheckoutPhase::Committed => "committed",
        }
    }
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn Store>,
    payments: PaymentRouter,
}

impl CheckoutService {
    pub fn new(store: Arc<dyn Store>, payments: PaymentRouter) -> Self {
        Self { store, payments }
    }

    /// Place an order for `user_id`. All or nothing.
    pub async fn place_order(
        &self,
        user_id: &str,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, CheckoutError> {
        let mut phase = CheckoutPhase::Validating;
        let result = self.run(user_id, request, &mut phase).await;
        if let Err(err) = &result {
            match err {
                CheckoutError::Persistence(_) => {
                    tracing::error!(user_id, phase = %phase, error = %err, "Checkout aborted");
                }
                _ => {
                    tracing::warn!(
                        user_id,
                        phase = %phase,
                        kind = err.kind(),
                        error = %err,
                        "Checkout rejected"
                    );
                }
            }
        }
        result
    }

    async fn run(
        &self,
        user_id: &str,
        request: &CreateOrderRequest,
        phase: &mut CheckoutPhase,
    ) -> Result<CreateOrderResponse, CheckoutError> {
        if user_id.trim().is_empty() {
            return Err(CheckoutError::Unauthorized);
        }
        pricing::validate_lines(&request.items)?;
        let method = PaymentMethod::from_request(request.payment_method.as_deref());

        *phase = CheckoutPhase::Pricing;
        let mut tx = self.store.begin().await?;
        let priced = pricing::price_lines(tx.as_mut(), &request.items).await?;

        *phase = CheckoutPhase::Persisting;
        let order_id = tx
            .create_order_header(&NewOrder {
                user_id,
                total: priced.total,
                payment_method: method,
                payment_status: PaymentRouter::initial_status(method),
            })
            .await?;
        for line in &priced.lines {
            tx.append_order_item(order_id, &line.as_new_item()).await?;
        }

        *phase = CheckoutPhase::StockAdjusting;
        pricing::apply_decrements(tx.as_mut(), &priced).await?;
        tx.commit().await?;
        *phase = CheckoutPhase::Committed;

        let next_action = self.payments.next_action(method, order_id, priced.total);
        tracing::info!(
            order_id,
            user_id,
            total = %priced.total,
            payment_method = %method,
            next_action = next_action.kind(),
            "Order placed"
        );

        Ok(CreateOrderResponse {
            order_id,
            total: priced.total,
            message: "Order created".to_string(),
            next_action,
            items: priced.lines.iter().map(|l| l.to_order_line()).collect(),
        })
    }
}
