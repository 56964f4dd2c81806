//! Stock reservation and pricing
//!
//! Lines are validated up front, then priced one by one against rows locked
//! inside the checkout transaction. Prices come from the catalog only.

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::models::{CreateOrderItemRequest, OrderLine};

use super::CheckoutError;
use crate::db::{CheckoutTx, NewOrderItem};

/// A requested line priced against locked catalog data
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub variant: Option<String>,
    pub line_total: Decimal,
}

impl PricedLine {
    pub fn as_new_item(&self) -> NewOrderItem<'_> {
        NewOrderItem {
            product_id: &self.product_id,
            name: &self.name,
            price: self.unit_price,
            quantity: self.quantity,
            variant: self.variant.as_deref(),
        }
    }

    pub fn to_order_line(&self) -> OrderLine {
        OrderLine {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            price: self.unit_price,
            quantity: self.quantity,
            variant: self.variant.clone(),
            line_total: self.line_total,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    pub total: Decimal,
}

/// Price of `quantity` units, rounded to cents
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    (unit_price * Decimal::from(quantity)).round_dp(2)
}

/// Shape checks that need no storage access.
///
/// Reports the first offending line in submission order.
pub fn validate_lines(items: &[CreateOrderItemRequest]) -> Result<(), CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }
    for (index, item) in items.iter().enumerate() {
        if item.product_id.trim().is_empty() {
            return Err(CheckoutError::MissingProductId { index });
        }
        if item.quantity <= 0 {
            return Err(CheckoutError::InvalidQuantity {
                index,
                product_id: item.product_id.clone(),
                quantity: item.quantity,
            });
        }
    }
    Ok(())
}

/// Lock, check and price every line in submission order.
///
/// Repeated products draw from the same reservation: a line is accepted
/// only if the quantity locked on the row covers it plus every earlier
/// line for that product. Stops at the first unavailable line.
pub async fn price_lines(
    tx: &mut dyn CheckoutTx,
    items: &[CreateOrderItemRequest],
) -> Result<PricedOrder, CheckoutError> {
    let mut reserved: HashMap<&str, i32> = HashMap::new();
    let mut lines = Vec::with_capacity(items.len());
    let mut total = Decimal::ZERO;

    for item in items {
        let product_id = item.product_id.as_str();
        let product = tx
            .lock_for_pricing(product_id)
            .await?
            .ok_or_else(|| CheckoutError::ProductNotFound {
                product_id: product_id.to_string(),
            })?;

        let already = reserved.get(product_id).copied().unwrap_or(0);
        let stock_left = (product.quantity - already).max(0);
        if item.quantity > stock_left {
            return Err(CheckoutError::InsufficientStock {
                product_id: product_id.to_string(),
                stock_left,
                request_qty: item.quantity,
            });
        }
        reserved.insert(product_id, already + item.quantity);

        // The snapshot price must reproduce the line total exactly.
        let unit_price = product.sell_price.round_dp(2);
        let line_total = line_total(unit_price, item.quantity);
        total += line_total;
        lines.push(PricedLine {
            product_id: product_id.to_string(),
            name: product.name,
            unit_price,
            quantity: item.quantity,
            variant: item.variant.clone(),
            line_total,
        });
    }

    tracing::debug!(lines = lines.len(), total = %total, "Order priced");
    Ok(PricedOrder { lines, total })
}

/// Subtract every priced line from stock, in line order
pub async fn apply_decrements(
    tx: &mut dyn CheckoutTx,
    order: &PricedOrder,
) -> Result<(), CheckoutError> {
    for line in &order.lines {
        tx.decrement_stock(&line.product_id, line.quantity).await?;
    }
    Ok(())
}
