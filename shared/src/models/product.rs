//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog product as seen by checkout
///
/// `product_id` is the SKU string callers order by. `quantity` is the
/// units on hand and never goes negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub product_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sell_price: Decimal,
    pub quantity: i32,
    pub updated_at: i64,
}
