//! Storage layer
//!
//! Checkout runs inside a [`CheckoutTx`] obtained from [`Store::begin`].
//! Product rows read through [`CheckoutTx::lock_for_pricing`] stay locked
//! until the transaction commits or is dropped. Dropping a transaction
//! without calling [`CheckoutTx::commit`] discards every write it staged.
//!
//! Two backends:
//! - [`PgStore`] - PostgreSQL, row locks via `SELECT ... FOR UPDATE`
//! - [`MemoryStore`] - in-process, per-product async mutexes

pub mod catalog;
pub mod memory;
pub mod orders;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    Order, OrderDetail, OrderStatus, OrderStatusUpdate, PaymentMethod, PaymentStatus, Product,
};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row lock could not be acquired in time (lock timeout or deadlock)
    #[error("timed out waiting for lock on product {0}")]
    LockTimeout(String),

    /// A write would break a table constraint
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// A stored row could not be mapped back into a model
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Product fields read under lock for pricing
#[derive(Debug, Clone, PartialEq)]
pub struct LockedProduct {
    pub name: String,
    pub sell_price: Decimal,
    pub quantity: i32,
}

/// Order header about to be written
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub user_id: &'a str,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
}

/// Order line about to be written
#[derive(Debug, Clone)]
pub struct NewOrderItem<'a> {
    pub product_id: &'a str,
    pub name: &'a str,
    pub price: Decimal,
    pub quantity: i32,
    pub variant: Option<&'a str>,
}

/// Filter for a customer's order history
#[derive(Debug, Clone)]
pub struct OrderQuery {
    pub user_id: String,
    pub status: Option<OrderStatus>,
    pub limit: i64,
    pub offset: i64,
}

/// One atomic checkout
#[async_trait]
pub trait CheckoutTx: Send {
    /// Lock a product row for the rest of the transaction and read it.
    ///
    /// Returns `None` when no such product exists. Quantities reflect
    /// decrements already staged by this transaction.
    async fn lock_for_pricing(&mut self, product_id: &str) -> StoreResult<Option<LockedProduct>>;

    /// Subtract `quantity` units from a product locked by this transaction
    async fn decrement_stock(&mut self, product_id: &str, quantity: i32) -> StoreResult<()>;

    /// Insert the order header and return its id
    async fn create_order_header(&mut self, order: &NewOrder<'_>) -> StoreResult<i64>;

    async fn append_order_item(&mut self, order_id: i64, item: &NewOrderItem<'_>)
    -> StoreResult<()>;

    /// Make every staged write visible and release all locks
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Catalog and order ledger access
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn CheckoutTx>>;

    /// Unlocked catalog read
    async fn get_product(&self, product_id: &str) -> StoreResult<Option<Product>>;

    async fn get_order(&self, order_id: i64) -> StoreResult<Option<OrderDetail>>;

    /// Orders of one user, newest first
    async fn list_orders(&self, query: &OrderQuery) -> StoreResult<Vec<Order>>;

    /// Apply a post-commit status change. Returns `None` for an unknown order.
    async fn update_order_status(
        &self,
        order_id: i64,
        update: &OrderStatusUpdate,
    ) -> StoreResult<Option<Order>>;
}
