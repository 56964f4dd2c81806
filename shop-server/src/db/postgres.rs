//! PostgreSQL store

use std::time::Duration;

use async_trait::async_trait;
use shared::models::{Order, OrderDetail, OrderStatusUpdate, Product};
use shared::util::now_millis;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use super::{
    CheckoutTx, LockedProduct, NewOrder, NewOrderItem, OrderQuery, Store, StoreResult, catalog,
    orders,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }

    /// Connect and apply pending migrations
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        lock_timeout: Duration,
    ) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;
        tracing::info!("Database migrations applied");
        Ok(Self::new(pool, lock_timeout))
    }
}

/// Checkout transaction over one pooled connection.
///
/// `sqlx` rolls the transaction back when it is dropped uncommitted.
pub struct PgCheckoutTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CheckoutTx for PgCheckoutTx {
    async fn lock_for_pricing(&mut self, product_id: &str) -> StoreResult<Option<LockedProduct>> {
        catalog::lock_for_pricing(&mut self.tx, product_id).await
    }

    async fn decrement_stock(&mut self, product_id: &str, quantity: i32) -> StoreResult<()> {
        catalog::decrement_stock(&mut self.tx, product_id, quantity, now_millis()).await
    }

    async fn create_order_header(&mut self, order: &NewOrder<'_>) -> StoreResult<i64> {
        orders::insert_header(&mut self.tx, order, now_millis()).await
    }

    async fn append_order_item(
        &mut self,
        order_id: i64,
        item: &NewOrderItem<'_>,
    ) -> StoreResult<()> {
        orders::insert_item(&mut self.tx, order_id, item).await
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn CheckoutTx>> {
        let mut tx = self.pool.begin().await?;
        // SET does not take bind parameters; the value is an integer we format ourselves.
        sqlx::query(&format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_timeout.as_millis()
        ))
        .execute(&mut *tx)
        .await?;
        Ok(Box::new(PgCheckoutTx { tx }))
    }

    async fn get_product(&self, product_id: &str) -> StoreResult<Option<Product>> {
        catalog::get_product(&self.pool, product_id).await
    }

    async fn get_order(&self, order_id: i64) -> StoreResult<Option<OrderDetail>> {
        orders::get_order(&self.pool, order_id).await
    }

    async fn list_orders(&self, query: &OrderQuery) -> StoreResult<Vec<Order>> {
        orders::list_orders(&self.pool, query).await
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        update: &OrderStatusUpdate,
    ) -> StoreResult<Option<Order>> {
        orders::update_status(&self.pool, order_id, update, now_millis()).await
    }
}
