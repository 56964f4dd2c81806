//! In-memory store
//!
//! Each product has its own async mutex, held by a checkout transaction
//! from its first [`CheckoutTx::lock_for_pricing`] until commit or drop.
//! Writes are staged on the transaction and applied in one step on commit,
//! so an abandoned transaction leaves no trace.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::models::{Order, OrderDetail, OrderItem, OrderStatus, OrderStatusUpdate, Product};
use shared::util::now_millis;
use tokio::sync::OwnedMutexGuard;

use super::{
    CheckoutTx, LockedProduct, NewOrder, NewOrderItem, OrderQuery, Store, StoreError, StoreResult,
};

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct Tables {
    products: HashMap<String, Product>,
    orders: BTreeMap<i64, Order>,
    items: BTreeMap<i64, OrderItem>,
    next_order_id: i64,
    next_item_id: i64,
}

impl Tables {
    fn order_id(&mut self) -> i64 {
        self.next_order_id += 1;
        self.next_order_id
    }

    fn item_id(&mut self) -> i64 {
        self.next_item_id += 1;
        self.next_item_id
    }
}

struct Inner {
    // Never held across an await point.
    tables: Mutex<Tables>,
    row_locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
    lock_timeout: Duration,
}

/// Store backed by process memory. Clones share the same data.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                tables: Mutex::new(Tables::default()),
                row_locks: DashMap::new(),
                lock_timeout,
            }),
        }
    }

    /// Insert or replace a catalog product.
    ///
    /// Prices are kept to cents, like the `NUMERIC(12,2)` column.
    pub fn upsert_product(
        &self,
        product_id: impl Into<String>,
        name: impl Into<String>,
        sell_price: Decimal,
        quantity: i32,
    ) {
        let product = Product {
            product_id: product_id.into(),
            name: name.into(),
            sell_price: sell_price.round_dp(2),
            quantity,
            updated_at: now_millis(),
        };
        self.inner
            .tables
            .lock()
            .products
            .insert(product.product_id.clone(), product);
    }

    /// Change a product's catalog price. Returns false for an unknown product.
    pub fn set_price(&self, product_id: &str, sell_price: Decimal) -> bool {
        let mut tables = self.inner.tables.lock();
        match tables.products.get_mut(product_id) {
            Some(product) => {
                product.sell_price = sell_price.round_dp(2);
                product.updated_at = now_millis();
                true
            }
            None => false,
        }
    }

    /// Committed units on hand
    pub fn stock_of(&self, product_id: &str) -> Option<i32> {
        self.inner
            .tables
            .lock()
            .products
            .get(product_id)
            .map(|p| p.quantity)
    }

    pub fn order_count(&self) -> usize {
        self.inner.tables.lock().orders.len()
    }

    pub fn item_count(&self) -> usize {
        self.inner.tables.lock().items.len()
    }

    fn row_lock(&self, product_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.inner
            .row_locks
            .entry(product_id.to_string())
            .or_default()
            .value()
            .clone()
    }
}

/// Checkout transaction over a [`MemoryStore`]
pub struct MemoryTx {
    store: MemoryStore,
    held: HashMap<String, OwnedMutexGuard<()>>,
    decrements: Vec<(String, i32)>,
    order: Option<Order>,
    items: Vec<OrderItem>,
}

impl MemoryTx {
    fn new(store: MemoryStore) -> Self {
        Self {
            store,
            held: HashMap::new(),
            decrements: Vec::new(),
            order: None,
            items: Vec::new(),
        }
    }

    fn staged_decrement(&self, product_id: &str) -> i32 {
        self.decrements
            .iter()
            .filter(|(id, _)| id == product_id)
            .map(|(_, qty)| qty)
            .sum()
    }
}

#[async_trait]
impl CheckoutTx for MemoryTx {
    async fn lock_for_pricing(&mut self, product_id: &str) -> StoreResult<Option<LockedProduct>> {
        if !self.held.contains_key(product_id) {
            // Row locks exist only for catalog products.
            let known = self.store.inner.tables.lock().products.contains_key(product_id);
            if !known {
                return Ok(None);
            }
            let lock = self.store.row_lock(product_id);
            let guard = tokio::time::timeout(self.store.inner.lock_timeout, lock.lock_owned())
                .await
                .map_err(|_| StoreError::LockTimeout(product_id.to_string()))?;
            self.held.insert(product_id.to_string(), guard);
        }

        let staged = self.staged_decrement(product_id);
        let tables = self.store.inner.tables.lock();
        Ok(tables.products.get(product_id).map(|p| LockedProduct {
            name: p.name.clone(),
            sell_price: p.sell_price,
            quantity: p.quantity - staged,
        }))
    }

    async fn decrement_stock(&mut self, product_id: &str, quantity: i32) -> StoreResult<()> {
        if !self.held.contains_key(product_id) {
            return Err(StoreError::Constraint(format!(
                "product {product_id} is not locked by this transaction"
            )));
        }
        self.decrements.push((product_id.to_string(), quantity));
        Ok(())
    }

    async fn create_order_header(&mut self, order: &NewOrder<'_>) -> StoreResult<i64> {
        // Ids are consumed even if the transaction never commits, like a sequence.
        let id = self.store.inner.tables.lock().order_id();
        let now = now_millis();
        self.order = Some(Order {
            id,
            user_id: order.user_id.to_string(),
            total: order.total,
            status: OrderStatus::Pending,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            payment_ref: None,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn append_order_item(
        &mut self,
        order_id: i64,
        item: &NewOrderItem<'_>,
    ) -> StoreResult<()> {
        if self.order.as_ref().map(|o| o.id) != Some(order_id) {
            return Err(StoreError::Constraint(format!(
                "order {order_id} does not exist"
            )));
        }
        if item.quantity <= 0 {
            return Err(StoreError::Constraint(format!(
                "order item quantity must be positive, got {}",
                item.quantity
            )));
        }
        let id = self.store.inner.tables.lock().item_id();
        self.items.push(OrderItem {
            id,
            order_id,
            product_id: item.product_id.to_string(),
            name: item.name.to_string(),
            price: item.price,
            quantity: item.quantity,
            variant: item.variant.map(str::to_string),
        });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let tx = *self;
        let mut tables = tx.store.inner.tables.lock();

        // Check every constraint before touching anything.
        for (product_id, _) in &tx.decrements {
            let on_hand = tables
                .products
                .get(product_id)
                .map(|p| p.quantity)
                .ok_or_else(|| StoreError::Corrupt(format!("product {product_id} vanished")))?;
            if on_hand < tx.staged_decrement(product_id) {
                return Err(StoreError::Constraint(format!(
                    "stock of {product_id} would go negative"
                )));
            }
        }

        let now = now_millis();
        for (product_id, quantity) in &tx.decrements {
            if let Some(product) = tables.products.get_mut(product_id) {
                product.quantity -= quantity;
                product.updated_at = now;
            }
        }
        if let Some(order) = &tx.order {
            tables.orders.insert(order.id, order.clone());
        }
        for item in &tx.items {
            tables.items.insert(item.id, item.clone());
        }
        // Row locks in `tx.held` are released when `tx` drops.
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn CheckoutTx>> {
        Ok(Box::new(MemoryTx::new(self.clone())))
    }

    async fn get_product(&self, product_id: &str) -> StoreResult<Option<Product>> {
        Ok(self.inner.tables.lock().products.get(product_id).cloned())
    }

    async fn get_order(&self, order_id: i64) -> StoreResult<Option<OrderDetail>> {
        let tables = self.inner.tables.lock();
        Ok(tables.orders.get(&order_id).map(|order| OrderDetail {
            order: order.clone(),
            items: tables
                .items
                .values()
                .filter(|item| item.order_id == order_id)
                .cloned()
                .collect(),
        }))
    }

    async fn list_orders(&self, query: &OrderQuery) -> StoreResult<Vec<Order>> {
        let tables = self.inner.tables.lock();
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.user_id == query.user_id)
            .filter(|o| query.status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        update: &OrderStatusUpdate,
    ) -> StoreResult<Option<Order>> {
        let mut tables = self.inner.tables.lock();
        let Some(order) = tables.orders.get_mut(&order_id) else {
            return Ok(None);
        };
        if let Some(status) = update.status {
            order.status = status;
        }
        if let Some(payment_status) = update.payment_status {
            order.payment_status = payment_status;
        }
        if let Some(payment_ref) = update.payment_ref() {
            order.payment_ref = Some(payment_ref.to_string());
        }
        order.updated_at = now_millis();
        Ok(Some(order.clone()))
    }
}
