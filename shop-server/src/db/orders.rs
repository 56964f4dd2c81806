//! Order ledger queries (PostgreSQL)

use rust_decimal::Decimal;
use shared::models::{Order, OrderDetail, OrderItem, OrderStatusUpdate, UnknownLabel};
use sqlx::{PgConnection, PgPool};

use super::{NewOrder, NewOrderItem, OrderQuery, StoreError};

const ORDER_COLUMNS: &str = "id, user_id, total, status, payment_method, payment_status, payment_ref, created_at, updated_at";

/// Order header as stored; labels are plain TEXT columns
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: String,
    total: Decimal,
    status: String,
    payment_method: String,
    payment_status: String,
    payment_ref: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |e: UnknownLabel| StoreError::Corrupt(format!("order {id}: {e}"));
        Ok(Order {
            id,
            status: row.status.parse().map_err(corrupt)?,
            payment_method: row.payment_method.parse().map_err(corrupt)?,
            payment_status: row.payment_status.parse().map_err(corrupt)?,
            user_id: row.user_id,
            total: row.total,
            payment_ref: row.payment_ref,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn insert_header(
    conn: &mut PgConnection,
    order: &NewOrder<'_>,
    now: i64,
) -> Result<i64, StoreError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO orders (user_id, total, status, payment_method, payment_status, created_at, updated_at) \
         VALUES ($1, $2, 'pending', $3, $4, $5, $5) RETURNING id",
    )
    .bind(order.user_id)
    .bind(order.total)
    .bind(order.payment_method.as_str())
    .bind(order.payment_status.as_str())
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn insert_item(
    conn: &mut PgConnection,
    order_id: i64,
    item: &NewOrderItem<'_>,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO order_items (order_id, product_id, name, price, quantity, variant) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.name)
    .bind(item.price)
    .bind(item.quantity)
    .bind(item.variant)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_order(pool: &PgPool, order_id: i64) -> Result<Option<OrderDetail>, StoreError> {
    let row: Option<OrderRow> =
        sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(order_id)
            .fetch_optional(pool)
            .await?;
    let Some(row) = row else {
        return Ok(None);
    };

    let items: Vec<OrderItem> = sqlx::query_as(
        "SELECT id, order_id, product_id, name, price, quantity, variant \
         FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(OrderDetail {
        order: Order::try_from(row)?,
        items,
    }))
}

pub async fn list_orders(pool: &PgPool, query: &OrderQuery) -> Result<Vec<Order>, StoreError> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders \
         WHERE user_id = $1 AND ($2::TEXT IS NULL OR status = $2) \
         ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
    ))
    .bind(&query.user_id)
    .bind(query.status.map(|s| s.as_str()))
    .bind(query.limit)
    .bind(query.offset)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Order::try_from).collect()
}

pub async fn update_status(
    pool: &PgPool,
    order_id: i64,
    update: &OrderStatusUpdate,
    now: i64,
) -> Result<Option<Order>, StoreError> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        "UPDATE orders SET \
         status = COALESCE($2, status), \
         payment_status = COALESCE($3, payment_status), \
         payment_ref = COALESCE($4, payment_ref), \
         updated_at = $5 \
         WHERE id = $1 RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order_id)
    .bind(update.status.map(|s| s.as_str()))
    .bind(update.payment_status.map(|s| s.as_str()))
    .bind(update.payment_ref())
    .bind(now)
    .fetch_optional(pool)
    .await?;

    row.map(Order::try_from).transpose()
}
