//! Catalog queries (PostgreSQL)

use rust_decimal::Decimal;
use shared::models::Product;
use sqlx::{PgConnection, PgPool};

use super::{LockedProduct, StoreError};

/// Postgres `lock_not_available`, raised when `lock_timeout` expires
const LOCK_NOT_AVAILABLE: &str = "55P03";
const DEADLOCK_DETECTED: &str = "40P01";
const CHECK_VIOLATION: &str = "23514";

/// Map lock and constraint failures on a product row to their store variants
pub(crate) fn classify(err: sqlx::Error, product_id: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(LOCK_NOT_AVAILABLE) | Some(DEADLOCK_DETECTED) => {
                return StoreError::LockTimeout(product_id.to_string());
            }
            Some(CHECK_VIOLATION) => {
                return StoreError::Constraint(format!(
                    "stock of {product_id} would go negative"
                ));
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

pub async fn get_product(pool: &PgPool, product_id: &str) -> Result<Option<Product>, StoreError> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT product_id, name, sell_price, quantity, updated_at FROM products WHERE product_id = $1",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

/// Read a product and hold its row lock until the transaction ends
pub async fn lock_for_pricing(
    conn: &mut PgConnection,
    product_id: &str,
) -> Result<Option<LockedProduct>, StoreError> {
    let row: Option<(String, Decimal, i32)> = sqlx::query_as(
        "SELECT name, sell_price, quantity FROM products WHERE product_id = $1 FOR UPDATE",
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| classify(e, product_id))?;

    Ok(row.map(|(name, sell_price, quantity)| LockedProduct {
        name,
        sell_price,
        quantity,
    }))
}

pub async fn decrement_stock(
    conn: &mut PgConnection,
    product_id: &str,
    quantity: i32,
    now: i64,
) -> Result<(), StoreError> {
    let rows = sqlx::query(
        "UPDATE products SET quantity = quantity - $1, updated_at = $2 WHERE product_id = $3",
    )
    .bind(quantity)
    .bind(now)
    .bind(product_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| classify(e, product_id))?
    .rows_affected();

    if rows == 0 {
        return Err(StoreError::Corrupt(format!(
            "product {product_id} disappeared while locked"
        )));
    }
    Ok(())
}
