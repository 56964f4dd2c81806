//! Concurrent checkouts against the in-memory store

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rust_decimal::Decimal;
use shared::models::{CreateOrderItemRequest, CreateOrderRequest};

use shop_server::checkout::{CheckoutError, CheckoutService, PaymentRouter};
use shop_server::db::MemoryStore;

fn service(store: &MemoryStore) -> CheckoutService {
    CheckoutService::new(
        Arc::new(store.clone()),
        PaymentRouter::new("https://qr.example.com", "https://pay.example.com"),
    )
}

fn cart(lines: &[(&str, i32)]) -> CreateOrderRequest {
    CreateOrderRequest {
        items: lines
            .iter()
            .map(|(id, qty)| CreateOrderItemRequest {
                product_id: id.to_string(),
                quantity: *qty,
                variant: None,
            })
            .collect(),
        payment_method: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_oversell_on_hot_product() {
    let store = MemoryStore::new();
    store.upsert_product("HOT", "Limited bowl", Decimal::new(1500, 2), 10);
    let service = service(&store);

    let tasks = (0..25).map(|i| {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .place_order(&format!("user-{i}"), &cart(&[("HOT", 1)]))
                .await
        })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let placed = results.iter().filter(|r| r.is_ok()).count();
    let short = results
        .iter()
        .filter(|r| matches!(r, Err(CheckoutError::InsufficientStock { stock_left: 0, .. })))
        .count();
    assert_eq!(placed, 10);
    assert_eq!(short, 15);
    assert_eq!(store.stock_of("HOT"), Some(0));
    assert_eq!(store.order_count(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_multi_unit_orders_never_go_negative() {
    let store = MemoryStore::new();
    store.upsert_product("HOT", "Limited bowl", Decimal::new(1500, 2), 10);
    let service = service(&store);

    let tasks = (0..8).map(|i| {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .place_order(&format!("user-{i}"), &cart(&[("HOT", 3)]))
                .await
        })
    });
    let placed = join_all(tasks)
        .await
        .into_iter()
        .filter(|joined| matches!(joined, Ok(Ok(_))))
        .count();

    assert_eq!(placed, 3);
    assert_eq!(store.stock_of("HOT"), Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_disjoint_products_all_succeed() {
    let store = MemoryStore::new();
    for i in 0..8 {
        store.upsert_product(format!("P{i}"), format!("Item {i}"), Decimal::new(100, 2), 1);
    }
    let service = service(&store);

    let tasks = (0..8).map(|i| {
        let service = service.clone();
        tokio::spawn(async move {
            let product = format!("P{i}");
            service
                .place_order("u1", &cart(&[(product.as_str(), 1)]))
                .await
        })
    });
    for joined in join_all(tasks).await {
        assert!(joined.unwrap().is_ok());
    }
    for i in 0..8 {
        assert_eq!(store.stock_of(&format!("P{i}")), Some(0));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crossed_lock_order_terminates_consistently() {
    let store = MemoryStore::with_lock_timeout(Duration::from_millis(200));
    store.upsert_product("A", "Bowl", Decimal::new(100, 2), 50);
    store.upsert_product("B", "Mat", Decimal::new(100, 2), 50);
    let service = service(&store);

    let tasks = (0..20).map(|i| {
        let service = service.clone();
        tokio::spawn(async move {
            let lines: &[(&str, i32)] = if i % 2 == 0 {
                &[("A", 1), ("B", 1)]
            } else {
                &[("B", 1), ("A", 1)]
            };
            service.place_order("u1", &cart(lines)).await
        })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    // Deadlocked pairs give up through the lock timeout instead of hanging.
    for result in &results {
        if let Err(err) = result {
            assert!(matches!(err, CheckoutError::Persistence(_)), "{err:?}");
        }
    }
    let placed = results.iter().filter(|r| r.is_ok()).count() as i32;
    assert_eq!(store.stock_of("A"), Some(50 - placed));
    assert_eq!(store.stock_of("B"), Some(50 - placed));
    assert_eq!(store.order_count(), placed as usize);
}
