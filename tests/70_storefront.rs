mod common;

use anyhow::Result;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use common::{body, TestDb};
use portal_suite::config::config;
use portal_suite::database::models::storefront::{CatalogQuery, OrderStatus, Product, StoreUser};
use portal_suite::services::storefront::StorefrontService;
use portal_suite::services::ServiceError;

fn service(db: &TestDb) -> StorefrontService {
    StorefrontService::new(db.pool.clone(), &config().listing)
}

async fn product(service: &StorefrontService, code: &str, name: &str, stock: i32) -> Result<Product> {
    Ok(service
        .create_product(body(json!({
            "product_code": code,
            "name": name,
            "price": "12.50",
            "stock": stock,
            "category": "stationery",
        })))
        .await?)
}

async fn customer(service: &StorefrontService, name: &str) -> Result<StoreUser> {
    Ok(service
        .signup(body(json!({
            "name": name,
            "email": format!("{}@example.com", name),
            "password": "password1",
        })))
        .await?)
}

async fn stock_of(service: &StorefrontService, id: Uuid) -> Result<i32> {
    Ok(service.product_by_id(id).await?.stock)
}

#[tokio::test]
async fn ordering_takes_stock_and_cancelling_returns_it() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let store = service(&db);

    let pen = product(&store, "PEN-1", "Pen", 5).await?;
    let ada = customer(&store, "ada").await?;

    let cart = store
        .add_to_cart(ada.id, body(json!({ "product_code": "PEN-1", "quantity": 3 })))
        .await?;
    assert_eq!(cart.total, Decimal::new(3750, 2));

    let placed = store
        .place_order(ada.id, body(json!({ "shipping_address": "1 Mall Road" })))
        .await?;
    assert_eq!(placed.summary.order.order_status, OrderStatus::Pending);
    assert_eq!(placed.summary.order.total_amount, Decimal::new(3750, 2));
    assert_eq!(placed.items.len(), 1);
    assert_eq!(stock_of(&store, pen.id).await?, 2);
    assert!(store.cart(ada.id).await?.items.is_empty());

    let cancelled = store.cancel_order(ada.id, placed.summary.order.id).await?;
    assert_eq!(cancelled.order_status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&store, pen.id).await?, 5);

    let err = store.cancel_order(ada.id, cancelled.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = store
        .admin_set_status(ada.id, cancelled.id, OrderStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(stock_of(&store, pen.id).await?, 5);

    db.cleanup().await
}

#[tokio::test]
async fn short_stock_rejects_the_whole_order() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let store = service(&db);

    let pen = product(&store, "PEN-1", "Pen", 5).await?;
    let ink = product(&store, "INK-1", "Ink", 1).await?;
    let ada = customer(&store, "ada").await?;

    store
        .add_to_cart(ada.id, body(json!({ "product_code": "PEN-1", "quantity": 2 })))
        .await?;
    store
        .add_to_cart(ada.id, body(json!({ "product_code": "INK-1", "quantity": 1 })))
        .await?;
    // Someone else buys the last bottle of ink first.
    let bob = customer(&store, "bob").await?;
    store
        .add_to_cart(bob.id, body(json!({ "product_code": "INK-1", "quantity": 1 })))
        .await?;
    store
        .place_order(bob.id, body(json!({ "shipping_address": "2 Canal Bank" })))
        .await?;

    let err = store
        .place_order(ada.id, body(json!({ "shipping_address": "1 Mall Road" })))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(stock_of(&store, pen.id).await?, 5);
    assert_eq!(stock_of(&store, ink.id).await?, 0);
    assert_eq!(store.cart(ada.id).await?.items.len(), 2);

    db.cleanup().await
}

#[tokio::test]
async fn catalog_search_and_paging() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let store = service(&db);

    product(&store, "PEN-1", "Pen 100% recycled", 5).await?;
    product(&store, "PEN-2", "Pen refill", 5).await?;

    let page = store
        .list_products(CatalogQuery {
            search: Some("100%".to_string()),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 1);

    let page = store
        .list_products(CatalogQuery {
            search: Some("_".to_string()),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 0);

    let page = store
        .list_products(CatalogQuery {
            page: Some(2),
            limit: Some(1),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 2);
    assert_eq!(page.products.len(), 1);

    let err = store
        .list_products(CatalogQuery {
            page: Some(i64::MAX),
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidField { .. }));

    db.cleanup().await
}

#[tokio::test]
async fn salesman_report_counts_their_live_orders() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let store = service(&db);

    let pen = product(&store, "PEN-1", "Pen", 10).await?;
    let ada = customer(&store, "ada").await?;
    let sam = store
        .create_user(body(json!({
            "name": "Sam",
            "email": "sam@example.com",
            "password": "password1",
            "role": "salesman",
        })))
        .await?;

    let mut orders = Vec::new();
    for quantity in [2, 3] {
        store
            .add_to_cart(ada.id, body(json!({ "product_code": "PEN-1", "quantity": quantity })))
            .await?;
        let placed = store
            .place_order(ada.id, body(json!({ "shipping_address": "1 Mall Road" })))
            .await?;
        store.assign_salesman(placed.summary.order.id, sam.id).await?;
        orders.push(placed.summary.order.id);
    }

    let err = store.assign_salesman(orders[0], ada.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidField { .. }));

    store.cancel_order(ada.id, orders[1]).await?;

    let report = store.salesman_sales_report(sam.id).await?;
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].id, pen.id);
    assert_eq!(report[0].sales, 2);
    assert_eq!(report[0].revenue, Decimal::new(2500, 2));

    db.cleanup().await
}
