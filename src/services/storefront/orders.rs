use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use super::metrics::{ensure_cancellable, require_quantity};
use super::StorefrontService;
use crate::database::models::storefront::{
    InventoryAction, Order, OrderDetail, OrderItem, OrderStatus, OrderSummary, PaymentMethod, PlaceOrder,
    SalesmanDashboard, StoreRole, TopProduct,
};
use crate::services::{require_text, ServiceError, ServiceResult};

pub(super) const ORDER_SUMMARY_SELECT: &str = "SELECT o.*, u.name AS customer_name, u.email AS customer_email
     FROM storefront.orders o
     JOIN storefront.users u ON u.id = o.user_id";

const ORDER_ITEM_SELECT: &str = "SELECT i.*, p.name AS product_name, p.product_code
     FROM storefront.order_items i
     LEFT JOIN storefront.products p ON p.id = i.product_id";

/// Everything needed to write one order.
pub(super) struct NewOrder<'a> {
    pub user_id: Uuid,
    pub lines: Vec<(Uuid, i32)>,
    pub shipping_address: &'a str,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub performed_by: Uuid,
}

pub(super) async fn log_inventory(
    conn: &mut PgConnection,
    product_id: Uuid,
    action: InventoryAction,
    quantity: i32,
    performed_by: Uuid,
) -> ServiceResult<()> {
    sqlx::query(
        "INSERT INTO storefront.inventory_logs (product_id, action, quantity, performed_by)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(product_id)
    .bind(action)
    .bind(quantity)
    .bind(performed_by)
    .execute(conn)
    .await?;
    Ok(())
}

/// Take stock for every line, snapshot unit prices and write the order with
/// its items. Any shortfall aborts the caller's transaction.
pub(super) async fn write_order(tx: &mut Transaction<'_, Postgres>, order: NewOrder<'_>) -> ServiceResult<Order> {
    require_text("shipping_address", order.shipping_address)?;
    if order.lines.is_empty() {
        return Err(ServiceError::Validation("Order has no items".to_string()));
    }

    let mut priced = Vec::with_capacity(order.lines.len());
    for (product_id, quantity) in order.lines {
        require_quantity(quantity)?;
        let taken: Option<Decimal> = sqlx::query_scalar(
            "UPDATE storefront.products SET stock = stock - $2
             WHERE id = $1 AND stock >= $2
             RETURNING price",
        )
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&mut **tx)
        .await?;

        let Some(price) = taken else {
            let name: Option<String> = sqlx::query_scalar("SELECT name FROM storefront.products WHERE id = $1")
                .bind(product_id)
                .fetch_optional(&mut **tx)
                .await?;
            return Err(match name {
                Some(name) => ServiceError::Conflict(format!("Insufficient stock for {}", name)),
                None => ServiceError::not_found("Product"),
            });
        };

        log_inventory(&mut **tx, product_id, InventoryAction::StockOut, quantity, order.performed_by).await?;
        priced.push((product_id, quantity, price));
    }

    let total: Decimal = priced
        .iter()
        .map(|(_, quantity, price)| *price * Decimal::from(*quantity))
        .sum();

    let written = sqlx::query_as::<_, Order>(
        "INSERT INTO storefront.orders (user_id, total_amount, order_status, shipping_address, payment_method)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(order.user_id)
    .bind(total)
    .bind(order.status)
    .bind(order.shipping_address.trim())
    .bind(order.payment_method)
    .fetch_one(&mut **tx)
    .await?;

    for (product_id, quantity, price) in priced {
        sqlx::query(
            "INSERT INTO storefront.order_items (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)",
        )
        .bind(written.id)
        .bind(product_id)
        .bind(quantity)
        .bind(price)
        .execute(&mut **tx)
        .await?;
    }

    Ok(written)
}

/// Return the stock held by an order's items.
async fn restore_stock(tx: &mut Transaction<'_, Postgres>, order_id: Uuid, performed_by: Uuid) -> ServiceResult<()> {
    let items: Vec<(Uuid, i32)> = sqlx::query_as(
        "SELECT product_id, quantity FROM storefront.order_items
         WHERE order_id = $1 AND product_id IS NOT NULL",
    )
    .bind(order_id)
    .fetch_all(&mut **tx)
    .await?;

    for (product_id, quantity) in items {
        sqlx::query("UPDATE storefront.products SET stock = stock + $2 WHERE id = $1")
            .bind(product_id)
            .bind(quantity)
            .execute(&mut **tx)
            .await?;
        log_inventory(&mut **tx, product_id, InventoryAction::StockIn, quantity, performed_by).await?;
    }
    Ok(())
}

/// Move an order to a new status. Cancelling returns its stock; a cancelled
/// order cannot be reopened.
pub(super) async fn transition_order(
    tx: &mut Transaction<'_, Postgres>,
    order: &Order,
    status: OrderStatus,
    performed_by: Uuid,
) -> ServiceResult<Order> {
    if order.order_status == OrderStatus::Cancelled && status != OrderStatus::Cancelled {
        return Err(ServiceError::Validation("Cancelled orders cannot be reopened".to_string()));
    }
    if status == OrderStatus::Cancelled && order.order_status != OrderStatus::Cancelled {
        restore_stock(tx, order.id, performed_by).await?;
    }

    let updated = sqlx::query_as::<_, Order>(
        "UPDATE storefront.orders SET order_status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(order.id)
    .bind(status)
    .fetch_one(&mut **tx)
    .await?;
    Ok(updated)
}

pub(super) async fn lock_order(conn: &mut PgConnection, order_id: Uuid) -> ServiceResult<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM storefront.orders WHERE id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Order"))
}

impl StorefrontService {
    /// Turn the caller's cart into an order.
    pub async fn place_order(&self, user_id: Uuid, request: PlaceOrder) -> ServiceResult<OrderDetail> {
        let mut tx = self.pool.begin().await?;

        let lines: Vec<(Uuid, i32)> = sqlx::query_as(
            "SELECT product_id, quantity FROM storefront.cart_items WHERE user_id = $1 ORDER BY product_id",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;
        if lines.is_empty() {
            return Err(ServiceError::Validation("Cart is empty".to_string()));
        }

        let order = write_order(
            &mut tx,
            NewOrder {
                user_id,
                lines,
                shipping_address: &request.shipping_address,
                payment_method: request.payment_method.unwrap_or(PaymentMethod::Cod),
                status: OrderStatus::Pending,
                performed_by: user_id,
            },
        )
        .await?;

        sqlx::query("DELETE FROM storefront.cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Order {} placed by {} for {}", order.id, user_id, order.total_amount);
        self.order_detail(order.id).await
    }

    pub async fn order_history(&self, user_id: Uuid) -> ServiceResult<Vec<OrderDetail>> {
        let query = format!("{} WHERE o.user_id = $1 ORDER BY o.placed_at DESC", ORDER_SUMMARY_SELECT);
        let orders = sqlx::query_as::<_, OrderSummary>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        self.with_items(orders).await
    }

    /// Visible to the customer who placed it, its salesman and admins.
    pub async fn track_order(&self, user_id: Uuid, role: StoreRole, order_id: Uuid) -> ServiceResult<OrderDetail> {
        let detail = self.order_detail(order_id).await?;
        let order = &detail.summary.order;
        let visible = role == StoreRole::Admin || order.user_id == user_id || order.salesman_id == Some(user_id);
        if !visible {
            return Err(ServiceError::not_found("Order"));
        }
        Ok(detail)
    }

    pub async fn cancel_order(&self, user_id: Uuid, order_id: Uuid) -> ServiceResult<Order> {
        let mut tx = self.pool.begin().await?;
        let order = lock_order(&mut *tx, order_id).await?;
        if order.user_id != user_id {
            return Err(ServiceError::Forbidden("Not your order".to_string()));
        }
        ensure_cancellable(order.order_status)?;

        let order = transition_order(&mut tx, &order, OrderStatus::Cancelled, user_id).await?;
        tx.commit().await?;
        info!("Order {} cancelled by customer {}", order.id, user_id);
        Ok(order)
    }

    pub async fn salesman_orders(&self, salesman_id: Uuid) -> ServiceResult<Vec<OrderSummary>> {
        let query = format!("{} WHERE o.salesman_id = $1 ORDER BY o.placed_at DESC", ORDER_SUMMARY_SELECT);
        let orders = sqlx::query_as::<_, OrderSummary>(&query)
            .bind(salesman_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    pub async fn salesman_dashboard(&self, salesman_id: Uuid) -> ServiceResult<SalesmanDashboard> {
        let orders = self.salesman_orders(salesman_id).await?;
        let total_revenue = orders
            .iter()
            .filter(|o| o.order.order_status != OrderStatus::Cancelled)
            .map(|o| o.order.total_amount)
            .sum();
        Ok(SalesmanDashboard {
            total_orders: orders.len() as i64,
            total_revenue,
            orders,
        })
    }

    /// Units and revenue per product across the salesman's live orders.
    pub async fn salesman_sales_report(&self, salesman_id: Uuid) -> ServiceResult<Vec<TopProduct>> {
        let products = sqlx::query_as::<_, TopProduct>(
            "SELECT p.id, p.name, p.product_code,
                    SUM(i.quantity)::int8 AS sales,
                    SUM(i.quantity * i.price) AS revenue
             FROM storefront.orders o
             JOIN storefront.order_items i ON i.order_id = o.id
             JOIN storefront.products p ON p.id = i.product_id
             WHERE o.salesman_id = $1 AND o.order_status <> 'cancelled'
             GROUP BY p.id
             ORDER BY revenue DESC, p.name",
        )
        .bind(salesman_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn salesman_set_status(&self, salesman_id: Uuid, order_id: Uuid, status: OrderStatus) -> ServiceResult<Order> {
        let mut tx = self.pool.begin().await?;
        let order = lock_order(&mut *tx, order_id).await?;
        if order.salesman_id != Some(salesman_id) {
            return Err(ServiceError::not_found("Order"));
        }

        let order = transition_order(&mut tx, &order, status, salesman_id).await?;
        tx.commit().await?;
        info!("Salesman {} moved order {} to {}", salesman_id, order.id, status);
        Ok(order)
    }

    pub(super) async fn order_detail(&self, order_id: Uuid) -> ServiceResult<OrderDetail> {
        let query = format!("{} WHERE o.id = $1", ORDER_SUMMARY_SELECT);
        let summary = sqlx::query_as::<_, OrderSummary>(&query)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order"))?;

        let query = format!("{} WHERE i.order_id = $1", ORDER_ITEM_SELECT);
        let items = sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(OrderDetail { summary, items })
    }

    /// Attach items to each order with one query.
    pub(super) async fn with_items(&self, orders: Vec<OrderSummary>) -> ServiceResult<Vec<OrderDetail>> {
        let ids: Vec<Uuid> = orders.iter().map(|o| o.order.id).collect();
        let query = format!("{} WHERE i.order_id = ANY($1)", ORDER_ITEM_SELECT);
        let items = sqlx::query_as::<_, OrderItem>(&query)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }
        Ok(orders
            .into_iter()
            .map(|summary| OrderDetail {
                items: by_order.remove(&summary.order.id).unwrap_or_default(),
                summary,
            })
            .collect())
    }
}
