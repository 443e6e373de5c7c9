//! Admin console: users, products, orders, dashboard metrics and settings.

use rust_decimal::Decimal;
use sqlx::FromRow;
use tracing::{info, warn};
use uuid::Uuid;

use super::metrics::{
    cumulative_customers, customer_growth, growth_percent, monthly_sales, orders_by_status, require_quantity,
};
use super::orders::{lock_order, log_inventory, transition_order, write_order, NewOrder, ORDER_SUMMARY_SELECT};
use super::{optional_text, StorefrontService};
use crate::auth::{generate_password, hash_password, verify_password};
use crate::database::models::storefront::{
    AdminCreateOrder, CategorySales, CreateProduct, CreateUser, CustomerStats, GeneratedPassword, InventoryAction,
    MonthlySales, Order, OrderDetail, OrderStatus, OrderSummary, OrdersByStatus, PaymentMethod, Product, RecentOrder,
    RoleInfo, SalesReport, StoreDashboard, StoreRole, StoreUser, SummaryMetrics, TopProduct, UpdateProduct, UpdateUser,
};
use crate::services::{require_password, require_text, ServiceError, ServiceResult};

const DEFAULT_REPORT_LIMIT: i64 = 5;

#[derive(Debug, FromRow)]
struct OrderWindow {
    total_sales: Decimal,
    total_orders: i64,
    pending_orders: i64,
    current_sales: Decimal,
    previous_sales: Decimal,
    current_orders: i64,
    previous_orders: i64,
}

#[derive(Debug, FromRow)]
struct CustomerCounts {
    total_customers: i64,
    new_customers: i64,
}

fn report_limit(limit: Option<i64>) -> i64 {
    limit.filter(|l| *l > 0).unwrap_or(DEFAULT_REPORT_LIMIT)
}

fn check_product_numbers(price: Decimal, stock: i32) -> ServiceResult<()> {
    if price < Decimal::ZERO {
        return Err(ServiceError::invalid("price", "must not be negative"));
    }
    if stock < 0 {
        return Err(ServiceError::invalid("stock", "must not be negative"));
    }
    Ok(())
}

pub fn roles() -> Vec<RoleInfo> {
    StoreRole::ALL
        .iter()
        .map(|role| RoleInfo {
            name: *role,
            permissions: role.permissions(),
        })
        .collect()
}

impl StorefrontService {
    // Users

    pub async fn list_users(&self) -> ServiceResult<Vec<StoreUser>> {
        let users = sqlx::query_as::<_, StoreUser>("SELECT * FROM storefront.users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn create_user(&self, request: CreateUser) -> ServiceResult<StoreUser> {
        let role = request.role.unwrap_or(StoreRole::Customer);
        let user = self
            .insert_user(
                &request.name,
                &request.email,
                &request.password,
                optional_text(request.phone),
                None,
                role,
            )
            .await?;
        info!("Admin created storefront {} {}", user.role, user.email);
        Ok(user)
    }

    pub async fn update_user(&self, user_id: Uuid, update: UpdateUser) -> ServiceResult<StoreUser> {
        let current = self.get_user(user_id).await?;
        if let Some(name) = &update.name {
            require_text("name", name)?;
        }

        let user = sqlx::query_as::<_, StoreUser>(
            "UPDATE storefront.users SET name = $2, phone = $3, role = $4, updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(user_id)
        .bind(update.name.map(|n| n.trim().to_string()).unwrap_or(current.name))
        .bind(match update.phone {
            Some(phone) => optional_text(Some(phone)),
            None => current.phone,
        })
        .bind(update.role.unwrap_or(current.role))
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn delete_user(&self, admin_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        if admin_id == user_id {
            return Err(ServiceError::Validation("Admins cannot delete their own account".to_string()));
        }
        let removed = sqlx::query("DELETE FROM storefront.users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if removed == 0 {
            return Err(ServiceError::not_found("User"));
        }
        info!("Admin {} deleted storefront user {}", admin_id, user_id);
        Ok(())
    }

    // Products

    pub async fn all_products(&self) -> ServiceResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM storefront.products ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn create_product(&self, request: CreateProduct) -> ServiceResult<Product> {
        require_text("product_code", &request.product_code)?;
        require_text("name", &request.name)?;
        require_text("category", &request.category)?;
        let stock = request.stock.unwrap_or(0);
        check_product_numbers(request.price, stock)?;

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM storefront.products WHERE product_code = $1)")
                .bind(request.product_code.trim())
                .fetch_one(&self.pool)
                .await?;
        if taken {
            return Err(ServiceError::Conflict("Product code already exists".to_string()));
        }

        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO storefront.products (product_code, name, description, price, stock, category, images)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(request.product_code.trim())
        .bind(request.name.trim())
        .bind(request.description.unwrap_or_default())
        .bind(request.price)
        .bind(stock)
        .bind(request.category.trim())
        .bind(request.images.unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;
        info!("Product {} created", product.product_code);
        Ok(product)
    }

    pub async fn update_product(&self, product_id: Uuid, update: UpdateProduct) -> ServiceResult<Product> {
        let current = self.product_by_id(product_id).await?;
        for (field, value) in [
            ("product_code", &update.product_code),
            ("name", &update.name),
            ("category", &update.category),
        ] {
            if let Some(value) = value {
                require_text(field, value)?;
            }
        }
        let price = update.price.unwrap_or(current.price);
        let stock = update.stock.unwrap_or(current.stock);
        check_product_numbers(price, stock)?;

        let product = sqlx::query_as::<_, Product>(
            "UPDATE storefront.products
             SET product_code = $2, name = $3, description = $4, price = $5, stock = $6, category = $7, images = $8
             WHERE id = $1
             RETURNING *",
        )
        .bind(product_id)
        .bind(update.product_code.map(|c| c.trim().to_string()).unwrap_or(current.product_code))
        .bind(update.name.map(|n| n.trim().to_string()).unwrap_or(current.name))
        .bind(update.description.unwrap_or(current.description))
        .bind(price)
        .bind(stock)
        .bind(update.category.map(|c| c.trim().to_string()).unwrap_or(current.category))
        .bind(update.images.unwrap_or(current.images))
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn delete_product(&self, product_id: Uuid) -> ServiceResult<()> {
        let removed = sqlx::query("DELETE FROM storefront.products WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if removed == 0 {
            return Err(ServiceError::not_found("Product"));
        }
        Ok(())
    }

    pub async fn low_stock(&self, threshold: Option<i32>) -> ServiceResult<Vec<Product>> {
        let threshold = threshold.unwrap_or(self.listing.low_stock_threshold);
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM storefront.products WHERE stock <= $1 ORDER BY stock, name",
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn restock(&self, admin_id: Uuid, product_id: Uuid, quantity: i32) -> ServiceResult<Product> {
        if quantity <= 0 {
            return Err(ServiceError::invalid("quantity", "must be greater than 0"));
        }
        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            "UPDATE storefront.products SET stock = stock + $2 WHERE id = $1 RETURNING *",
        )
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product"))?;

        log_inventory(&mut *tx, product_id, InventoryAction::StockIn, quantity, admin_id).await?;
        tx.commit().await?;
        info!("Restocked {} by {} to {}", product.product_code, quantity, product.stock);
        Ok(product)
    }

    /// Best sellers by units sold, products without sales included.
    pub async fn top_products(&self, limit: Option<i64>) -> ServiceResult<Vec<TopProduct>> {
        let products = sqlx::query_as::<_, TopProduct>(
            "SELECT p.id, p.name, p.product_code,
                    COALESCE(SUM(i.quantity) FILTER (WHERE o.id IS NOT NULL), 0)::int8 AS sales,
                    COALESCE(SUM(i.quantity * i.price) FILTER (WHERE o.id IS NOT NULL), 0) AS revenue
             FROM storefront.products p
             LEFT JOIN storefront.order_items i ON i.product_id = p.id
             LEFT JOIN storefront.orders o ON o.id = i.order_id AND o.order_status <> 'cancelled'
             GROUP BY p.id
             ORDER BY sales DESC, revenue DESC, p.name
             LIMIT $1",
        )
        .bind(report_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn category_sales(&self) -> ServiceResult<Vec<CategorySales>> {
        let categories = sqlx::query_as::<_, CategorySales>(
            "SELECT p.category, COALESCE(SUM(i.quantity * i.price), 0) AS sales
             FROM storefront.order_items i
             JOIN storefront.orders o ON o.id = i.order_id AND o.order_status <> 'cancelled'
             JOIN storefront.products p ON p.id = i.product_id
             GROUP BY p.category
             ORDER BY sales DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    // Orders

    pub async fn all_orders(&self) -> ServiceResult<Vec<OrderSummary>> {
        let query = format!("{} ORDER BY o.placed_at DESC", ORDER_SUMMARY_SELECT);
        let orders = sqlx::query_as::<_, OrderSummary>(&query).fetch_all(&self.pool).await?;
        Ok(orders)
    }

    /// Place an order on a customer's behalf from explicit lines.
    pub async fn admin_create_order(&self, admin_id: Uuid, request: AdminCreateOrder) -> ServiceResult<OrderDetail> {
        self.get_user(request.user_id).await?;
        for line in &request.items {
            require_quantity(line.quantity)?;
        }

        let mut tx = self.pool.begin().await?;
        let order = write_order(
            &mut tx,
            NewOrder {
                user_id: request.user_id,
                lines: request.items.iter().map(|l| (l.product_id, l.quantity)).collect(),
                shipping_address: &request.shipping_address,
                payment_method: request.payment_method.unwrap_or(PaymentMethod::Cod),
                status: request.order_status.unwrap_or(OrderStatus::Pending),
                performed_by: admin_id,
            },
        )
        .await?;
        tx.commit().await?;

        info!("Admin {} created order {} for {}", admin_id, order.id, request.user_id);
        self.order_detail(order.id).await
    }

    pub async fn admin_order(&self, order_id: Uuid) -> ServiceResult<OrderDetail> {
        self.order_detail(order_id).await
    }

    pub async fn delete_order(&self, order_id: Uuid) -> ServiceResult<()> {
        let removed = sqlx::query("DELETE FROM storefront.orders WHERE id = $1")
            .bind(order_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if removed == 0 {
            return Err(ServiceError::not_found("Order"));
        }
        Ok(())
    }

    pub async fn admin_set_status(&self, admin_id: Uuid, order_id: Uuid, status: OrderStatus) -> ServiceResult<Order> {
        let mut tx = self.pool.begin().await?;
        let order = lock_order(&mut *tx, order_id).await?;
        let order = transition_order(&mut tx, &order, status, admin_id).await?;
        tx.commit().await?;
        info!("Admin {} moved order {} to {}", admin_id, order.id, status);
        Ok(order)
    }

    pub async fn assign_salesman(&self, order_id: Uuid, salesman_id: Uuid) -> ServiceResult<Order> {
        let role: Option<StoreRole> = sqlx::query_scalar("SELECT role FROM storefront.users WHERE id = $1")
            .bind(salesman_id)
            .fetch_optional(&self.pool)
            .await?;
        match role {
            None => return Err(ServiceError::not_found("Salesman")),
            Some(StoreRole::Salesman) => {}
            Some(_) => return Err(ServiceError::invalid("salesman_id", "user is not a salesman")),
        }

        sqlx::query_as::<_, Order>("UPDATE storefront.orders SET salesman_id = $2 WHERE id = $1 RETURNING *")
            .bind(order_id)
            .bind(salesman_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order"))
    }

    pub async fn recent_orders(&self, limit: Option<i64>) -> ServiceResult<Vec<RecentOrder>> {
        let orders = sqlx::query_as::<_, RecentOrder>(
            "SELECT o.id, u.name AS customer, o.total_amount AS amount, o.order_status AS status,
                    o.placed_at::date AS date
             FROM storefront.orders o
             JOIN storefront.users u ON u.id = o.user_id
             ORDER BY o.placed_at DESC
             LIMIT $1",
        )
        .bind(report_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    // Dashboard and metrics

    pub async fn dashboard(&self) -> ServiceResult<StoreDashboard> {
        let ((total_customers, total_products), sales, orders_by_status) =
            futures::try_join!(self.catalog_counts(), self.sales_report(), self.order_stats())?;
        let total_orders = orders_by_status.pending
            + orders_by_status.processing
            + orders_by_status.shipped
            + orders_by_status.delivered
            + orders_by_status.cancelled;

        Ok(StoreDashboard {
            total_customers,
            total_products,
            total_orders,
            total_sales: sales.total_sales,
            orders_by_status,
        })
    }

    async fn catalog_counts(&self) -> ServiceResult<(i64, i64)> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            "SELECT (SELECT COUNT(*) FROM storefront.users WHERE role = 'customer'),
                    (SELECT COUNT(*) FROM storefront.products)",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    /// Orders and sales, cancelled orders excluded.
    pub async fn sales_report(&self) -> ServiceResult<SalesReport> {
        let report = sqlx::query_as::<_, SalesReport>(
            "SELECT COUNT(*) AS total_orders, COALESCE(SUM(total_amount), 0) AS total_sales
             FROM storefront.orders
             WHERE order_status <> 'cancelled'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(report)
    }

    pub async fn order_stats(&self) -> ServiceResult<OrdersByStatus> {
        let rows: Vec<(OrderStatus, i64)> =
            sqlx::query_as("SELECT order_status, COUNT(*) FROM storefront.orders GROUP BY order_status")
                .fetch_all(&self.pool)
                .await?;
        Ok(orders_by_status(&rows))
    }

    pub async fn summary_metrics(&self) -> ServiceResult<SummaryMetrics> {
        let window = sqlx::query_as::<_, OrderWindow>(
            "WITH bounds AS (SELECT date_trunc('month', now()) AS this_month)
             SELECT COALESCE(SUM(total_amount) FILTER (WHERE order_status <> 'cancelled'), 0) AS total_sales,
                    COUNT(*) AS total_orders,
                    COUNT(*) FILTER (WHERE order_status = 'pending') AS pending_orders,
                    COALESCE(SUM(total_amount) FILTER (
                        WHERE order_status <> 'cancelled' AND placed_at >= this_month), 0) AS current_sales,
                    COALESCE(SUM(total_amount) FILTER (
                        WHERE order_status <> 'cancelled'
                          AND placed_at >= this_month - interval '1 month' AND placed_at < this_month), 0)
                        AS previous_sales,
                    COUNT(*) FILTER (WHERE placed_at >= this_month) AS current_orders,
                    COUNT(*) FILTER (
                        WHERE placed_at >= this_month - interval '1 month' AND placed_at < this_month)
                        AS previous_orders
             FROM storefront.orders, bounds",
        )
        .fetch_one(&self.pool)
        .await?;
        let customers = self.customer_counts().await?;

        Ok(SummaryMetrics {
            total_sales: window.total_sales,
            total_orders: window.total_orders,
            total_customers: customers.total_customers,
            pending_orders: window.pending_orders,
            sales_growth: growth_percent(window.current_sales, window.previous_sales),
            order_growth: growth_percent(
                Decimal::from(window.current_orders),
                Decimal::from(window.previous_orders),
            ),
            customer_growth: customer_growth(customers.new_customers, customers.total_customers),
        })
    }

    /// Customer totals and the running customer count per month of this year.
    pub async fn customer_stats(&self) -> ServiceResult<CustomerStats> {
        let customers = self.customer_counts().await?;
        let rows: Vec<(i32, i64)> = sqlx::query_as(
            "SELECT EXTRACT(MONTH FROM created_at)::int4 AS month, COUNT(*)
             FROM storefront.users
             WHERE role = 'customer' AND created_at >= date_trunc('year', now())
             GROUP BY month",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(CustomerStats {
            total_customers: customers.total_customers,
            new_customers: customers.new_customers,
            monthly_growth: cumulative_customers(&rows),
        })
    }

    pub async fn sales_analytics(&self) -> ServiceResult<Vec<MonthlySales>> {
        let rows: Vec<(i32, Decimal)> = sqlx::query_as(
            "SELECT EXTRACT(MONTH FROM placed_at)::int4 AS month, SUM(total_amount)
             FROM storefront.orders
             WHERE order_status <> 'cancelled' AND placed_at >= date_trunc('year', now())
             GROUP BY month",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(monthly_sales(&rows))
    }

    async fn customer_counts(&self) -> ServiceResult<CustomerCounts> {
        let counts = sqlx::query_as::<_, CustomerCounts>(
            "SELECT COUNT(*) AS total_customers,
                    COUNT(*) FILTER (WHERE created_at >= now() - interval '30 days') AS new_customers
             FROM storefront.users
             WHERE role = 'customer'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    // Settings

    pub async fn change_password(&self, user_id: Uuid, current: &str, new_password: &str) -> ServiceResult<()> {
        require_password(new_password)?;
        let user = self.get_user(user_id).await?;
        if !verify_password(current, &user.password_hash) {
            warn!("Rejected password change for {}", user.email);
            return Err(ServiceError::Validation("Current password is incorrect".to_string()));
        }
        self.store_password(user_id, new_password).await
    }

    pub async fn reset_password(&self, user_id: Uuid, new_password: &str) -> ServiceResult<()> {
        require_password(new_password)?;
        self.store_password(user_id, new_password).await
    }

    /// Replace a user's password with a random one, returned only here.
    pub async fn generate_user_password(&self, user_id: Uuid) -> ServiceResult<GeneratedPassword> {
        let password = generate_password();
        self.store_password(user_id, &password).await?;
        Ok(GeneratedPassword { user_id, password })
    }

    async fn store_password(&self, user_id: Uuid, password: &str) -> ServiceResult<()> {
        let hash = hash_password(password)?;
        let updated = sqlx::query("UPDATE storefront.users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(user_id)
            .bind(hash)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(ServiceError::not_found("User"));
        }
        info!("Password replaced for storefront user {}", user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_lists_permissions() {
        let roles = roles();
        assert_eq!(roles.len(), 3);
        let admin = roles.iter().find(|r| r.name == StoreRole::Admin).unwrap();
        assert!(admin.permissions.contains(&"manage_users"));
        let customer = roles.iter().find(|r| r.name == StoreRole::Customer).unwrap();
        assert!(customer.permissions.contains(&"place_orders"));
    }

    #[test]
    fn report_limit_defaults_to_five() {
        assert_eq!(report_limit(None), 5);
        assert_eq!(report_limit(Some(0)), 5);
        assert_eq!(report_limit(Some(12)), 12);
    }

    #[test]
    fn product_numbers_are_non_negative() {
        assert!(check_product_numbers(Decimal::new(-1, 2), 0).is_err());
        assert!(check_product_numbers(Decimal::ZERO, -1).is_err());
        assert!(check_product_numbers(Decimal::new(999, 2), 3).is_ok());
    }
}
