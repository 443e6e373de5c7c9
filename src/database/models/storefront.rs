//! E-commerce storefront records and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::text_enum;

text_enum! {
    pub enum StoreRole {
        Admin => "admin",
        Customer => "customer",
        Salesman => "salesman",
    }
}

impl StoreRole {
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            StoreRole::Admin => &["manage_users", "manage_products", "manage_orders"],
            StoreRole::Customer => &["view_products", "place_orders", "view_own_orders"],
            StoreRole::Salesman => &["view_products", "manage_orders"],
        }
    }
}

text_enum! {
    pub enum OrderStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

text_enum! {
    pub enum PaymentMethod {
        Cod => "COD",
        Online => "Online",
    }
}

text_enum! {
    pub enum InventoryAction {
        StockIn => "stock_in",
        StockOut => "stock_out",
    }
}

text_enum! {
    pub enum ProductSort {
        LowToHigh => "lowToHigh",
        HighToLow => "highToLow",
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoreUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub address: Option<String>,
    pub image: Option<String>,
    pub role: StoreRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub product_code: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub total: i64,
}

/// One cart row joined with its product.
#[derive(Debug, Clone, FromRow)]
pub struct CartLine {
    #[sqlx(flatten)]
    pub product: Product,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub product_code: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total: Decimal,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WishlistEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: Decimal,
    pub order_status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub salesman_id: Option<Uuid>,
    pub tracking_id: Option<String>,
    pub tracking_provider: Option<String>,
    pub tracking_status: Option<String>,
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
}

/// An order line; `price` is the unit price when the order was placed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub quantity: i32,
    pub price: Decimal,
    pub product_name: Option<String>,
    pub product_code: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: String,
    pub customer_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InventoryLog {
    pub id: Uuid,
    pub product_id: Uuid,
    pub action: InventoryAction,
    pub quantity: i32,
    pub performed_by: Option<Uuid>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesmanDashboard {
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub orders: Vec<OrderSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleInfo {
    pub name: StoreRole,
    pub permissions: &'static [&'static str],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrdersByStatus {
    pub pending: i64,
    /// Orders in the `confirmed` state.
    pub processing: i64,
    pub shipped: i64,
    pub delivered: i64,
    pub cancelled: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreDashboard {
    pub total_customers: i64,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_sales: Decimal,
    pub orders_by_status: OrdersByStatus,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SalesReport {
    pub total_orders: i64,
    pub total_sales: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryMetrics {
    pub total_sales: Decimal,
    pub total_orders: i64,
    pub total_customers: i64,
    pub pending_orders: i64,
    pub sales_growth: f64,
    pub order_growth: f64,
    pub customer_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCustomers {
    pub month: &'static str,
    pub customers: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerStats {
    pub total_customers: i64,
    pub new_customers: i64,
    pub monthly_growth: Vec<MonthlyCustomers>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySales {
    pub month: &'static str,
    pub sales: Decimal,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TopProduct {
    pub id: Uuid,
    pub name: String,
    pub product_code: String,
    pub sales: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategorySales {
    pub category: String,
    pub sales: Decimal,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecentOrder {
    pub id: Uuid,
    pub customer: String,
    pub amount: Decimal,
    pub status: OrderStatus,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPassword {
    pub user_id: Uuid,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfile {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<ProductSort>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartChange {
    pub product_code: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductRef {
    pub product_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrder {
    pub shipping_address: String,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignSalesman {
    pub salesman_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role: Option<StoreRole>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<StoreRole>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub product_code: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: Option<i32>,
    pub category: String,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub product_code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThresholdQuery {
    pub threshold: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Restock {
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminCreateOrder {
    pub user_id: Uuid,
    pub items: Vec<OrderLine>,
    pub shipping_address: String,
    pub payment_method: Option<PaymentMethod>,
    pub order_status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPassword {
    pub new_password: String,
}
