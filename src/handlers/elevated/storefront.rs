// handlers/elevated/storefront.rs - admin dashboard under /store/api/admin

use axum::{extract::State, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::storefront::{
    AdminCreateOrder, AssignSalesman, CategorySales, ChangePassword, CreateProduct, CreateUser, CustomerStats,
    GeneratedPassword, LimitQuery, MonthlySales, Order, OrderDetail, OrderSummary, OrdersByStatus, Product,
    RecentOrder, ResetPassword, Restock, RoleInfo, SalesReport, StatusUpdate, StoreDashboard, StoreUser,
    SummaryMetrics, ThresholdQuery, TopProduct, UpdateProduct, UpdateUser,
};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::storefront::{self, StorefrontService};
use crate::state::AppState;

fn service(state: AppState) -> StorefrontService {
    let listing = state.listing();
    StorefrontService::new(state.pool, listing)
}

fn deleted(id: Uuid) -> ApiResponse<Value> {
    ApiResponse::success(json!({ "id": id, "deleted": true }))
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<StoreUser>> {
    Ok(ApiResponse::success(service(state).list_users().await?))
}

pub async fn create_user(State(state): State<AppState>, ApiJson(request): ApiJson<CreateUser>) -> ApiResult<StoreUser> {
    Ok(ApiResponse::created(service(state).create_user(request).await?))
}

pub async fn get_user(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<StoreUser> {
    Ok(ApiResponse::success(service(state).get_user(id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<UpdateUser>,
) -> ApiResult<StoreUser> {
    Ok(ApiResponse::success(service(state).update_user(id, update).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Value> {
    service(state).delete_user(admin.id, id).await?;
    Ok(deleted(id))
}

/// GET /store/api/admin/roles
pub async fn roles() -> ApiResult<Vec<RoleInfo>> {
    Ok(ApiResponse::success(storefront::roles()))
}

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    Ok(ApiResponse::success(service(state).all_products().await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateProduct>,
) -> ApiResult<Product> {
    Ok(ApiResponse::created(service(state).create_product(request).await?))
}

pub async fn get_product(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Product> {
    Ok(ApiResponse::success(service(state).product_by_id(id).await?))
}

pub async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<UpdateProduct>,
) -> ApiResult<Product> {
    Ok(ApiResponse::success(service(state).update_product(id, update).await?))
}

pub async fn delete_product(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Value> {
    service(state).delete_product(id).await?;
    Ok(deleted(id))
}

/// GET /store/api/admin/products/low-stock?threshold=
pub async fn low_stock(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ThresholdQuery>,
) -> ApiResult<Vec<Product>> {
    Ok(ApiResponse::success(service(state).low_stock(query.threshold).await?))
}

/// POST /store/api/admin/products/:id/restock
pub async fn restock(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<Restock>,
) -> ApiResult<Product> {
    Ok(ApiResponse::success(service(state).restock(admin.id, id, request.quantity).await?))
}

pub async fn top_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> ApiResult<Vec<TopProduct>> {
    Ok(ApiResponse::success(service(state).top_products(query.limit).await?))
}

pub async fn category_sales(State(state): State<AppState>) -> ApiResult<Vec<CategorySales>> {
    Ok(ApiResponse::success(service(state).category_sales().await?))
}

pub async fn list_orders(State(state): State<AppState>) -> ApiResult<Vec<OrderSummary>> {
    Ok(ApiResponse::success(service(state).all_orders().await?))
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiJson(request): ApiJson<AdminCreateOrder>,
) -> ApiResult<OrderDetail> {
    Ok(ApiResponse::created(service(state).admin_create_order(admin.id, request).await?))
}

pub async fn get_order(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<OrderDetail> {
    Ok(ApiResponse::success(service(state).admin_order(id).await?))
}

pub async fn delete_order(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Value> {
    service(state).delete_order(id).await?;
    Ok(deleted(id))
}

/// PUT /store/api/admin/orders/:id
pub async fn set_order_status(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> ApiResult<Order> {
    Ok(ApiResponse::success(service(state).admin_set_status(admin.id, id, update.status).await?))
}

/// PUT /store/api/admin/orders/:id/assign
pub async fn assign_salesman(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AssignSalesman>,
) -> ApiResult<Order> {
    Ok(ApiResponse::success(service(state).assign_salesman(id, request.salesman_id).await?))
}

pub async fn recent_orders(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> ApiResult<Vec<RecentOrder>> {
    Ok(ApiResponse::success(service(state).recent_orders(query.limit).await?))
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<StoreDashboard> {
    Ok(ApiResponse::success(service(state).dashboard().await?))
}

pub async fn sales_report(State(state): State<AppState>) -> ApiResult<SalesReport> {
    Ok(ApiResponse::success(service(state).sales_report().await?))
}

pub async fn summary_metrics(State(state): State<AppState>) -> ApiResult<SummaryMetrics> {
    Ok(ApiResponse::success(service(state).summary_metrics().await?))
}

/// GET /store/api/admin/metrics/orders
pub async fn order_metrics(State(state): State<AppState>) -> ApiResult<Value> {
    let orders_by_status: OrdersByStatus = service(state).order_stats().await?;
    Ok(ApiResponse::success(json!({ "orders_by_status": orders_by_status })))
}

pub async fn customer_metrics(State(state): State<AppState>) -> ApiResult<CustomerStats> {
    Ok(ApiResponse::success(service(state).customer_stats().await?))
}

pub async fn sales_analytics(State(state): State<AppState>) -> ApiResult<Vec<MonthlySales>> {
    Ok(ApiResponse::success(service(state).sales_analytics().await?))
}

/// POST /store/api/admin/settings/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiJson(request): ApiJson<ChangePassword>,
) -> ApiResult<Value> {
    service(state)
        .change_password(admin.id, &request.current_password, &request.new_password)
        .await?;
    Ok(ApiResponse::success(json!({ "message": "Password updated" })))
}

/// POST /store/api/admin/settings/reset-user-password/:id
pub async fn reset_user_password(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ResetPassword>,
) -> ApiResult<Value> {
    service(state).reset_password(id, &request.new_password).await?;
    Ok(ApiResponse::success(json!({ "user_id": id, "message": "Password reset" })))
}

/// POST /store/api/admin/settings/generate-password/:id
pub async fn generate_password(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<GeneratedPassword> {
    Ok(ApiResponse::success(service(state).generate_user_password(id).await?))
}
