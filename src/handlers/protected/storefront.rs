// handlers/protected/storefront.rs - customer and salesman endpoints under /store/api

use std::str::FromStr;

use axum::{extract::State, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::storefront::{
    CartChange, CartView, Order, OrderDetail, OrderSummary, PlaceOrder, ProductRef, SalesmanDashboard, StatusUpdate,
    StoreRole, StoreUser, TopProduct, UpdateProfile, WishlistEntry,
};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser};
use crate::services::storefront::StorefrontService;
use crate::services::ServiceError;
use crate::state::AppState;

fn service(state: AppState) -> StorefrontService {
    let listing = state.listing();
    StorefrontService::new(state.pool, listing)
}

fn role(user: &AuthUser) -> Result<StoreRole, ApiError> {
    Ok(StoreRole::from_str(&user.role).map_err(ServiceError::from)?)
}

pub async fn profile(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<StoreUser> {
    Ok(ApiResponse::success(service(state).get_user(user.id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(update): ApiJson<UpdateProfile>,
) -> ApiResult<StoreUser> {
    Ok(ApiResponse::success(service(state).update_profile(user.id, update).await?))
}

/// GET /store/api/users/verify-token
pub async fn verify_token(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    let account = service(state).get_user(user.id).await?;
    Ok(ApiResponse::success(json!({ "valid": true, "user": account })))
}

pub async fn cart(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<CartView> {
    Ok(ApiResponse::success(service(state).cart(user.id).await?))
}

/// POST /store/api/cart/add
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(change): ApiJson<CartChange>,
) -> ApiResult<CartView> {
    Ok(ApiResponse::success(service(state).add_to_cart(user.id, change).await?))
}

/// PUT /store/api/cart/update
pub async fn update_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(change): ApiJson<CartChange>,
) -> ApiResult<CartView> {
    Ok(ApiResponse::success(service(state).update_cart(user.id, change).await?))
}

/// DELETE /store/api/cart/remove/:product_code
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(product_code): ApiPath<String>,
) -> ApiResult<CartView> {
    Ok(ApiResponse::success(service(state).remove_from_cart(user.id, &product_code).await?))
}

pub async fn wishlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<WishlistEntry>> {
    Ok(ApiResponse::success(service(state).wishlist(user.id).await?))
}

pub async fn add_to_wishlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(product): ApiJson<ProductRef>,
) -> ApiResult<Vec<WishlistEntry>> {
    Ok(ApiResponse::success(service(state).add_to_wishlist(user.id, product.product_id).await?))
}

/// DELETE /store/api/wishlist/remove takes the product in the body.
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(product): ApiJson<ProductRef>,
) -> ApiResult<Vec<WishlistEntry>> {
    Ok(ApiResponse::success(service(state).remove_from_wishlist(user.id, product.product_id).await?))
}

/// POST /store/api/orders/place
pub async fn place_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<PlaceOrder>,
) -> ApiResult<OrderDetail> {
    Ok(ApiResponse::created(service(state).place_order(user.id, request).await?))
}

pub async fn order_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<OrderDetail>> {
    Ok(ApiResponse::success(service(state).order_history(user.id).await?))
}

/// GET /store/api/orders/track/:id
pub async fn track_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(order_id): ApiPath<Uuid>,
) -> ApiResult<OrderDetail> {
    let role = role(&user)?;
    Ok(ApiResponse::success(service(state).track_order(user.id, role, order_id).await?))
}

/// PUT /store/api/orders/cancel/:id
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(order_id): ApiPath<Uuid>,
) -> ApiResult<Order> {
    Ok(ApiResponse::success(service(state).cancel_order(user.id, order_id).await?))
}

pub async fn salesman_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<SalesmanDashboard> {
    Ok(ApiResponse::success(service(state).salesman_dashboard(user.id).await?))
}

pub async fn salesman_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<OrderSummary>> {
    Ok(ApiResponse::success(service(state).salesman_orders(user.id).await?))
}

/// GET /store/api/salesman/sales-report
pub async fn salesman_sales_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<TopProduct>> {
    Ok(ApiResponse::success(service(state).salesman_sales_report(user.id).await?))
}

/// PUT /store/api/salesman/orders/:id/status
pub async fn salesman_set_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(order_id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> ApiResult<Order> {
    Ok(ApiResponse::success(
        service(state).salesman_set_status(user.id, order_id, update.status).await?,
    ))
}
