// handlers/public/storefront.rs - signup, login and the catalog under /store

use axum::extract::State;
use uuid::Uuid;

use crate::database::models::storefront::{CatalogPage, CatalogQuery, LoginRequest, Product, SignupRequest, StoreUser};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::services::storefront::{LoginResponse, StorefrontService};
use crate::state::AppState;

fn service(state: AppState) -> StorefrontService {
    let listing = state.listing();
    StorefrontService::new(state.pool, listing)
}

/// POST /store/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> ApiResult<StoreUser> {
    Ok(ApiResponse::created(service(state).signup(request).await?))
}

/// POST /store/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    Ok(ApiResponse::success(service(state).login(request).await?))
}

/// GET /store/products
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CatalogQuery>,
) -> ApiResult<CatalogPage> {
    Ok(ApiResponse::success(service(state).list_products(query).await?))
}

pub async fn product_by_id(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Product> {
    Ok(ApiResponse::success(service(state).product_by_id(id).await?))
}

pub async fn product_by_code(State(state): State<AppState>, ApiPath(code): ApiPath<String>) -> ApiResult<Product> {
    Ok(ApiResponse::success(service(state).product_by_code(&code).await?))
}
