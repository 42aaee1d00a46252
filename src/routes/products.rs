use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::products::{CreateProductRequest, ProductList, ProductPatch},
    error::AppResult,
    middleware::auth::TenantContext,
    models::Product,
    response::ApiResponse,
    routes::params::PageQuery,
    services::product_service::{self, ORG_DEFAULT_LIMIT},
    state::AppState,
};

/// Catalog management for the caller's organization. Every handler takes a
/// [`TenantContext`], so none of them runs without a valid token.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(PageQuery),
    responses(
        (status = 200, description = "Products of the caller's organization", body = ApiResponse<ProductList>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let page = query.pagination(ORG_DEFAULT_LIMIT);
    let resp = product_service::list_products(&state.orm, &tenant, page).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Product not found in the caller's organization"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::get_product(&state.orm, &tenant, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product owned by the caller's organization", body = ApiResponse<Product>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = product_service::create_product(&state.orm, &tenant, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = ProductPatch,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Product not found in the caller's organization"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<i32>,
    Json(payload): Json<ProductPatch>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state.orm, &tenant, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted product"),
        (status = 400, description = "Product is referenced by orders"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Product not found in the caller's organization"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state.orm, &tenant, id).await?;
    Ok(Json(resp))
}
