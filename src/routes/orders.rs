use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::orders::{CreateOrderRequest, OrderItemList, OrderWithItems},
    error::AppResult,
    middleware::auth::TenantContext,
    response::ApiResponse,
    routes::params::PageQuery,
    services::{order_service, product_service},
    state::AppState,
};

/// Per-organization view of what has been sold.
pub fn sales_router() -> Router<AppState> {
    Router::new().route("/", get(list_sales))
}

#[utoipa::path(
    post,
    path = "/api/public/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order stored with its items", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty cart or invalid quantity"),
        (status = 404, description = "A product in the cart does not exist"),
        (status = 500, description = "Order could not be stored")
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let resp = order_service::create_order(&state.orm, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/sales",
    params(PageQuery),
    responses(
        (status = 200, description = "Order items of the caller's organization", body = ApiResponse<OrderItemList>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<OrderItemList>>> {
    let page = query.pagination(product_service::ORG_DEFAULT_LIMIT);
    let resp = product_service::list_order_items(&state.orm, &tenant, page).await?;
    Ok(Json(resp))
}
