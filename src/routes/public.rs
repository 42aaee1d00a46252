use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::{
        products::ProductList,
        search::{AiSearchRequest, AiSearchResult},
    },
    error::AppResult,
    response::ApiResponse,
    routes::{orders, params::PublicProductQuery},
    services::{product_service, search_service},
    state::AppState,
};

/// Unauthenticated portal over every organization's catalog.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_public_products))
        .route("/categories", get(list_categories))
        .route("/search-ai", post(search_ai))
        .route("/orders", post(orders::create_order))
}

#[utoipa::path(
    get,
    path = "/api/public/products",
    params(PublicProductQuery),
    responses(
        (status = 200, description = "Products of all organizations matching every given filter", body = ApiResponse<ProductList>)
    ),
    tag = "Public"
)]
pub async fn list_public_products(
    State(state): State<AppState>,
    Query(query): Query<PublicProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_public(&state.orm, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/public/categories",
    responses(
        (status = 200, description = "Distinct product categories", body = ApiResponse<Vec<String>>)
    ),
    tag = "Public"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    let resp = product_service::list_categories(&state.orm).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/public/search-ai",
    request_body = AiSearchRequest,
    responses(
        (status = 200, description = "Filters understood from the query, or a text-search fallback", body = ApiResponse<AiSearchResult>),
        (status = 400, description = "Empty query")
    ),
    tag = "Public"
)]
pub async fn search_ai(
    State(state): State<AppState>,
    Json(payload): Json<AiSearchRequest>,
) -> AppResult<Json<ApiResponse<AiSearchResult>>> {
    let resp = search_service::smart_search(&state.interpreter, &payload.query).await?;
    Ok(Json(resp))
}
