use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AiSearchRequest {
    pub query: String,
}

/// Filters the client should pass to `GET /api/public/products`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct AppliedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    #[schema(value_type = Option<f64>)]
    pub price_min: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    #[schema(value_type = Option<f64>)]
    pub price_max: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AiSearchResult {
    pub interpretation: String,
    pub applied_filters: AppliedFilters,
    pub is_fallback: bool,
}
