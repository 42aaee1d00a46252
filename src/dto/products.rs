use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

/// Body for creating a product. It has no organization field: the owner
/// always comes from the caller's token.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "45.50")]
    pub price: Decimal,
    pub category: String,
    pub image_url: Option<String>,
    pub stock_qty: i32,
    pub weight_grams: i32,
}

/// Partial update. A field left out of the body keeps its stored value; an
/// explicit `null` clears `description` and `image_url`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProductPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "serde_with::rust::double_option::deserialize")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    #[schema(value_type = Option<String>, example = "45.50")]
    pub price: Option<Decimal>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "serde_with::rust::double_option::deserialize")]
    #[schema(value_type = Option<String>, nullable)]
    pub image_url: Option<Option<String>>,
    pub stock_qty: Option<i32>,
    pub weight_grams: Option<i32>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
