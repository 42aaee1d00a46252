use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, TokenResponse},
        orders::{CartLine, CreateOrderRequest, OrderItemList, OrderWithItems},
        products::{CreateProductRequest, ProductList, ProductPatch},
        search::{AiSearchRequest, AiSearchResult, AppliedFilters},
    },
    models::{Order, OrderItem, Product},
    response::{ApiResponse, Meta},
    routes::{auth, health, orders, products, public},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "ONG Marketplace API"),
    paths(
        health::health_check,
        auth::login,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        public::list_public_products,
        public::list_categories,
        public::search_ai,
        orders::create_order,
        orders::list_sales
    ),
    components(
        schemas(
            Product,
            Order,
            OrderItem,
            LoginRequest,
            TokenResponse,
            CreateProductRequest,
            ProductPatch,
            ProductList,
            CartLine,
            CreateOrderRequest,
            OrderWithItems,
            OrderItemList,
            AiSearchRequest,
            AiSearchResult,
            AppliedFilters,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderItemList>,
            ApiResponse<AiSearchResult>,
            ApiResponse<TokenResponse>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Token issuing for organization users"),
        (name = "Products", description = "Catalog of the caller's organization"),
        (name = "Public", description = "Public portal across all organizations"),
        (name = "Orders", description = "Order placement and per-organization sales"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
