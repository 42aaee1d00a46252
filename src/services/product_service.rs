use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;

use crate::{
    dto::orders::OrderItemList,
    dto::products::{CreateProductRequest, ProductList, ProductPatch},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::TenantContext,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{Pagination, PublicProductQuery},
    services::order_service::order_item_from_entity,
};

/// Default page size for an organization's own catalog.
pub const ORG_DEFAULT_LIMIT: u64 = 100;

pub async fn create_product(
    db: &DatabaseConnection,
    tenant: &TenantContext,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let active = ActiveModel {
        id: NotSet,
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        category: Set(payload.category),
        image_url: Set(payload.image_url),
        stock_qty: Set(payload.stock_qty),
        weight_grams: Set(payload.weight_grams),
        organization_id: Set(tenant.organization_id),
    };
    let product = active.insert(db).await?;

    tracing::info!(
        product_id = product.id,
        organization_id = tenant.organization_id,
        "product created"
    );

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Id and owner are matched in the same query, so a product of another
/// organization is indistinguishable from a missing one.
async fn find_owned(
    db: &DatabaseConnection,
    tenant: &TenantContext,
    id: i32,
) -> AppResult<ProductModel> {
    Products::find()
        .filter(
            Condition::all()
                .add(Column::Id.eq(id))
                .add(Column::OrganizationId.eq(tenant.organization_id)),
        )
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_product(
    db: &DatabaseConnection,
    tenant: &TenantContext,
    id: i32,
) -> AppResult<ApiResponse<Product>> {
    let product = find_owned(db, tenant, id).await?;
    Ok(ApiResponse::success(
        "Product",
        product_from_entity(product),
        None,
    ))
}

pub async fn list_products(
    db: &DatabaseConnection,
    tenant: &TenantContext,
    page: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let items: Vec<Product> = Products::find()
        .filter(Column::OrganizationId.eq(tenant.organization_id))
        .order_by_asc(Column::Id)
        .offset(page.skip)
        .limit(page.limit)
        .all(db)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::page(page.skip, page.limit, items.len());
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn update_product(
    db: &DatabaseConnection,
    tenant: &TenantContext,
    id: i32,
    patch: ProductPatch,
) -> AppResult<ApiResponse<Product>> {
    let existing = find_owned(db, tenant, id).await?;
    let active = apply_patch(existing.clone().into(), patch);
    if !active.is_changed() {
        return Ok(ApiResponse::success(
            "Updated",
            product_from_entity(existing),
            Some(Meta::empty()),
        ));
    }
    let product = active.update(db).await?;

    tracing::info!(
        product_id = product.id,
        organization_id = tenant.organization_id,
        "product updated"
    );

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Copy the supplied fields onto `active`. The owner column is never touched.
fn apply_patch(mut active: ActiveModel, patch: ProductPatch) -> ActiveModel {
    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    if let Some(price) = patch.price {
        active.price = Set(price);
    }
    if let Some(category) = patch.category {
        active.category = Set(category);
    }
    if let Some(image_url) = patch.image_url {
        active.image_url = Set(image_url);
    }
    if let Some(stock_qty) = patch.stock_qty {
        active.stock_qty = Set(stock_qty);
    }
    if let Some(weight_grams) = patch.weight_grams {
        active.weight_grams = Set(weight_grams);
    }
    active
}

pub async fn delete_product(
    db: &DatabaseConnection,
    tenant: &TenantContext,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_owned(db, tenant, id).await?;

    Products::delete_by_id(existing.id)
        .exec(db)
        .await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::BadRequest(
                "product has been ordered and cannot be deleted".into(),
            ),
            _ => AppError::from(err),
        })?;

    tracing::info!(
        product_id = id,
        organization_id = tenant.organization_id,
        "product deleted"
    );

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "ok": true }),
        Some(Meta::empty()),
    ))
}

pub async fn list_public(
    db: &DatabaseConnection,
    query: PublicProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let page = query.pagination();
    let items: Vec<Product> = Products::find()
        .filter(public_condition(&query))
        .order_by_asc(Column::Id)
        .offset(page.skip)
        .limit(page.limit)
        .all(db)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::page(page.skip, page.limit, items.len());
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

/// Every supplied filter narrows the result; blank text filters are ignored.
fn public_condition(query: &PublicProductQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(category) = query.category.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(Expr::col(Column::Category).ilike(like_pattern(category)));
    }

    if let Some(price_min) = query.price_min {
        condition = condition.add(Column::Price.gte(price_min));
    }

    if let Some(price_max) = query.price_max {
        condition = condition.add(Column::Price.lte(price_max));
    }

    if let Some(search) = query.search.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    condition
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[derive(Debug, FromQueryResult)]
struct CategoryRow {
    category: String,
}

pub async fn list_categories(db: &DatabaseConnection) -> AppResult<ApiResponse<Vec<String>>> {
    let categories = Products::find()
        .select_only()
        .column(Column::Category)
        .distinct()
        .filter(Column::Category.ne(""))
        .order_by_asc(Column::Category)
        .into_model::<CategoryRow>()
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.category)
        .filter(|category| !category.trim().is_empty())
        .collect();

    Ok(ApiResponse::success("Categories", categories, None))
}

/// Items sold by the caller's organization, newest first.
pub async fn list_order_items(
    db: &DatabaseConnection,
    tenant: &TenantContext,
    page: Pagination,
) -> AppResult<ApiResponse<OrderItemList>> {
    let items: Vec<_> = OrderItems::find()
        .filter(OrderItemCol::OrganizationId.eq(tenant.organization_id))
        .order_by_desc(OrderItemCol::Id)
        .offset(page.skip)
        .limit(page.limit)
        .all(db)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    let meta = Meta::page(page.skip, page.limit, items.len());
    Ok(ApiResponse::success(
        "Order items",
        OrderItemList { items },
        Some(meta),
    ))
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        category: model.category,
        image_url: model.image_url,
        stock_qty: model.stock_qty,
        weight_grams: model.weight_grams,
        organization_id: model.organization_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    const TENANT_A: TenantContext = TenantContext {
        user_id: 1,
        organization_id: 10,
    };

    fn product(id: i32, organization_id: i32) -> ProductModel {
        ProductModel {
            id,
            name: "Vaso de Cerâmica".into(),
            description: Some("Feito à mão por artesãos locais.".into()),
            price: Decimal::new(4550, 2),
            category: "Decoração".into(),
            image_url: None,
            stock_qty: 15,
            weight_grams: 800,
            organization_id,
        }
    }

    /// SQL text and bound values of everything the mock executed.
    fn logged_sql(db: DatabaseConnection) -> String {
        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements())
            .map(|stmt| format!("{} {:?}", stmt.sql, stmt.values))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn foreign_product_is_not_found() {
        // The scoped query finds nothing when the product belongs to someone else.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ProductModel>::new()])
            .into_connection();

        let result = get_product(&db, &TENANT_A, 5).await;
        assert!(matches!(result, Err(AppError::NotFound)));

        let sql = logged_sql(db);
        assert!(sql.contains(r#""products"."id" = $1"#), "{sql}");
        assert!(sql.contains(r#""products"."organization_id" = $2"#), "{sql}");
    }

    #[tokio::test]
    async fn update_and_delete_of_foreign_product_write_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ProductModel>::new(), Vec::<ProductModel>::new()])
            .into_connection();

        let patch = ProductPatch {
            price: Some(Decimal::ONE),
            ..Default::default()
        };
        assert!(matches!(
            update_product(&db, &TENANT_A, 5, patch).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            delete_product(&db, &TENANT_A, 5).await,
            Err(AppError::NotFound)
        ));

        let sql = logged_sql(db);
        assert!(!sql.contains("UPDATE"), "{sql}");
        assert!(!sql.contains("DELETE"), "{sql}");
    }

    #[tokio::test]
    async fn created_product_belongs_to_the_caller() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product(1, TENANT_A.organization_id)]])
            .into_connection();

        // An organization_id smuggled into the body is not even deserialized.
        let payload: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "name": "Vaso de Cerâmica",
            "description": "Feito à mão por artesãos locais.",
            "price": "45.50",
            "category": "Decoração",
            "stock_qty": 15,
            "weight_grams": 800,
            "organization_id": 99
        }))
        .unwrap();

        let created = create_product(&db, &TENANT_A, payload).await.unwrap();
        assert_eq!(created.data.unwrap().organization_id, 10);

        let sql = logged_sql(db);
        assert!(sql.contains("Int(Some(10))"), "{sql}");
        assert!(!sql.contains("Int(Some(99))"), "{sql}");
    }

    #[tokio::test]
    async fn delete_of_owned_product_succeeds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product(5, TENANT_A.organization_id)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let resp = delete_product(&db, &TENANT_A, 5).await.unwrap();
        assert_eq!(resp.data.unwrap(), serde_json::json!({ "ok": true }));
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let original = product(5, 10);
        let active = apply_patch(
            original.clone().into(),
            ProductPatch {
                price: Some(Decimal::new(3990, 2)),
                stock_qty: Some(3),
                ..Default::default()
            },
        );

        assert_eq!(active.price, Set(Decimal::new(3990, 2)));
        assert_eq!(active.stock_qty, Set(3));
        assert!(!active.name.is_set());
        assert!(!active.description.is_set());
        assert!(!active.category.is_set());
        assert!(!active.organization_id.is_set());
        assert_eq!(active.name.as_ref(), &original.name);
    }

    #[tokio::test]
    async fn public_filters_are_combined() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product(1, 10)]])
            .into_connection();

        let query = PublicProductQuery {
            category: Some("decor".into()),
            price_min: Some(Decimal::new(20, 0)),
            price_max: Some(Decimal::new(60, 0)),
            search: Some("  ".into()),
            ..Default::default()
        };
        let resp = list_public(&db, query).await.unwrap();
        assert_eq!(resp.data.unwrap().items.len(), 1);
        assert_eq!(resp.meta.unwrap().limit, Some(20));

        let sql = logged_sql(db);
        assert!(sql.contains(r#""category" ILIKE $1"#), "{sql}");
        assert!(sql.contains(r#""products"."price" >= $2"#), "{sql}");
        assert!(sql.contains(r#""products"."price" <= $3"#), "{sql}");
        assert!(!sql.contains(r#""name" ILIKE"#), "{sql}");
        assert!(!sql.contains(r#""organization_id" ="#), "{sql}");
    }

    #[tokio::test]
    async fn search_matches_name_or_description() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product(1, 10)]])
            .into_connection();

        let query = PublicProductQuery {
            search: Some("artesãos".into()),
            ..Default::default()
        };
        list_public(&db, query).await.unwrap();

        let sql = logged_sql(db);
        assert!(sql.contains(r#""name" ILIKE $1 OR "description" ILIKE $2"#), "{sql}");
        assert!(sql.contains("%artesãos%"), "{sql}");
    }

    #[tokio::test]
    async fn categories_are_distinct_and_non_empty() {
        let rows = ["Acessórios", "Alimentos", "Decoração"]
            .map(|category| {
                std::collections::BTreeMap::from([(
                    "category",
                    sea_orm::Value::from(category),
                )])
            })
            .to_vec();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .into_connection();

        let categories = list_categories(&db).await.unwrap().data.unwrap();
        assert_eq!(categories, ["Acessórios", "Alimentos", "Decoração"]);

        let sql = logged_sql(db);
        assert!(sql.starts_with("SELECT DISTINCT"), "{sql}");
        assert!(sql.contains(r#""products"."category" <> $1"#), "{sql}");
    }

    #[test]
    fn explicit_null_clears_nullable_fields() {
        let patch: ProductPatch =
            serde_json::from_value(serde_json::json!({ "description": null })).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.image_url, None);

        let mut original = product(5, 10);
        original.image_url = Some("https://placehold.co/600x400?text=Vaso".into());
        let active = apply_patch(original.clone().into(), patch);
        assert_eq!(active.description, Set(None));
        assert!(!active.image_url.is_set());
        assert!(active.is_changed());

        let patch: ProductPatch = serde_json::from_value(serde_json::json!({
            "image_url": "https://placehold.co/600x400?text=Novo"
        }))
        .unwrap();
        let active = apply_patch(original.into(), patch);
        assert_eq!(
            active.image_url,
            Set(Some("https://placehold.co/600x400?text=Novo".to_string()))
        );
        assert!(!active.description.is_set());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" bolsa "), "% bolsa %");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
