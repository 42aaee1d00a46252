use ong_marketplace_api::{
    db::{create_orm_conn, run_migrations},
    dto::{
        orders::{CartLine, CreateOrderRequest},
        products::{CreateProductRequest, ProductPatch},
    },
    entity::{
        orders::Entity as Orders,
        organizations::ActiveModel as OrganizationActive,
        products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::TenantContext,
    routes::params::{Pagination, PublicProductQuery},
    services::{auth_service::hash_password, order_service, product_service},
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set,
    Statement,
};

// Runs against a real Postgres: tenant isolation, public filters and the
// price snapshot taken when an order is placed.
#[tokio::test]
async fn tenant_catalog_and_order_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let db = setup(&database_url).await?;

    let artesaos = create_tenant(&db, "ONG Artesãos do Bem", "admin@artesaosdobem.org").await?;
    let sabor = create_tenant(&db, "ONG Sabor & Causa", "admin@saborcausa.org").await?;

    let vaso = create_product(&db, artesaos.organization_id, "Vaso de Cerâmica", "Decoração", 4550).await?;
    let geleia =
        create_product(&db, sabor.organization_id, "Geleia de Morango Orgânica", "Alimentos", 2500)
            .await?;
    create_product(&db, sabor.organization_id, "Camiseta 'Apoie essa Causa'", "Vestuário", 6000)
        .await?;

    // Another organization's product looks exactly like a missing one.
    let foreign = product_service::get_product(&db, &sabor, vaso).await;
    assert!(matches!(foreign, Err(AppError::NotFound)));
    let foreign_update = product_service::update_product(
        &db,
        &sabor,
        vaso,
        ProductPatch {
            price: Some(Decimal::new(100, 2)),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(foreign_update, Err(AppError::NotFound)));
    let foreign_delete = product_service::delete_product(&db, &sabor, vaso).await;
    assert!(matches!(foreign_delete, Err(AppError::NotFound)));

    // Create through the service: the owner comes from the tenant, not the body.
    let created = product_service::create_product(
        &db,
        &artesaos,
        CreateProductRequest {
            name: "Colar de Sementes".into(),
            description: Some("Biojóia da Amazônia.".into()),
            price: Decimal::new(3000, 2),
            category: "Acessórios".into(),
            image_url: None,
            stock_qty: 30,
            weight_grams: 100,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(created.organization_id, artesaos.organization_id);

    let fetched = product_service::get_product(&db, &artesaos, created.id)
        .await?
        .data
        .unwrap();
    assert_eq!(fetched, created);

    // Explicit values set nullable columns; explicit nulls clear them again.
    let described = product_service::update_product(
        &db,
        &artesaos,
        vaso,
        ProductPatch {
            description: Some(Some("Feito à mão por artesãos locais.".into())),
            image_url: Some(Some("https://placehold.co/600x400/D9A879/FFF?text=Vaso".into())),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(
        described.description.as_deref(),
        Some("Feito à mão por artesãos locais.")
    );

    let cleared = product_service::update_product(
        &db,
        &artesaos,
        created.id,
        serde_json::from_value(serde_json::json!({ "description": null }))?,
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.name, "Colar de Sementes");

    let own = product_service::list_products(&db, &artesaos, Pagination::new(None, None, 100))
        .await?
        .data
        .unwrap();
    assert_eq!(own.items.len(), 2);
    assert!(own.items.iter().all(|p| p.organization_id == artesaos.organization_id));

    // Public listing spans organizations and applies every filter.
    let by_price = product_service::list_public(
        &db,
        PublicProductQuery {
            price_min: Some(Decimal::new(20, 0)),
            price_max: Some(Decimal::new(60, 0)),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    let mut names: Vec<_> = by_price.items.iter().map(|p| p.name.as_str()).collect();
    names.sort();
    assert_eq!(
        names,
        [
            "Camiseta 'Apoie essa Causa'",
            "Colar de Sementes",
            "Geleia de Morango Orgânica",
            "Vaso de Cerâmica"
        ]
    );

    let decor = product_service::list_public(
        &db,
        PublicProductQuery {
            category: Some("decoração".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(decor.items.len(), 1);
    assert_eq!(decor.items[0].id, vaso);

    // Search matches the description as well as the name.
    let by_text = product_service::list_public(
        &db,
        PublicProductQuery {
            search: Some("Artesãos".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(by_text.items.len(), 1);
    assert_eq!(by_text.items[0].id, vaso);

    let combined = product_service::list_public(
        &db,
        PublicProductQuery {
            category: Some("Decoração".into()),
            price_min: Some(Decimal::new(20, 0)),
            price_max: Some(Decimal::new(60, 0)),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(combined.items.len(), 1);
    assert_eq!(combined.items[0].name, "Vaso de Cerâmica");

    let nothing = product_service::list_public(
        &db,
        PublicProductQuery {
            category: Some("Decoração".into()),
            price_max: Some(Decimal::new(40, 0)),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert!(nothing.items.is_empty());

    let categories = product_service::list_categories(&db).await?.data.unwrap();
    assert_eq!(categories, ["Acessórios", "Alimentos", "Decoração", "Vestuário"]);

    // Order across two organizations; later price changes leave it untouched.
    let order = order_service::create_order(
        &db,
        CreateOrderRequest {
            items: vec![
                CartLine {
                    product_id: geleia,
                    quantity: 2,
                },
                CartLine {
                    product_id: vaso,
                    quantity: 1,
                },
            ],
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].price_at_purchase, Decimal::new(2500, 2));
    assert_eq!(order.items[0].organization_id, sabor.organization_id);
    assert_eq!(order.items[1].price_at_purchase, Decimal::new(4550, 2));
    assert_eq!(order.items[1].organization_id, artesaos.organization_id);

    product_service::update_product(
        &db,
        &sabor,
        geleia,
        ProductPatch {
            price: Some(Decimal::new(9900, 2)),
            ..Default::default()
        },
    )
    .await?;

    let sales = product_service::list_order_items(&db, &sabor, Pagination::new(None, None, 100))
        .await?
        .data
        .unwrap();
    assert_eq!(sales.items.len(), 1);
    assert_eq!(sales.items[0].order_id, order.order.id);
    assert_eq!(sales.items[0].price_at_purchase, Decimal::new(2500, 2));

    // Ordered products cannot be removed.
    let ordered_delete = product_service::delete_product(&db, &sabor, geleia).await;
    assert!(matches!(ordered_delete, Err(AppError::BadRequest(_))));

    // One unknown product aborts the whole order.
    let orders_before = Orders::find().count(&db).await?;
    let rejected = order_service::create_order(
        &db,
        CreateOrderRequest {
            items: vec![
                CartLine {
                    product_id: vaso,
                    quantity: 1,
                },
                CartLine {
                    product_id: i32::MAX,
                    quantity: 1,
                },
            ],
        },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::ProductNotFound(id)) if id == i32::MAX));
    assert_eq!(Orders::find().count(&db).await?, orders_before);

    Ok(())
}

async fn setup(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    let db = create_orm_conn(database_url).await?;
    run_migrations(&db).await?;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "TRUNCATE order_items, orders, products, users, organizations RESTART IDENTITY CASCADE;",
    ))
    .await?;
    Ok(db)
}

async fn create_tenant(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
) -> anyhow::Result<TenantContext> {
    let organization = OrganizationActive {
        id: NotSet,
        name: Set(name.into()),
    }
    .insert(db)
    .await?;
    let user = UserActive {
        id: NotSet,
        email: Set(email.into()),
        password_hash: Set(hash_password("senha123")?),
        organization_id: Set(organization.id),
    }
    .insert(db)
    .await?;
    Ok(TenantContext {
        user_id: user.id,
        organization_id: organization.id,
    })
}

async fn create_product(
    db: &DatabaseConnection,
    organization_id: i32,
    name: &str,
    category: &str,
    cents: i64,
) -> anyhow::Result<i32> {
    let product = ProductActive {
        id: NotSet,
        name: Set(name.into()),
        description: Set(None),
        price: Set(Decimal::new(cents, 2)),
        category: Set(category.into()),
        image_url: Set(None),
        stock_qty: Set(10),
        weight_grams: Set(300),
        organization_id: Set(organization_id),
    }
    .insert(db)
    .await?;
    Ok(product.id)
}
