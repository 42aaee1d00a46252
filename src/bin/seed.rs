use ong_marketplace_api::{
    db::{create_pool, orm_from_pool, run_migrations},
    services::auth_service::hash_password,
};
use rust_decimal::Decimal;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: Decimal,
    category: &'static str,
    image_url: &'static str,
    stock_qty: i32,
    weight_grams: i32,
}

struct SeedOrganization {
    name: &'static str,
    admin_email: &'static str,
    admin_password: &'static str,
    products: Vec<SeedProduct>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();
    let database_url = std::env::var("DATABASE_URL")?;

    let pool = create_pool(&database_url).await?;
    run_migrations(&orm_from_pool(pool.clone())).await?;

    for organization in organizations() {
        seed_organization(&pool, organization).await?;
    }

    println!("Seed completed");
    Ok(())
}

/// Insert the organization with its admin and catalog unless it already exists.
async fn seed_organization(pool: &sqlx::PgPool, org: SeedOrganization) -> anyhow::Result<()> {
    let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM organizations WHERE name = $1")
        .bind(org.name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        tracing::info!(organization_id = id, name = org.name, "organization already seeded");
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    let (organization_id,): (i32,) =
        sqlx::query_as("INSERT INTO organizations (name) VALUES ($1) RETURNING id")
            .bind(org.name)
            .fetch_one(&mut *tx)
            .await?;

    sqlx::query(
        r#"
        INSERT INTO users (email, password_hash, organization_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(org.admin_email)
    .bind(hash_password(org.admin_password)?)
    .bind(organization_id)
    .execute(&mut *tx)
    .await?;

    for product in &org.products {
        sqlx::query(
            r#"
            INSERT INTO products
                (name, description, price, category, image_url, stock_qty, weight_grams, organization_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(product.name)
        .bind(product.description)
        .bind(product.price)
        .bind(product.category)
        .bind(product.image_url)
        .bind(product.stock_qty)
        .bind(product.weight_grams)
        .bind(organization_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!(
        organization_id,
        name = org.name,
        admin = org.admin_email,
        products = org.products.len(),
        "organization seeded"
    );
    Ok(())
}

fn organizations() -> Vec<SeedOrganization> {
    vec![
        SeedOrganization {
            name: "ONG Artesãos do Bem",
            admin_email: "admin@artesaosdobem.org",
            admin_password: "senha123",
            products: vec![
                SeedProduct {
                    name: "Vaso de Cerâmica",
                    description: "Feito à mão por artesãos locais.",
                    price: Decimal::new(4550, 2),
                    category: "Decoração",
                    image_url: "https://placehold.co/600x400/D9A879/FFF?text=Vaso",
                    stock_qty: 15,
                    weight_grams: 800,
                },
                SeedProduct {
                    name: "Bolsa de Palha",
                    description: "Ideal para praia e dia a dia.",
                    price: Decimal::new(7500, 2),
                    category: "Acessórios",
                    image_url: "https://placehold.co/600x400/B8D979/FFF?text=Bolsa",
                    stock_qty: 10,
                    weight_grams: 450,
                },
                SeedProduct {
                    name: "Colar de Sementes",
                    description: "Biojóia da Amazônia.",
                    price: Decimal::new(3000, 2),
                    category: "Acessórios",
                    image_url: "https://placehold.co/600x400/D97979/FFF?text=Colar",
                    stock_qty: 30,
                    weight_grams: 100,
                },
            ],
        },
        SeedOrganization {
            name: "ONG Sabor & Causa",
            admin_email: "admin@saborcausa.org",
            admin_password: "senha456",
            products: vec![
                SeedProduct {
                    name: "Geleia de Morango Orgânica",
                    description: "Doces sem conservantes.",
                    price: Decimal::new(2500, 2),
                    category: "Alimentos",
                    image_url: "https://placehold.co/600x400/D979B8/FFF?text=Geleia",
                    stock_qty: 50,
                    weight_grams: 300,
                },
                SeedProduct {
                    name: "Café Especial 500g",
                    description: "Grãos selecionados de pequenos produtores.",
                    price: Decimal::new(5500, 2),
                    category: "Alimentos",
                    image_url: "https://placehold.co/600x400/8C5D3D/FFF?text=Café",
                    stock_qty: 25,
                    weight_grams: 500,
                },
                SeedProduct {
                    name: "Camiseta 'Apoie essa Causa'",
                    description: "100% Algodão.",
                    price: Decimal::new(6000, 2),
                    category: "Vestuário",
                    image_url: "https://placehold.co/600x400/79D9D0/FFF?text=Camiseta",
                    stock_qty: 40,
                    weight_grams: 250,
                },
            ],
        },
    ]
}
