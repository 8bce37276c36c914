use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        Collections, Products,
        collections::{ActiveModel as CollectionActive, Column as CollectionCol},
        products::{ActiveModel as ProductActive, Column as ProdCol},
    },
    middleware::auth::encode_token,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    seed_catalog(&orm).await?;

    let ttl = chrono::Duration::days(7);
    let staff = encode_token(&config.jwt_secret, Uuid::new_v4(), true, None, ttl)?;
    let customer = encode_token(
        &config.jwt_secret,
        Uuid::new_v4(),
        false,
        Some("customer@example.com"),
        ttl,
    )?;
    println!("Seed completed.");
    println!("Staff token:    {staff}");
    println!("Customer token: {customer}");
    Ok(())
}

async fn ensure_collection(orm: &DatabaseConnection, title: &str) -> anyhow::Result<i64> {
    if let Some(existing) = Collections::find()
        .filter(CollectionCol::Title.eq(title))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }
    let collection = CollectionActive {
        title: Set(title.to_string()),
        ..Default::default()
    }
    .insert(orm)
    .await?;
    println!("Ensured collection {title}");
    Ok(collection.id)
}

async fn seed_catalog(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let apparel = ensure_collection(orm, "Apparel").await?;
    let kitchen = ensure_collection(orm, "Kitchen").await?;
    let books = ensure_collection(orm, "Books").await?;

    let products = vec![
        ("Axum Hoodie", "axum-hoodie", "Warm hoodie for Rustaceans", 5500, 50, apparel),
        ("Ferris Mug", "ferris-mug", "Coffee tastes better with Ferris", 1200, 100, kitchen),
        ("Rust Sticker Pack", "rust-sticker-pack", "Decorate your laptop", 500, 8, apparel),
        ("E-book: Async Rust", "ebook-async-rust", "Learn async Rust patterns", 2500, 75, books),
    ];

    for (title, slug, description, cents, inventory, collection_id) in products {
        let exists = Products::find()
            .filter(ProdCol::Slug.eq(slug))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }
        ProductActive {
            title: Set(title.to_string()),
            slug: Set(slug.to_string()),
            description: Set(Some(description.to_string())),
            unit_price: Set(Decimal::new(cents, 2)),
            inventory: Set(inventory),
            collection_id: Set(collection_id),
            ..Default::default()
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
