use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;

use crate::{
    dto::products::{CreateProductImageRequest, CreateProductRequest, UpdateProductRequest},
    entity::{
        Collections, OrderItems, ProductImages, Products,
        order_items::Column as OrderItemCol,
        product_images::{ActiveModel as ImageActive, Column as ImageCol},
        products::{ActiveModel as ProductActive, Column as ProdCol, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Product, ProductImage},
    response::Page,
    routes::params::{
        Pagination, ProductQuery, ProductSortBy, SortOrder, contains_pattern,
        parse_product_ordering,
    },
    state::AppState,
};

pub const PRODUCT_IN_USE: &str =
    "Product cannot be deleted because it is associated with an order item.";

/// Loads a product or fails with not-found.
pub async fn find_product<C: ConnectionTrait>(db: &C, id: i64) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

async fn ensure_collection<C: ConnectionTrait>(db: &C, collection_id: i64) -> AppResult<()> {
    if Collections::find_by_id(collection_id).one(db).await?.is_none() {
        return Err(AppError::field(
            "collection",
            format!("Invalid pk \"{collection_id}\" - object does not exist."),
        ));
    }
    Ok(())
}

fn product_condition(query: &ProductQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(collection_id) = query.collection_id {
        condition = condition.add(ProdCol::CollectionId.eq(collection_id));
    }
    if let Some(min_price) = query.min_price {
        condition = condition.add(ProdCol::UnitPrice.gt(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(ProdCol::UnitPrice.lt(max_price));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProdCol::Title).ilike(pattern.clone()))
                .add(Expr::col(ProdCol::Description).ilike(pattern)),
        );
    }

    condition
}

pub async fn list_products(state: &AppState, query: ProductQuery) -> AppResult<Page<Product>> {
    let (page, per_page, offset) = query.pagination().normalize();
    let ordering = query
        .ordering
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_product_ordering)
        .transpose()?;

    let mut finder = Products::find().filter(product_condition(&query));
    finder = match ordering {
        Some((sort_by, order)) => {
            let sort_col = match sort_by {
                ProductSortBy::UnitPrice => ProdCol::UnitPrice,
                ProductSortBy::LastUpdate => ProdCol::LastUpdate,
            };
            match order {
                SortOrder::Asc => finder.order_by_asc(sort_col),
                SortOrder::Desc => finder.order_by_desc(sort_col),
            }
        }
        None => finder,
    };
    finder = finder.order_by_asc(ProdCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let results = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(Page::new(results, page, per_page, total))
}

pub async fn get_product(state: &AppState, id: i64) -> AppResult<Product> {
    find_product(&state.orm, id).await.map(Product::from)
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<Product> {
    ensure_staff(user)?;
    let input = payload.validate()?;
    ensure_collection(&state.orm, input.collection_id).await?;

    let product = ProductActive {
        title: Set(input.title),
        slug: Set(input.slug),
        description: Set(input.description),
        unit_price: Set(input.unit_price),
        inventory: Set(input.inventory),
        collection_id: Set(input.collection_id),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(product_id = product.id, "product created");
    Ok(Product::from(product))
}

/// Partial update; PUT and PATCH share it.
pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateProductRequest,
) -> AppResult<Product> {
    ensure_staff(user)?;
    let existing = find_product(&state.orm, id).await?;
    let changes = payload.validate()?;

    let mut active: ProductActive = existing.into();
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(slug) = changes.slug {
        active.slug = Set(slug);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(unit_price) = changes.unit_price {
        active.unit_price = Set(unit_price);
    }
    if let Some(inventory) = changes.inventory {
        active.inventory = Set(inventory);
    }
    if let Some(collection_id) = changes.collection_id {
        ensure_collection(&state.orm, collection_id).await?;
        active.collection_id = Set(collection_id);
    }
    active.last_update = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;
    Ok(Product::from(product))
}

/// Refuses while any order item references the product.
pub async fn delete_product(state: &AppState, user: &AuthUser, id: i64) -> AppResult<()> {
    ensure_staff(user)?;
    let product = find_product(&state.orm, id).await?;

    let ordered = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(product.id))
        .count(&state.orm)
        .await?;
    if ordered > 0 {
        return Err(AppError::Conflict(PRODUCT_IN_USE.into()));
    }

    Products::delete_by_id(product.id).exec(&state.orm).await?;
    tracing::info!(product_id = id, "product deleted");
    Ok(())
}

pub async fn list_images(
    state: &AppState,
    product_id: i64,
    pagination: &Pagination,
) -> AppResult<Page<ProductImage>> {
    let product = find_product(&state.orm, product_id).await?;
    let (page, per_page, offset) = pagination.normalize();

    let finder = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product.id))
        .order_by_asc(ImageCol::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let results = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ProductImage::from)
        .collect();

    Ok(Page::new(results, page, per_page, total))
}

pub async fn get_image(state: &AppState, product_id: i64, id: i64) -> AppResult<ProductImage> {
    ProductImages::find_by_id(id)
        .filter(ImageCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .map(ProductImage::from)
        .ok_or(AppError::NotFound)
}

pub async fn create_image(
    state: &AppState,
    user: &AuthUser,
    product_id: i64,
    payload: CreateProductImageRequest,
) -> AppResult<ProductImage> {
    ensure_staff(user)?;
    let product = find_product(&state.orm, product_id).await?;
    let image = payload.validate()?;

    let image = ImageActive {
        product_id: Set(product.id),
        image: Set(image),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    Ok(ProductImage::from(image))
}

pub async fn delete_image(
    state: &AppState,
    user: &AuthUser,
    product_id: i64,
    id: i64,
) -> AppResult<()> {
    ensure_staff(user)?;
    let result = ProductImages::delete_many()
        .filter(ImageCol::Id.eq(id))
        .filter(ImageCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
