use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;

use crate::{
    dto::collections::{CreateCollectionRequest, UpdateCollectionRequest},
    entity::{
        Collections, Products,
        collections::{self, ActiveModel as CollectionActive, Column as CollectionCol},
        products::{self, Column as ProdCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::Collection,
    response::Page,
    routes::params::{SearchQuery, contains_pattern},
    state::AppState,
};

pub const COLLECTION_IN_USE: &str =
    "Collection cannot be deleted because it includes one or more products.";

#[derive(Debug, FromQueryResult)]
struct CollectionRow {
    id: i64,
    title: String,
    products_count: i64,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        Collection {
            id: row.id,
            title: row.title,
            products_count: row.products_count,
        }
    }
}

/// Collections joined with their products and grouped, so each row carries a count.
fn with_product_counts() -> Select<Collections> {
    Collections::find()
        .select_only()
        .column(CollectionCol::Id)
        .column(CollectionCol::Title)
        .column_as(
            Expr::col((products::Entity, ProdCol::Id)).count(),
            "products_count",
        )
        .join(JoinType::LeftJoin, collections::Relation::Products.def())
        .group_by(CollectionCol::Id)
        .group_by(CollectionCol::Title)
}

fn title_condition(term: Option<&str>) -> Condition {
    let mut condition = Condition::all();
    if let Some(term) = term {
        condition = condition.add(
            Expr::col((collections::Entity, CollectionCol::Title)).ilike(contains_pattern(term)),
        );
    }
    condition
}

/// Page of collections, optionally filtered by a title substring.
pub async fn list_collections(
    state: &AppState,
    query: &SearchQuery,
    default_per_page: i64,
) -> AppResult<Page<Collection>> {
    let (page, per_page, offset) = query.pagination().normalize_with(default_per_page);
    let condition = title_condition(query.term());

    let total = Collections::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await? as i64;

    let results = with_product_counts()
        .filter(condition)
        .order_by_asc(CollectionCol::Id)
        .limit(per_page as u64)
        .offset(offset as u64)
        .into_model::<CollectionRow>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Collection::from)
        .collect();

    Ok(Page::new(results, page, per_page, total))
}

pub async fn get_collection(state: &AppState, id: i64) -> AppResult<Collection> {
    let row = with_product_counts()
        .filter(CollectionCol::Id.eq(id))
        .into_model::<CollectionRow>()
        .one(&state.orm)
        .await?;
    row.map(Collection::from).ok_or(AppError::NotFound)
}

async fn ensure_featured_product<C: ConnectionTrait>(db: &C, product_id: i64) -> AppResult<()> {
    if Products::find_by_id(product_id).one(db).await?.is_none() {
        return Err(AppError::field(
            "featured_product",
            format!("Invalid pk \"{product_id}\" - object does not exist."),
        ));
    }
    Ok(())
}

async fn count_products<C: ConnectionTrait>(db: &C, collection_id: i64) -> AppResult<i64> {
    let count = Products::find()
        .filter(ProdCol::CollectionId.eq(collection_id))
        .count(db)
        .await?;
    Ok(count as i64)
}

pub async fn create_collection(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCollectionRequest,
) -> AppResult<Collection> {
    ensure_staff(user)?;
    let input = payload.validate()?;
    if let Some(product_id) = input.featured_product {
        ensure_featured_product(&state.orm, product_id).await?;
    }

    let collection = CollectionActive {
        title: Set(input.title),
        featured_product_id: Set(input.featured_product),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(collection_id = collection.id, "collection created");
    Ok(Collection::from_entity(collection, 0))
}

pub async fn update_collection(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateCollectionRequest,
) -> AppResult<Collection> {
    ensure_staff(user)?;
    let existing = Collections::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let changes = payload.validate()?;

    let mut active: CollectionActive = existing.into();
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(product_id) = changes.featured_product {
        ensure_featured_product(&state.orm, product_id).await?;
        active.featured_product_id = Set(Some(product_id));
    }
    let collection = active.update(&state.orm).await?;

    let products_count = count_products(&state.orm, collection.id).await?;
    Ok(Collection::from_entity(collection, products_count))
}

/// Refuses while any product still belongs to the collection.
pub async fn delete_collection(state: &AppState, user: &AuthUser, id: i64) -> AppResult<()> {
    ensure_staff(user)?;
    let existing = Collections::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if count_products(&state.orm, existing.id).await? > 0 {
        return Err(AppError::Conflict(COLLECTION_IN_USE.into()));
    }

    Collections::delete_by_id(existing.id)
        .exec(&state.orm)
        .await?;
    tracing::info!(collection_id = id, "collection deleted");
    Ok(())
}
