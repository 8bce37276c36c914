use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::{
    dto::reviews::{CreateReviewRequest, UpdateReviewRequest},
    entity::{
        Reviews,
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Model as ReviewModel},
    },
    error::{AppError, AppResult},
    models::Review,
    response::Page,
    routes::params::Pagination,
    services::product_service::find_product,
    state::AppState,
};

async fn find_review(state: &AppState, product_id: i64, id: i64) -> AppResult<ReviewModel> {
    Reviews::find_by_id(id)
        .filter(ReviewCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list_reviews(
    state: &AppState,
    product_id: i64,
    pagination: &Pagination,
) -> AppResult<Page<Review>> {
    let product = find_product(&state.orm, product_id).await?;
    let (page, per_page, offset) = pagination.normalize();

    let finder = Reviews::find()
        .filter(ReviewCol::ProductId.eq(product.id))
        .order_by_desc(ReviewCol::Date)
        .order_by_desc(ReviewCol::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let results = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();

    Ok(Page::new(results, page, per_page, total))
}

pub async fn get_review(state: &AppState, product_id: i64, id: i64) -> AppResult<Review> {
    find_review(state, product_id, id).await.map(Review::from)
}

/// The review always belongs to the product in the path.
pub async fn create_review(
    state: &AppState,
    product_id: i64,
    payload: CreateReviewRequest,
) -> AppResult<Review> {
    let product = find_product(&state.orm, product_id).await?;
    let input = payload.validate()?;

    let review = ReviewActive {
        product_id: Set(product.id),
        name: Set(input.name),
        description: Set(input.description),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    Ok(Review::from(review))
}

pub async fn update_review(
    state: &AppState,
    product_id: i64,
    id: i64,
    payload: UpdateReviewRequest,
) -> AppResult<Review> {
    let existing = find_review(state, product_id, id).await?;
    let changes = payload.validate()?;

    let mut active: ReviewActive = existing.into();
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    let review = active.update(&state.orm).await?;
    Ok(Review::from(review))
}

pub async fn delete_review(state: &AppState, product_id: i64, id: i64) -> AppResult<()> {
    let review = find_review(state, product_id, id).await?;
    Reviews::delete_by_id(review.id).exec(&state.orm).await?;
    Ok(())
}
