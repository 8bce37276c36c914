use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;

use crate::{
    dto::customers::{CreateCustomerRequest, CustomerChanges, UpdateCustomerRequest},
    entity::{
        Customers,
        customers::{ActiveModel as CustomerActive, Column as CustomerCol, Model as CustomerModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::Customer,
    response::Page,
    routes::params::{SearchQuery, prefix_pattern},
    state::AppState,
};

/// The customer row for an identity, created with an empty profile on first use.
pub async fn get_or_create_customer<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> AppResult<CustomerModel> {
    if let Some(customer) = Customers::find()
        .filter(CustomerCol::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(customer);
    }

    Customers::insert(CustomerActive {
        user_id: Set(user_id),
        ..Default::default()
    })
    .on_conflict(OnConflict::column(CustomerCol::UserId).do_nothing().to_owned())
    .exec_without_returning(db)
    .await?;

    let customer = Customers::find()
        .filter(CustomerCol::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("customer for user {user_id} vanished after insert"))?;
    tracing::info!(customer_id = customer.id, %user_id, "customer profile created");
    Ok(customer)
}

fn apply(active: &mut CustomerActive, changes: CustomerChanges) {
    if let Some(first_name) = changes.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = changes.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(phone) = changes.phone {
        active.phone = Set(phone);
    }
    if let Some(birth_date) = changes.birth_date {
        active.birth_date = Set(Some(birth_date));
    }
    if let Some(membership) = changes.membership {
        active.membership = Set(membership);
    }
}

pub async fn get_me(state: &AppState, user: &AuthUser) -> AppResult<Customer> {
    get_or_create_customer(&state.orm, user.user_id)
        .await
        .map(Customer::from)
}

pub async fn update_me(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateCustomerRequest,
) -> AppResult<Customer> {
    let changes = payload.validate()?;
    let existing = get_or_create_customer(&state.orm, user.user_id).await?;

    let mut active: CustomerActive = existing.into();
    apply(&mut active, changes);
    let customer = active.update(&state.orm).await?;
    Ok(Customer::from(customer))
}

/// Name search matches the start of the first or last name.
pub(crate) fn name_condition(term: Option<&str>) -> Condition {
    let mut condition = Condition::all();
    if let Some(term) = term {
        let pattern = prefix_pattern(term);
        condition = condition.add(
            Condition::any()
                .add(Expr::col((Customers, CustomerCol::FirstName)).ilike(pattern.clone()))
                .add(Expr::col((Customers, CustomerCol::LastName)).ilike(pattern)),
        );
    }
    condition
}

pub async fn list_customers(
    state: &AppState,
    user: &AuthUser,
    query: &SearchQuery,
) -> AppResult<Page<Customer>> {
    ensure_staff(user)?;
    let (page, per_page, offset) = query.pagination().normalize();

    let finder = Customers::find()
        .filter(name_condition(query.term()))
        .order_by_asc(CustomerCol::FirstName)
        .order_by_asc(CustomerCol::LastName)
        .order_by_asc(CustomerCol::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let results = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Customer::from)
        .collect();

    Ok(Page::new(results, page, per_page, total))
}

pub async fn get_customer(state: &AppState, user: &AuthUser, id: i64) -> AppResult<Customer> {
    ensure_staff(user)?;
    Customers::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(Customer::from)
        .ok_or(AppError::NotFound)
}

pub async fn create_customer(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCustomerRequest,
) -> AppResult<Customer> {
    ensure_staff(user)?;
    let (user_id, profile) = payload.validate()?;

    let taken = Customers::find()
        .filter(CustomerCol::UserId.eq(user_id))
        .count(&state.orm)
        .await?;
    if taken > 0 {
        return Err(AppError::field(
            "user_id",
            "customer with this user id already exists.",
        ));
    }

    let mut active = CustomerActive {
        user_id: Set(user_id),
        ..Default::default()
    };
    apply(&mut active, profile);
    let customer = active.insert(&state.orm).await?;

    tracing::info!(customer_id = customer.id, "customer created");
    Ok(Customer::from(customer))
}

pub async fn update_customer(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateCustomerRequest,
) -> AppResult<Customer> {
    ensure_staff(user)?;
    let existing = Customers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let changes = payload.validate()?;

    let mut active: CustomerActive = existing.into();
    apply(&mut active, changes);
    let customer = active.update(&state.orm).await?;
    Ok(Customer::from(customer))
}
