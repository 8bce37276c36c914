use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;

use crate::{
    dto::admin::ClearInventoryRequest,
    entity::{
        Collections, Customers, Orders, Products,
        customers::{self, Column as CustomerCol, Membership},
        orders::Column as OrderCol,
        products::Column as ProdCol,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_staff},
    models::{
        AdminCustomer, AdminOrder, AdminProduct, ClearInventoryResult, Collection,
        LOW_INVENTORY_THRESHOLD,
    },
    response::Page,
    routes::params::{AdminProductQuery, InventoryFilter, Pagination, SearchQuery, contains_pattern},
    services::{collection_service, customer_service::name_condition},
    state::AppState,
};

pub const ADMIN_CUSTOMERS_PER_PAGE: i64 = 20;

fn product_condition(query: &AdminProductQuery) -> Condition {
    let mut condition = Condition::all();
    match query.inventory {
        Some(InventoryFilter::Low) => {
            condition = condition.add(ProdCol::Inventory.lt(LOW_INVENTORY_THRESHOLD));
        }
        Some(InventoryFilter::Ok) => {
            condition = condition.add(ProdCol::Inventory.gte(LOW_INVENTORY_THRESHOLD));
        }
        None => {}
    }
    if let Some(collection_id) = query.collection_id {
        condition = condition.add(ProdCol::CollectionId.eq(collection_id));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition =
            condition.add(Expr::col((Products, ProdCol::Title)).ilike(contains_pattern(search)));
    }
    condition
}

/// Products with inventory status and collection title, ordered by title.
pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: AdminProductQuery,
) -> AppResult<Page<AdminProduct>> {
    ensure_staff(user)?;
    let (page, per_page, offset) = query.pagination().normalize();

    let finder = Products::find()
        .filter(product_condition(&query))
        .order_by_asc(ProdCol::Title)
        .order_by_asc(ProdCol::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let results = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .find_also_related(Collections)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(product, collection)| {
            let collection_title = collection.map(|c| c.title).unwrap_or_default();
            AdminProduct::from_entity(product, collection_title)
        })
        .collect();

    Ok(Page::new(results, page, per_page, total))
}

/// Sets inventory to zero for every listed product.
pub async fn clear_inventory(
    state: &AppState,
    user: &AuthUser,
    payload: ClearInventoryRequest,
) -> AppResult<ClearInventoryResult> {
    ensure_staff(user)?;
    let ids = payload.validate()?;

    let txn = state.orm.begin().await?;
    let result = Products::update_many()
        .col_expr(ProdCol::Inventory, Expr::value(0))
        .col_expr(ProdCol::LastUpdate, Expr::current_timestamp().into())
        .filter(ProdCol::Id.is_in(ids))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    tracing::info!(updated = result.rows_affected, "inventory cleared");
    Ok(ClearInventoryResult {
        updated_count: result.rows_affected,
    })
}

#[derive(Debug, FromQueryResult)]
struct CustomerRow {
    id: i64,
    first_name: String,
    last_name: String,
    membership: Membership,
    orders_count: i64,
}

impl From<CustomerRow> for AdminCustomer {
    fn from(row: CustomerRow) -> Self {
        AdminCustomer {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            membership: row.membership,
            orders_count: row.orders_count,
        }
    }
}

/// Customers with their order counts, ordered by first then last name.
pub async fn list_customers(
    state: &AppState,
    user: &AuthUser,
    query: &SearchQuery,
) -> AppResult<Page<AdminCustomer>> {
    ensure_staff(user)?;
    let (page, per_page, offset) = query.pagination().normalize_with(ADMIN_CUSTOMERS_PER_PAGE);
    let condition = name_condition(query.term());

    let total = Customers::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await? as i64;

    let results = Customers::find()
        .select_only()
        .column(CustomerCol::Id)
        .column(CustomerCol::FirstName)
        .column(CustomerCol::LastName)
        .column(CustomerCol::Membership)
        .column_as(Expr::col((Orders, OrderCol::Id)).count(), "orders_count")
        .join(JoinType::LeftJoin, customers::Relation::Orders.def())
        .filter(condition)
        .group_by(CustomerCol::Id)
        .group_by(CustomerCol::FirstName)
        .group_by(CustomerCol::LastName)
        .group_by(CustomerCol::Membership)
        .order_by_asc(CustomerCol::FirstName)
        .order_by_asc(CustomerCol::LastName)
        .limit(per_page as u64)
        .offset(offset as u64)
        .into_model::<CustomerRow>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(AdminCustomer::from)
        .collect();

    Ok(Page::new(results, page, per_page, total))
}

pub async fn list_collections(
    state: &AppState,
    user: &AuthUser,
    query: &SearchQuery,
) -> AppResult<Page<Collection>> {
    ensure_staff(user)?;
    collection_service::list_collections(state, query, Pagination::DEFAULT_PER_PAGE).await
}

/// Most recent orders first, with the customer's name.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: &Pagination,
) -> AppResult<Page<AdminOrder>> {
    ensure_staff(user)?;
    let (page, per_page, offset) = pagination.normalize();

    let finder = Orders::find()
        .order_by_desc(OrderCol::PlacedAt)
        .order_by_desc(OrderCol::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let results = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .find_also_related(Customers)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(order, customer)| AdminOrder {
            id: order.id,
            placed_at: order.placed_at.with_timezone(&Utc),
            customer_id: order.customer_id,
            customer_name: customer.map(|c| c.full_name()).unwrap_or_default(),
            payment_status: order.payment_status,
        })
        .collect();

    Ok(Page::new(results, page, per_page, total))
}
