use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::AppError;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub const DEFAULT_PER_PAGE: i64 = 10;

    pub fn normalize(&self) -> (i64, i64, i64) {
        self.normalize_with(Self::DEFAULT_PER_PAGE)
    }

    /// `(page, per_page, offset)` with the page size defaulting to `default_per_page`.
    pub fn normalize_with(&self, default_per_page: i64) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(default_per_page).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortBy {
    UnitPrice,
    LastUpdate,
}

/// Parses `unit_price`, `-unit_price`, `last_update` or `-last_update`.
pub fn parse_product_ordering(raw: &str) -> Result<(ProductSortBy, SortOrder), AppError> {
    let (field, order) = match raw.strip_prefix('-') {
        Some(field) => (field, SortOrder::Desc),
        None => (raw, SortOrder::Asc),
    };
    let sort_by = match field {
        "unit_price" => ProductSortBy::UnitPrice,
        "last_update" => ProductSortBy::LastUpdate,
        other => {
            return Err(AppError::BadRequest(format!(
                "cannot order by `{other}`"
            )));
        }
    };
    Ok((sort_by, order))
}

/// Escapes `\`, `%` and `_` so `term` matches literally in a `LIKE` pattern.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `ILIKE` pattern for "contains `term`".
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

/// `ILIKE` pattern for "starts with `term`".
pub fn prefix_pattern(term: &str) -> String {
    format!("{}%", escape_like(term))
}

// Query strings are flat: `serde(flatten)` would hand every value to the
// inner struct as a string, so the page fields are repeated per query type.

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub collection_id: Option<i64>,
    #[serde(rename = "unit_price__gt")]
    #[schema(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[serde(rename = "unit_price__lt")]
    #[schema(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
}

impl SearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// The trimmed search term, if any.
    pub fn term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InventoryFilter {
    Low,
    Ok,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub inventory: Option<InventoryFilter>,
    pub collection_id: Option<i64>,
    pub search: Option<String>,
}

impl AdminProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}
