use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;

pub const MAX_LIMIT: u64 = 100;

/// Largest offset the database driver can bind.
pub const MAX_SKIP: u64 = i64::MAX as u64;

/// Offset pagination, normalized to a limit within `1..=MAX_LIMIT` and an
/// offset no larger than `MAX_SKIP`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u64,
}

impl Pagination {
    pub fn new(skip: Option<u64>, limit: Option<u64>, default_limit: u64) -> Self {
        Self {
            skip: skip.unwrap_or(0).min(MAX_SKIP),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_LIMIT),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn pagination(&self, default_limit: u64) -> Pagination {
        Pagination::new(self.skip, self.limit, default_limit)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PublicProductQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    /// Case-insensitive substring of the category.
    pub category: Option<String>,
    #[param(value_type = Option<String>)]
    pub price_min: Option<Decimal>,
    #[param(value_type = Option<String>)]
    pub price_max: Option<Decimal>,
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
}

impl PublicProductQuery {
    pub const DEFAULT_LIMIT: u64 = 20;

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.skip, self.limit, Self::DEFAULT_LIMIT)
    }
}
