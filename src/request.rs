use serde::Deserialize;

use crate::core::models::common::Pagination as CorePagination;

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    20
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

impl From<Pagination> for CorePagination {
    fn from(p: Pagination) -> Self {
        CorePagination::new(p.page, p.size)
    }
}
