#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    page: i64,
    size: i64,
}

impl Pagination {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: page.max(1),
            size: size.clamp(1, 100),
        }
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }
}
