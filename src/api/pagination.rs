use serde::Deserialize;

use crate::config::LimitsConfig;
use crate::database::Range;

/// `?page=&per_page=`, 1-based pages
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl Pagination {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// `per_page` is clamped to `1..=max_per_page`
    pub fn per_page(&self, limits: &LimitsConfig) -> u32 {
        self.per_page
            .unwrap_or(limits.default_per_page)
            .clamp(1, limits.max_per_page.max(1))
    }

    pub fn to_range(&self, limits: &LimitsConfig) -> Range {
        let per_page = self.per_page(limits) as i64;
        let from = (self.page() as i64 - 1) * per_page;
        Range::new(from, from + per_page - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn defaults_to_first_page() {
        let limits = AppConfig::development().limits;
        assert_eq!(Pagination::default().to_range(&limits), Range::new(0, 19));
    }

    #[test]
    fn clamps_page_and_size() {
        let limits = AppConfig::development().limits;
        let p = Pagination { page: Some(3), per_page: Some(10_000) };
        assert_eq!(p.to_range(&limits), Range::new(200, 299));

        let p = Pagination { page: Some(0), per_page: Some(0) };
        assert_eq!(p.to_range(&limits), Range::new(0, 0));
    }
}
