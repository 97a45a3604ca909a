//! Pagination utilities for service layer
//!
//! Raw query values are parsed leniently: anything that is not a positive
//! integer falls back to the defaults.

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 6;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub page_size: u64,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64) -> Self {
        let page = if page > 0 { page as u64 } else { DEFAULT_PAGE };
        let page_size = if page_size > 0 { (page_size as u64).min(MAX_PAGE_SIZE) } else { DEFAULT_PAGE_SIZE };
        Self { page, page_size }
    }

    /// Build from untyped query-string values.
    pub fn from_raw(page: Option<&str>, page_size: Option<&str>) -> Self {
        Self::new(parse_or_zero(page), parse_or_zero(page_size))
    }

    pub fn limit(&self) -> u64 { self.page_size }

    /// Capped at `i64::MAX` so it always binds as a valid SQL OFFSET.
    pub fn offset(&self) -> u64 { (self.page - 1).saturating_mul(self.page_size).min(i64::MAX as u64) }
}

fn parse_or_zero(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0)
}

impl Default for Pagination {
    fn default() -> Self { Self { page: DEFAULT_PAGE, page_size: DEFAULT_PAGE_SIZE } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_values_fall_back_to_defaults() {
        let p = Pagination::new(0, -3);
        assert_eq!(p, Pagination::default());
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 6);
    }

    #[test]
    fn non_numeric_values_fall_back_to_defaults() {
        let p = Pagination::from_raw(Some("abc"), Some(""));
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 6);
        assert_eq!(Pagination::from_raw(None, None), Pagination::default());
    }

    #[test]
    fn offset_is_page_minus_one_times_size() {
        let p = Pagination::from_raw(Some("3"), Some("10"));
        assert_eq!(p.offset(), 20);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn page_size_is_clamped() {
        let p = Pagination::new(2, 1000);
        assert_eq!(p.limit(), MAX_PAGE_SIZE);
        assert_eq!(p.offset(), MAX_PAGE_SIZE);
    }

    #[test]
    fn huge_page_offset_stays_in_sql_range() {
        let p = Pagination::from_raw(Some("100000000000000000"), Some("100"));
        assert_eq!(p.page, 100_000_000_000_000_000);
        assert_eq!(p.offset(), i64::MAX as u64);
        assert_eq!(Pagination::new(i64::MAX, 100).offset(), i64::MAX as u64);
    }
}
