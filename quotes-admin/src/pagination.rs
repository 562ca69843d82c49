//! Fixed-size paging for admin index pages

/// Rows per index page
pub const PAGE_SIZE: i64 = 30;

/// One page of an index listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page actually served
    pub page: i64,
    pub total_pages: i64,
    /// Row offset for `LIMIT PAGE_SIZE OFFSET offset`
    pub offset: i64,
}

impl Pagination {
    /// Page `requested` of `total_count` rows. Out-of-range requests land on
    /// the nearest existing page; an empty listing is page 1 of 0.
    ///
    /// ```
    /// use quotes_admin::pagination::Pagination;
    ///
    /// let p = Pagination::new(75, 2);
    /// assert_eq!((p.page, p.total_pages, p.offset), (2, 3, 30));
    ///
    /// let p = Pagination::new(75, 99);
    /// assert_eq!((p.page, p.offset), (3, 60));
    /// ```
    pub fn new(total_count: i64, requested: i64) -> Self {
        let total_pages = (total_count + PAGE_SIZE - 1) / PAGE_SIZE;
        let page = requested.clamp(1, total_pages.max(1));

        Self {
            page,
            total_pages,
            offset: (page - 1) * PAGE_SIZE,
        }
    }

    pub fn limit(&self) -> i64 {
        PAGE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_last_page() {
        let p = Pagination::new(31, 2);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 30);
    }

    #[test]
    fn test_exact_multiple() {
        let p = Pagination::new(60, 3);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 2);
    }

    #[test]
    fn test_below_first_page() {
        let p = Pagination::new(45, -3);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(
            Pagination::new(0, 4),
            Pagination {
                page: 1,
                total_pages: 0,
                offset: 0
            }
        );
    }
}
