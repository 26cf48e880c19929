//! Listing pagination.
//!
//! Pages are 1-indexed. Out-of-range requests clamp to the nearest valid
//! page instead of erroring, and an empty collection still has exactly one
//! (empty) page, so every listing route can always render.

use serde::Serialize;

/// Default number of posts on a listing page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// One fixed-size window over an ordered collection.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Resolved (clamped) 1-indexed page number.
    pub page: u64,
    /// Total number of pages, always at least 1.
    pub pages: u64,
    /// Total number of items across all pages.
    pub total: u64,
    pub per_page: u64,
}

impl<T> Paginated<T> {
    pub fn empty(per_page: u64) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            pages: 1,
            total: 0,
            per_page,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    /// Map the items while keeping the window bookkeeping.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            pages: self.pages,
            total: self.total,
            per_page: self.per_page,
        }
    }
}

/// Number of pages needed for `total` items, never less than 1.
pub fn page_count(total: u64, per_page: u64) -> u64 {
    if total == 0 {
        1
    } else {
        total.div_ceil(per_page)
    }
}

/// Parse a raw `?page=` query value. Absent or malformed values resolve to
/// page 1; range clamping happens against the actual page count.
pub fn requested_page(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse::<u64>().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1)
}

/// Clamp a requested page into `[1, pages]`.
pub fn clamp_page(requested: u64, pages: u64) -> u64 {
    requested.clamp(1, pages.max(1))
}

/// Zero-based item offset of a resolved page.
pub fn offset(page: u64, per_page: u64) -> u64 {
    (page - 1) * per_page
}

/// Paginate an already-ordered in-memory collection.
pub fn paginate_vec<T>(items: Vec<T>, requested: u64, per_page: u64) -> Paginated<T> {
    let total = items.len() as u64;
    let pages = page_count(total, per_page);
    let page = clamp_page(requested, pages);
    let start = offset(page, per_page) as usize;
    let window: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();
    Paginated {
        items: window,
        page,
        pages,
        total,
        per_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_holds_min_of_total_and_size() {
        let page = paginate_vec((0..13).collect(), 1, 10);
        assert_eq!(page.items, (0..10).collect::<Vec<_>>());
        assert_eq!(page.pages, 2);
        assert_eq!(page.total, 13);

        let short = paginate_vec((0..4).collect(), 1, 10);
        assert_eq!(short.items.len(), 4);
        assert_eq!(short.pages, 1);
    }

    #[test]
    fn last_page_holds_remainder() {
        let page = paginate_vec((0..13).collect(), 2, 10);
        assert_eq!(page.items, (10..13).collect::<Vec<_>>());

        // Exact multiple: the last page is full.
        let full = paginate_vec((0..20).collect(), 2, 10);
        assert_eq!(full.items.len(), 10);
        assert_eq!(full.pages, 2);
    }

    #[test]
    fn beyond_last_clamps_to_last() {
        let page = paginate_vec((0..13).collect(), 99, 10);
        assert_eq!(page.page, 2);
        assert_eq!(page.items, (10..13).collect::<Vec<_>>());
    }

    #[test]
    fn malformed_page_param_resolves_to_first() {
        assert_eq!(requested_page(None), 1);
        assert_eq!(requested_page(Some("abc")), 1);
        assert_eq!(requested_page(Some("0")), 1);
        assert_eq!(requested_page(Some("3")), 3);
    }

    #[test]
    fn empty_collection_has_one_empty_page() {
        let page: Paginated<i32> = paginate_vec(Vec::new(), 5, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }
}
