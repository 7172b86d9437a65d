//! Page-number pagination.
//!
//! Page numbers are 1-based. A `page` parameter that is missing or not a
//! number selects the first page; a number outside `1..=num_pages` selects
//! the last page. An empty listing still has one (empty) page.

use serde::Serialize;

/// Splits a listing of known size into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

impl Paginator {
    /// Create a paginator. A page size of zero is treated as one.
    #[must_use]
    pub const fn new(per_page: u64) -> Self {
        Self {
            per_page: if per_page == 0 { 1 } else { per_page },
        }
    }

    /// Items per page.
    #[must_use]
    pub const fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of pages needed for `count` items (at least one).
    #[must_use]
    pub const fn num_pages(&self, count: u64) -> u64 {
        if count == 0 {
            1
        } else {
            count.div_ceil(self.per_page)
        }
    }

    /// Resolve a raw `page` query value against a listing of `count` items.
    #[must_use]
    pub fn resolve(&self, raw: Option<&str>, count: u64) -> u64 {
        let num_pages = self.num_pages(count);
        match raw.and_then(parse_page_number) {
            None => 1,
            Some(n) if n < 1 || n > num_pages as i64 => num_pages,
            Some(n) => n as u64,
        }
    }

    /// Offset of the first item on page `number`.
    #[must_use]
    pub const fn offset(&self, number: u64) -> u64 {
        number.saturating_sub(1) * self.per_page
    }
}

fn parse_page_number(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    // "2.0" is accepted, "2.5" is not
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based number of this page.
    pub number: u64,
    /// Configured page size.
    pub per_page: u64,
    /// Total number of items across all pages.
    pub count: u64,
    /// Total number of pages.
    pub num_pages: u64,
}

impl<T> Page<T> {
    /// Build a page from already fetched items.
    #[must_use]
    pub const fn new(items: Vec<T>, number: u64, paginator: Paginator, count: u64) -> Self {
        Self {
            items,
            number,
            per_page: paginator.per_page(),
            count,
            num_pages: paginator.num_pages(count),
        }
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    #[must_use]
    pub const fn next_page_number(&self) -> Option<u64> {
        if self.has_next() {
            Some(self.number + 1)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn previous_page_number(&self) -> Option<u64> {
        if self.has_previous() {
            Some(self.number - 1)
        } else {
            None
        }
    }

    /// Transform the items, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            per_page: self.per_page,
            count: self.count,
            num_pages: self.num_pages,
        }
    }
}
