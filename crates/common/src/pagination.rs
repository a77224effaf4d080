//! Page-number pagination.
//!
//! Clients pass `page` (1-based) and `limit` (page size) query parameters.
//! `limit` is clamped to the configured maximum; an unusable `limit` falls
//! back to the default page size. A page past the end is a not-found error,
//! except that page 1 of an empty list is always valid.

use url::Url;

use crate::{AppError, AppResult, PaginationConfig};

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    /// Items per page.
    pub page_size: u64,
}

impl PageRequest {
    /// Build a page request from raw query values.
    pub fn from_query(
        page: Option<&str>,
        limit: Option<&str>,
        config: &PaginationConfig,
    ) -> AppResult<Self> {
        let page = match page.map(str::trim).filter(|p| !p.is_empty()) {
            None => 1,
            Some(raw) => match raw.parse::<u64>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(invalid_page()),
            },
        };

        let page_size = limit
            .and_then(|l| l.trim().parse::<u64>().ok())
            .filter(|&l| l >= 1)
            .map_or(config.page_size, |l| l.min(config.max_page_size));

        Ok(Self { page, page_size })
    }

    /// Zero-based page index, as sea-orm's paginator expects.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.page - 1
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.index().saturating_mul(self.page_size)
    }

    /// Total number of pages for `count` items (at least one).
    #[must_use]
    pub const fn num_pages(&self, count: u64) -> u64 {
        if count == 0 {
            1
        } else {
            count.div_ceil(self.page_size)
        }
    }

    /// Fail when the requested page lies beyond the last page.
    pub fn ensure_in_range(&self, count: u64) -> AppResult<()> {
        if self.page > self.num_pages(count) {
            return Err(invalid_page());
        }
        Ok(())
    }

    /// Whether a following page exists.
    #[must_use]
    pub const fn has_next(&self, count: u64) -> bool {
        self.page < self.num_pages(count)
    }

    /// Whether a preceding page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Link to the next page, derived from the current request URL.
    #[must_use]
    pub fn next_link(&self, current: &Url, count: u64) -> Option<String> {
        self.has_next(count)
            .then(|| page_link(current, self.page + 1))
    }

    /// Link to the previous page, derived from the current request URL.
    #[must_use]
    pub fn previous_link(&self, current: &Url) -> Option<String> {
        self.has_previous()
            .then(|| page_link(current, self.page - 1))
    }
}

fn invalid_page() -> AppError {
    AppError::NotFound("Invalid page".to_string())
}

/// Rewrite the `page` parameter of `current`, keeping every other parameter.
/// Page 1 drops the parameter entirely.
fn page_link(current: &Url, page: u64) -> String {
    let kept: Vec<(String, String)> = current
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = current.clone();
    url.set_query(None);
    if !kept.is_empty() || page > 1 {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        if page > 1 {
            pairs.append_pair("page", &page.to_string());
        }
    }
    url.to_string()
}
