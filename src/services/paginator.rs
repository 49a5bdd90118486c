//! Page window calculation for list queries
//!
//! Pages are 1-based. The page size is capped at [`MAX_PAGE_SIZE`] whenever
//! the caller asks for a specific page; without a page the raw `take` is used
//! as a plain query limit and no links are produced.

use serde::Serialize;

use crate::error::{ApiError, ApiResult};

/// Upper bound for a single page
pub const MAX_PAGE_SIZE: u64 = 100;

/// Largest offset SQLite accepts as an integer
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Link to a neighbouring page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub page: u64,
    pub take: u64,
}

/// The slice of a result set a list query should fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationWindow {
    /// Row limit for the query, `None` means unlimited
    pub page_size: Option<u64>,
    pub offset: u64,
    pub total_count: u64,
    pub previous: Option<PageLink>,
    pub next: Option<PageLink>,
}

impl PaginationWindow {
    pub fn has_links(&self) -> bool {
        self.previous.is_some() || self.next.is_some()
    }
}

/// Compute the window for `page`/`take` over `total_count` matching rows.
///
/// Non-positive `page` or `take` values are rejected rather than clamped.
pub fn compute_window(
    total_count: u64,
    page: Option<i64>,
    take: Option<i64>,
) -> ApiResult<PaginationWindow> {
    let page = page.map(|p| positive("page", p)).transpose()?;
    let take = take.map(|t| positive("take", t)).transpose()?;

    let (page, take) = match (page, take) {
        (Some(page), Some(take)) => (page, take),
        (_, take) => {
            return Ok(PaginationWindow {
                page_size: take,
                offset: 0,
                total_count,
                previous: None,
                next: None,
            });
        }
    };

    let page_size = take.min(MAX_PAGE_SIZE);
    let offset = (page - 1).saturating_mul(page_size).min(MAX_OFFSET);
    let end = offset.saturating_add(page_size);

    let previous = (offset > 0).then(|| PageLink {
        page: page - 1,
        take: page_size.min(total_count),
    });

    let next = (end < total_count).then(|| PageLink {
        page: page + 1,
        take: page_size.min(total_count - end),
    });

    Ok(PaginationWindow {
        page_size: Some(page_size),
        offset,
        total_count,
        previous,
        next,
    })
}

fn positive(name: &str, value: i64) -> ApiResult<u64> {
    if value < 1 {
        return Err(ApiError::validation(format!("{name} must be at least 1")));
    }
    Ok(value as u64)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn second_page_of_twenty_five() {
        let window = compute_window(25, Some(2), Some(10)).unwrap();

        assert_eq!(
            window,
            PaginationWindow {
                page_size: Some(10),
                offset: 10,
                total_count: 25,
                previous: Some(PageLink { page: 1, take: 10 }),
                next: Some(PageLink { page: 3, take: 5 }),
            }
        );
    }

    #[test]
    fn missing_page_or_take_disables_links() {
        let window = compute_window(500, None, Some(250)).unwrap();
        assert_eq!(window.page_size, Some(250));
        assert_eq!(window.offset, 0);
        assert!(!window.has_links());

        let window = compute_window(500, Some(3), None).unwrap();
        assert_eq!(window.page_size, None);
        assert_eq!(window.offset, 0);
        assert!(!window.has_links());
    }

    #[test]
    fn take_is_capped() {
        let window = compute_window(1_000, Some(2), Some(500)).unwrap();
        assert_eq!(window.page_size, Some(100));
        assert_eq!(window.offset, 100);
        assert_eq!(window.next, Some(PageLink { page: 3, take: 100 }));
        assert_eq!(window.previous, Some(PageLink { page: 1, take: 100 }));
    }

    #[test]
    fn first_and_last_pages() {
        let first = compute_window(5, Some(1), Some(10)).unwrap();
        assert_eq!(first.previous, None);
        assert_eq!(first.next, None);

        let last = compute_window(30, Some(3), Some(10)).unwrap();
        assert_eq!(last.previous, Some(PageLink { page: 2, take: 10 }));
        assert_eq!(last.next, None);

        // Past the end still links back, sized to what exists
        let beyond = compute_window(3, Some(4), Some(10)).unwrap();
        assert_eq!(beyond.previous, Some(PageLink { page: 3, take: 3 }));
        assert_eq!(beyond.next, None);
    }

    #[test]
    fn huge_page_stays_within_sqlite_range() {
        let window = compute_window(25, Some(i64::MAX), Some(10)).unwrap();

        assert_eq!(window.offset, i64::MAX as u64);
        assert_eq!(window.next, None);
        assert_eq!(
            window.previous,
            Some(PageLink {
                page: i64::MAX as u64 - 1,
                take: 10
            })
        );
    }

    #[test]
    fn rejects_non_positive_input() {
        assert_matches!(
            compute_window(10, Some(0), Some(10)),
            Err(ApiError::ValidationFailed(_))
        );
        assert_matches!(
            compute_window(10, Some(1), Some(-5)),
            Err(ApiError::ValidationFailed(_))
        );
        assert_matches!(
            compute_window(10, None, Some(0)),
            Err(ApiError::ValidationFailed(_))
        );
    }

    #[test]
    fn link_invariants_hold_across_inputs() {
        for total in [0u64, 1, 7, 10, 99, 100, 101, 250] {
            for page in 1..=6i64 {
                for take in [1i64, 3, 10, 100, 150] {
                    let w = compute_window(total, Some(page), Some(take)).unwrap();
                    let size = w.page_size.unwrap();

                    assert_eq!(size, (take as u64).min(MAX_PAGE_SIZE));
                    assert_eq!(w.offset, (page as u64 - 1) * size);
                    assert_eq!(w.next.is_some(), w.offset + size < total);
                    assert_eq!(w.previous.is_some(), w.offset > 0);
                    assert!(w.next.is_none_or(|l| l.take <= size));
                    assert!(w.previous.is_none_or(|l| l.take <= size));
                }
            }
        }
    }
}
