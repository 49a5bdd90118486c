//! Page-based pagination types for GraphQL
//!
//! Every list query returns `{ count, pagination, results }`. `pagination`
//! is null unless a previous or next page exists.
//!
//! Usage: Use the `define_page!` macro to create type-specific page objects.

use async_graphql::SimpleObject;

use crate::services::PageLinks;
use crate::services::paginator;

/// Arguments needed to fetch a neighbouring page
#[derive(SimpleObject, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub page: u64,
    /// Rows on that page
    pub take: u64,
}

impl From<paginator::PageLink> for PageLink {
    fn from(link: paginator::PageLink) -> Self {
        Self {
            page: link.page,
            take: link.take,
        }
    }
}

#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub prev: Option<PageLink>,
    pub next: Option<PageLink>,
}

impl From<PageLinks> for Pagination {
    fn from(links: PageLinks) -> Self {
        Self {
            prev: links.previous.map(PageLink::from),
            next: links.next.map(PageLink::from),
        }
    }
}

/// Macro to define a GraphQL page type for a specific entity
///
/// Usage:
/// ```ignore
/// define_page!(PostPage, Post);
/// ```
#[macro_export]
macro_rules! define_page {
    ($page_name:ident, $node_type:ty) => {
        /// One page of results
        #[derive(async_graphql::SimpleObject, Debug, Clone)]
        pub struct $page_name {
            /// Number of matching rows across all pages
            pub count: u64,
            pub pagination: Option<$crate::graphql::pagination::Pagination>,
            pub results: Vec<$node_type>,
        }

        impl $page_name {
            /// Create from a service page, converting each record
            pub fn from_page<R>(page: $crate::services::Page<R>) -> Self
            where
                R: Into<$node_type>,
            {
                Self {
                    count: page.count,
                    pagination: page.pagination.map(Into::into),
                    results: page.results.into_iter().map(Into::into).collect(),
                }
            }
        }
    };
}
