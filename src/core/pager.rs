//! Pagination, sorting and hit-count state for listing operations

use serde::Serialize;

use crate::core::params::QueryMap;

/// Pagination carrier threaded through every listing call
///
/// A fresh `Pager` is built per request. The search and link ports write the
/// total number of matches into [`Pager::count`]; it is never an input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pager {
    /// Requested page. Pages 0 and 1 both address the first page.
    pub page: u64,

    /// Field to sort by; the backend picks its own order when unset
    #[serde(rename = "sortby", skip_serializing_if = "Option::is_none")]
    pub sortby: Option<String>,

    /// Sort direction, descending unless the caller passes `desc=false`
    pub desc: bool,

    /// Page size
    pub limit: usize,

    /// Total hits, populated by the executing operation
    pub count: u64,
}

impl Pager {
    /// A first-page pager with the given size
    pub fn new(limit: usize) -> Self {
        Self {
            page: 0,
            sortby: None,
            desc: true,
            limit: limit.max(1),
            count: 0,
        }
    }

    /// Build a pager from the `page`, `sort`, `desc` and `limit` parameters
    ///
    /// Unparsable numbers fall back to their defaults. `limit` is kept within
    /// `1..=max_limit`.
    pub fn from_params(params: &QueryMap, default_limit: usize, max_limit: usize) -> Self {
        let page = params.parse_or("page", 0u64);
        let sortby = params.non_blank("sort").map(str::to_string);
        let desc = params.flag("desc").unwrap_or(true);
        let limit = params
            .parse_or("limit", default_limit)
            .clamp(1, max_limit.max(1));

        Self {
            page,
            sortby,
            desc,
            limit,
            count: 0,
        }
    }

    /// Number of items to skip for the requested page
    pub fn offset(&self) -> usize {
        let index = self.page.saturating_sub(1) as usize;
        index.saturating_mul(self.limit)
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(30)
    }
}
