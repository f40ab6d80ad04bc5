use std::collections::BTreeMap;

use crate::models::Sort;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Derived-state presets for the employee list.
///
/// These cannot be expressed as remote equality filters because they depend
/// on FTE computed from allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuickFilter {
    #[default]
    All,
    /// No committed FTE.
    Bench,
    /// `0 < current <= max`.
    Allocated,
    /// `current > max`.
    OverAllocated,
}

impl QuickFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Bench => "bench",
            Self::Allocated => "allocated",
            Self::OverAllocated => "overallocated",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "" => Some(Self::All),
            "bench" => Some(Self::Bench),
            "allocated" => Some(Self::Allocated),
            "overallocated" | "over-allocated" | "over_allocated" => Some(Self::OverAllocated),
            _ => None,
        }
    }
}

/// Search, filter, sort and pagination state for one list view.
///
/// Pages are 0-based. Any change that alters the result set (search, filters,
/// quick filter, sort, page size) resets to the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    search: String,
    field_filters: BTreeMap<String, String>,
    quick_filter: QuickFilter,
    sort: Option<Sort>,
    page: u32,
    page_size: u32,
    /// Total matching rows from the last resolution, used for clamping.
    total_count: u64,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            search: String::new(),
            field_filters: BTreeMap::new(),
            quick_filter: QuickFilter::All,
            sort: None,
            page: 0,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn field_filters(&self) -> &BTreeMap<String, String> {
        &self.field_filters
    }

    pub fn quick_filter(&self) -> QuickFilter {
        self.quick_filter
    }

    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 0;
    }

    /// Sets an equality filter. An empty value removes it ("any").
    pub fn set_filter(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        if value.is_empty() {
            self.field_filters.remove(&field);
        } else {
            self.field_filters.insert(field, value);
        }
        self.page = 0;
    }

    pub fn clear_filters(&mut self) {
        self.field_filters.clear();
        self.search.clear();
        self.quick_filter = QuickFilter::All;
        self.page = 0;
    }

    pub fn set_quick_filter(&mut self, quick_filter: QuickFilter) {
        self.quick_filter = quick_filter;
        self.page = 0;
    }

    pub fn set_sort(&mut self, sort: Option<Sort>) {
        self.sort = sort;
        self.page = 0;
    }

    /// Changes the page size and always returns to the first page.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.page = 0;
    }

    /// Records the total from the latest result and clamps the current page.
    pub fn set_total_count(&mut self, total_count: u64) {
        self.total_count = total_count;
        self.page = self.page.min(self.last_page());
    }

    /// `ceil(total / page_size)`; 0 for an empty result.
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.page_size)
    }

    fn last_page(&self) -> u32 {
        self.total_pages().saturating_sub(1)
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.last_page()
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 0
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1));
    }

    pub fn go_to_first_page(&mut self) {
        self.page = 0;
    }

    pub fn go_to_last_page(&mut self) {
        self.page = self.last_page();
    }

    /// Jumps to `page`, clamped to `[0, total_pages - 1]`.
    pub fn go_to_page(&mut self, page: u32) {
        self.page = page.min(self.last_page());
    }

    /// Restores a page index without clamping, e.g. from a bookmarked view.
    /// The next [`QueryState::set_total_count`] clamps it.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Offset of the first row on the current page.
    pub fn offset(&self) -> usize {
        self.page as usize * self.page_size as usize
    }
}

/// `ceil(total / page_size)`; 0 when there is nothing to show.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size)).min(u64::from(u32::MAX)) as u32
}
