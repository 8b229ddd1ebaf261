use crate::source::PageResult;

/// Page navigation state of the users table.
///
/// Bounds are not checked locally; an out-of-range page is sent as-is and the
/// server's answer is adopted through [`sync`](Self::sync).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationController {
    current_page: u32,
    total_pages: u32,
    total_items: u64,
    items_per_page: u32,
}

impl PaginationController {
    pub fn new(items_per_page: u32) -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            total_items: 0,
            items_per_page,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    pub fn set_page(&mut self, page: u32) {
        self.current_page = page;
    }

    /// "Page 1" means something else under a new page size, so this always
    /// returns to it.
    pub fn set_items_per_page(&mut self, items_per_page: u32) {
        self.items_per_page = items_per_page;
        self.current_page = 1;
    }

    pub fn sync<T>(&mut self, result: &PageResult<T>) {
        self.current_page = result.page;
        self.total_pages = result.total_pages;
        self.total_items = result.total_items;
        if result.page_size > 0 {
            self.items_per_page = result.page_size;
        }
    }

    pub fn is_visible(&self, loading: bool) -> bool {
        self.total_pages > 1 && !loading
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// e.g. `11-20 of 42`, or `0 of 0` for an empty result.
    pub fn range_label(&self) -> String {
        if self.total_items == 0 || self.items_per_page == 0 {
            return format!("0 of {}", self.total_items);
        }
        let per_page = u64::from(self.items_per_page);
        let first = u64::from(self.current_page.saturating_sub(1)) * per_page + 1;
        if first > self.total_items {
            return format!("0 of {}", self.total_items);
        }
        let last = (first + per_page - 1).min(self.total_items);
        format!("{first}-{last} of {}", self.total_items)
    }
}
