use crate::source::ListQuery;

/// Search and paging parameters governing one page's list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    raw_input: String,
    debounced_query: String,
    page: u32,
    page_size: u32,
}

impl QueryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            raw_input: String::new(),
            debounced_query: String::new(),
            page: 1,
            page_size,
        }
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn debounced_query(&self) -> &str {
        &self.debounced_query
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Records a keystroke. Any edit of the raw input returns to page 1.
    pub fn set_raw_input(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        if raw != self.raw_input {
            self.raw_input = raw;
            self.page = 1;
        }
    }

    /// Adopts a settled search value. Returns whether the effective query
    /// changed, i.e. whether a reload is due.
    pub fn settle(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        if query == self.debounced_query {
            return false;
        }
        self.debounced_query = query;
        self.page = 1;
        true
    }

    pub fn set_page(&mut self, page: u32) -> bool {
        let changed = page != self.page;
        self.page = page;
        changed
    }

    /// Returns to page 1. Reports a change if either the size or the page
    /// moved.
    pub fn set_page_size(&mut self, page_size: u32) -> bool {
        let changed = page_size != self.page_size || self.page != 1;
        self.page_size = page_size;
        self.page = 1;
        changed
    }

    /// Puts page and size back to what the rows on screen were fetched with,
    /// after a load for a different page failed.
    pub fn restore_paging(&mut self, page: u32, page_size: u32) {
        self.page = page;
        self.page_size = page_size;
    }

    pub fn list_query(&self) -> ListQuery {
        ListQuery::new(self.page, self.page_size, self.debounced_query.clone())
    }
}
