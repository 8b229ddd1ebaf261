use async_trait::async_trait;
use shared::{
    domain::{CategoryId, UserId},
    protocol::{
        CategoryRecord, CreateCategoryRequest, CreateUserRequest, ListResponse,
        UpdateCategoryRequest, UpdateUserRequest, UserRecord,
    },
};
use tracing::warn;

use crate::error::AdminError;

/// Parameters of one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: String,
}

impl ListQuery {
    pub fn new(page: u32, page_size: u32, search: impl Into<String>) -> Self {
        Self {
            page,
            page_size,
            search: search.into(),
        }
    }

    /// Search text as sent on the wire; blank input means "no filter".
    pub fn search_term(&self) -> Option<&str> {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub page_size: u32,
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            total_pages: 0,
            total_items: 0,
            page_size: 0,
        }
    }
}

impl<T> PageResult<T> {
    /// Reconciles a list response against the query that produced it.
    ///
    /// Responses without pagination metadata are a single page holding every
    /// returned item. Items beyond `page_size` are dropped.
    pub fn from_response(response: ListResponse<T>, query: &ListQuery) -> Self {
        let ListResponse { mut data, pagination } = response;
        let mut result = match pagination {
            Some(meta) => Self {
                page: meta.current_page,
                total_pages: meta.total_pages,
                total_items: meta.total_items,
                page_size: meta.items_per_page,
                items: Vec::new(),
            },
            None => Self {
                page: query.page,
                total_pages: u32::from(!data.is_empty()),
                total_items: data.len() as u64,
                page_size: query.page_size,
                items: Vec::new(),
            },
        };
        if result.page_size == 0 {
            result.page_size = query.page_size;
        }
        let limit = result.page_size as usize;
        if limit > 0 && data.len() > limit {
            warn!(
                returned = data.len(),
                page_size = limit,
                "list response exceeded page size; truncating"
            );
            data.truncate(limit);
        }
        result.items = data;
        result
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Anything that can answer a paginated, searchable list request.
#[async_trait]
pub trait RecordSource: Send + Sync {
    type Record: Clone + Send + Sync + 'static;

    async fn list(&self, query: &ListQuery) -> Result<PageResult<Self::Record>, AdminError>;
}

#[async_trait]
pub trait UserDirectory: RecordSource<Record = UserRecord> {
    async fn create_user(&self, request: &CreateUserRequest) -> Result<UserRecord, AdminError>;
    async fn update_user(
        &self,
        id: UserId,
        patch: &UpdateUserRequest,
    ) -> Result<UserRecord, AdminError>;
    async fn delete_user(&self, id: UserId) -> Result<(), AdminError>;
}

#[async_trait]
pub trait CategoryCatalog: RecordSource<Record = CategoryRecord> {
    async fn create_category(
        &self,
        request: &CreateCategoryRequest,
    ) -> Result<CategoryRecord, AdminError>;
    async fn update_category(
        &self,
        id: CategoryId,
        patch: &UpdateCategoryRequest,
    ) -> Result<CategoryRecord, AdminError>;
    async fn delete_category(&self, id: CategoryId) -> Result<(), AdminError>;
}

#[cfg(test)]
mod tests {
    use shared::protocol::Pagination;

    use super::*;

    #[test]
    fn response_without_pagination_is_single_page() {
        let query = ListQuery::new(1, 25, "");
        let result = PageResult::from_response(
            ListResponse {
                data: vec![1, 2, 3],
                pagination: None,
            },
            &query,
        );
        assert_eq!(result.page, 1);
        assert_eq!(result.total_pages, 1);
        assert_eq!(result.total_items, 3);
        assert_eq!(result.page_size, 25);
    }

    #[test]
    fn empty_response_has_no_pages() {
        let query = ListQuery::new(1, 25, "nothing");
        let result = PageResult::<u8>::from_response(
            ListResponse {
                data: Vec::new(),
                pagination: None,
            },
            &query,
        );
        assert!(result.is_empty());
        assert_eq!(result.total_pages, 0);
    }

    #[test]
    fn oversized_response_is_truncated_to_page_size() {
        let query = ListQuery::new(2, 10, "");
        let result = PageResult::from_response(
            ListResponse {
                data: (0..12).collect::<Vec<u32>>(),
                pagination: Some(Pagination {
                    current_page: 2,
                    total_pages: 3,
                    total_items: 30,
                    items_per_page: 10,
                }),
            },
            &query,
        );
        assert_eq!(result.items.len(), 10);
        assert_eq!(result.total_pages, 3);
    }

    #[test]
    fn blank_search_is_omitted() {
        assert_eq!(ListQuery::new(1, 10, "   ").search_term(), None);
        assert_eq!(ListQuery::new(1, 10, " ada ").search_term(), Some("ada"));
    }
}
