//! Read-only projections handed to whatever draws the pages.

use shared::{domain::UserId, protocol::UserRecord};

use crate::pagination::PaginationController;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: &'static str,
    pub usage: String,
    pub joined: Option<String>,
}

impl From<&UserRecord> for UserRow {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.display_name(),
            email: record.email.clone(),
            role: record.role.as_str(),
            usage: format!("{} / {}", record.words_used, record.total_words),
            joined: record
                .created_at
                .map(|created| created.format("%Y-%m-%d").to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersView {
    pub rows: Vec<UserRow>,
    /// Loading state when the view was built. A front end that redraws
    /// during a load reads [`LoadingHandle`](crate::loader::LoadingHandle)
    /// instead.
    pub loading: bool,
    pub pagination: PaginationController,
    pub show_pagination: bool,
}

impl UsersView {
    /// No rows is an empty state, not an error.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && !self.loading
    }
}
