//! Headless controllers for the back-office admin pages: user management and
//! the category browser. Front ends feed operator input in and draw the row
//! projections that come out.

pub mod config;
pub mod debounce;
pub mod error;
pub mod form;
pub mod http;
pub mod interaction;
pub mod loader;
pub mod pages;
pub mod pagination;
pub mod query;
pub mod source;
pub mod tree;
pub mod view;

pub use config::{load_settings, Settings};
pub use error::{AdminError, ErrorKind};
pub use http::{CredentialProvider, HttpAdminApi, NoCredentials, StaticToken};
pub use pages::{CategoriesPage, UsersPage};
pub use source::{CategoryCatalog, ListQuery, PageResult, RecordSource, UserDirectory};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
