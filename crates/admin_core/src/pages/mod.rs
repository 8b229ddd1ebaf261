pub mod categories;
pub mod users;

pub use categories::CategoriesPage;
pub use users::UsersPage;
