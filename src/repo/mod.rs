//! Record Repositories
//! Mission: Typed CRUD views over the document store

pub mod posts;
pub mod users;

pub use posts::{PostQuery, PostsRepo, SortOrder};
pub use users::UsersRepo;
