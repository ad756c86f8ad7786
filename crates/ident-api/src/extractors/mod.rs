//! Request extractors

mod auth;
mod pagination;
mod validated;

pub use auth::CurrentUser;
pub use pagination::{PageParams, Pagination};
pub use validated::ValidatedJson;
