//! Data models
//!
//! Plain value types shared by the repositories, services and templates:
//! - Database entities (User, Session, Category, Location, Post, Comment)
//! - Input types produced by the form layer
//! - Pagination helpers

mod category;
mod comment;
mod location;
mod pagination;
mod post;
mod session;
mod user;

pub use category::{Category, CategoryInput, CategoryRef};
pub use comment::Comment;
pub use location::{Location, LocationInput, LocationRef};
pub use pagination::{num_pages, resolve_page, ListParams, PageInfo, PagedResult, PAGINATION};
pub use post::{Post, PostInput};
pub use session::Session;
pub use user::{CreateUserInput, UpdateUserInput, User, UserRef};
