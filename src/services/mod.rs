//! Services layer - Business logic
//!
//! Services sit between the web handlers and the repositories. They:
//! - Apply the visibility and ownership rules
//! - Check what the form layer cannot (existence, uniqueness)
//! - Report failures as typed errors the handlers can map to responses

pub mod access;
pub mod category;
pub mod comment;
pub mod location;
pub mod password;
pub mod post;
pub mod user;

pub use access::{can_modify, can_view_post};
pub use category::{CategoryService, CategoryServiceError};
pub use comment::{CommentService, CommentServiceError};
pub use location::{LocationService, LocationServiceError};
pub use password::{hash_password, verify_password};
pub use post::{PostService, PostServiceError};
pub use user::{UserService, UserServiceError};
