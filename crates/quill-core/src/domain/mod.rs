//! Domain entities - the core business objects.

mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::{Comment, NewComment};
pub use follow::Follow;
pub use group::Group;
pub use post::{NewPost, Post, PostChanges};
pub use user::User;
