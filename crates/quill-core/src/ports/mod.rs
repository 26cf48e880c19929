//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod cache;
mod media;
mod repository;
mod session;

pub use cache::{Cache, CacheError};
pub use media::{MediaError, MediaStore};
pub use repository::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostRepository,
    UserRepository,
};
pub use session::{SessionClaims, SessionError, SessionService};
