use async_trait::async_trait;

use crate::domain::{Comment, Follow, Group, NewComment, NewPost, Post, PostChanges, User};
use crate::error::RepoError;
use crate::pagination::Paginated;

/// Generic repository trait defining the operations every entity shares.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository. Users are mirrored from the identity provider, so
/// creation here is a mirror insert, not a registration flow.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Batch lookup used when hydrating post listings with author names.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, RepoError>;

    /// Every user, for the author directory page.
    async fn list(&self) -> Result<Vec<User>, RepoError>;

    /// Authors that have published at least one post; everyone else stays
    /// out of navigation menus.
    async fn with_posts(&self) -> Result<Vec<User>, RepoError>;

    async fn create(&self, username: &str, full_name: &str) -> Result<User, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Group>, RepoError>;

    /// Every group, for the group directory page.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;

    /// Groups that contain at least one post; empty groups stay out of
    /// navigation menus.
    async fn with_posts(&self) -> Result<Vec<Group>, RepoError>;

    async fn create(&self, title: &str, slug: &str, description: &str)
    -> Result<Group, RepoError>;
}

/// Post repository. Every page query orders newest-first by publication
/// date, ties broken by id descending, so pagination is a stable total
/// order.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    /// Insert a post; the publication timestamp is stamped by the
    /// implementation from the system clock, never taken from input.
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError>;

    /// Apply the mutable subset of fields to an existing post.
    async fn update(&self, id: i64, changes: PostChanges) -> Result<Post, RepoError>;

    async fn page_all(&self, page: u64, per_page: u64) -> Result<Paginated<Post>, RepoError>;

    async fn page_by_group(
        &self,
        group_id: i64,
        page: u64,
        per_page: u64,
    ) -> Result<Paginated<Post>, RepoError>;

    async fn page_by_author(
        &self,
        author_id: i64,
        page: u64,
        per_page: u64,
    ) -> Result<Paginated<Post>, RepoError>;

    /// Posts by any of the given authors - the follow feed. An empty
    /// author set yields an empty page.
    async fn page_by_authors(
        &self,
        author_ids: &[i64],
        page: u64,
        per_page: u64,
    ) -> Result<Paginated<Post>, RepoError>;

    /// Newest posts that carry an image, at most `limit`, scanning in the
    /// same newest-first order (promotional strip on the home page).
    async fn recent_with_images(&self, limit: u64) -> Result<Vec<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i64> {
    async fn create(&self, new_comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments of a post, newest first.
    async fn for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;
}

/// Follow repository. Duplicate edges must be swallowed here as the
/// safety net beneath the handler's own existence pre-check.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError>;

    /// Create the edge. A unique-constraint violation is translated to
    /// `Ok(())` so a concurrent duplicate never surfaces as an error.
    async fn create(&self, user_id: i64, author_id: i64) -> Result<(), RepoError>;

    /// Delete the edge if present; deleting a missing edge is a no-op.
    async fn delete(&self, user_id: i64, author_id: i64) -> Result<(), RepoError>;

    /// Ids of the authors `user_id` follows.
    async fn following_ids(&self, user_id: i64) -> Result<Vec<i64>, RepoError>;

    async fn list_for(&self, user_id: i64) -> Result<Vec<Follow>, RepoError>;
}
