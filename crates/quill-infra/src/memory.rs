//! In-memory repositories.
//!
//! One shared store backs all five repositories so cross-entity rules
//! (cascade on delete, group detachment) behave like the relational
//! schema. Used as the fallback when no database is configured and as the
//! repository double in handler tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use quill_core::domain::{Comment, Follow, Group, NewComment, NewPost, Post, PostChanges, User};
use quill_core::error::RepoError;
use quill_core::pagination::{self, Paginated};
use quill_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostRepository,
    UserRepository,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    follows: Vec<Follow>,
}

/// Shared in-memory store; cheap to clone, all handles see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            store: self.clone(),
        }
    }

    pub fn groups(&self) -> InMemoryGroupRepository {
        InMemoryGroupRepository {
            store: self.clone(),
        }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            store: self.clone(),
        }
    }

    pub fn comments(&self) -> InMemoryCommentRepository {
        InMemoryCommentRepository {
            store: self.clone(),
        }
    }

    pub fn follows(&self) -> InMemoryFollowRepository {
        InMemoryFollowRepository {
            store: self.clone(),
        }
    }
}

/// Newest-first by publication date, ties by id descending - the one
/// ordering every post listing uses.
fn sort_newest_first(posts: &mut Vec<Post>) {
    posts.sort_by(|a, b| (b.pub_date, b.id).cmp(&(a.pub_date, a.id)));
}

pub struct InMemoryUserRepository {
    store: MemoryStore,
}

#[async_trait]
impl BaseRepository<User, i64> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        // Relational cascade: the author's posts (with their comments),
        // comments, and follow edges go with the account.
        let doomed_posts: Vec<i64> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in doomed_posts {
            tables.posts.remove(&post_id);
            tables.comments.retain(|_, c| c.post_id != post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
        tables
            .follows
            .retain(|f| f.user_id != id && f.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn with_posts(&self) -> Result<Vec<User>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut authors: Vec<User> = tables
            .users
            .values()
            .filter(|u| tables.posts.values().any(|p| p.author_id == u.id))
            .cloned()
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(authors)
    }

    async fn create(&self, username: &str, full_name: &str) -> Result<User, RepoError> {
        let mut tables = self.store.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(RepoError::Constraint(format!(
                "username '{username}' already taken"
            )));
        }
        let user = User {
            id: self.store.next_id(),
            username: username.to_string(),
            full_name: full_name.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

pub struct InMemoryGroupRepository {
    store: MemoryStore,
}

#[async_trait]
impl BaseRepository<Group, i64> for InMemoryGroupRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.groups.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        if tables.groups.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        // ON DELETE SET NULL: posts survive their group.
        for post in tables.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Group>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.groups.get(id).cloned())
            .collect())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }

    async fn with_posts(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut groups: Vec<Group> = tables
            .groups
            .values()
            .filter(|g| tables.posts.values().any(|p| p.group_id == Some(g.id)))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }

    async fn create(
        &self,
        title: &str,
        slug: &str,
        description: &str,
    ) -> Result<Group, RepoError> {
        let mut tables = self.store.tables.write().await;
        if tables.groups.values().any(|g| g.slug == slug) {
            return Err(RepoError::Constraint(format!(
                "slug '{slug}' already taken"
            )));
        }
        let group = Group {
            id: self.store.next_id(),
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
        };
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }
}

pub struct InMemoryPostRepository {
    store: MemoryStore,
}

impl InMemoryPostRepository {
    async fn collect_where(&self, keep: impl Fn(&Post) -> bool) -> Vec<Post> {
        let tables = self.store.tables.read().await;
        let mut posts: Vec<Post> = tables.posts.values().filter(|p| keep(p)).cloned().collect();
        sort_newest_first(&mut posts);
        posts
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.posts.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        if tables.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;
        let mut post = new_post.into_post(Utc::now());
        post.id = self.store.next_id();
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: i64, changes: PostChanges) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;
        let post = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.title = changes.title;
        post.text = changes.text;
        post.group_id = changes.group_id;
        if let Some(image) = changes.image {
            post.image = Some(image);
        }
        Ok(post.clone())
    }

    async fn page_all(&self, page: u64, per_page: u64) -> Result<Paginated<Post>, RepoError> {
        Ok(pagination::paginate_vec(
            self.collect_where(|_| true).await,
            page,
            per_page,
        ))
    }

    async fn page_by_group(
        &self,
        group_id: i64,
        page: u64,
        per_page: u64,
    ) -> Result<Paginated<Post>, RepoError> {
        Ok(pagination::paginate_vec(
            self.collect_where(|p| p.group_id == Some(group_id)).await,
            page,
            per_page,
        ))
    }

    async fn page_by_author(
        &self,
        author_id: i64,
        page: u64,
        per_page: u64,
    ) -> Result<Paginated<Post>, RepoError> {
        Ok(pagination::paginate_vec(
            self.collect_where(|p| p.author_id == author_id).await,
            page,
            per_page,
        ))
    }

    async fn page_by_authors(
        &self,
        author_ids: &[i64],
        page: u64,
        per_page: u64,
    ) -> Result<Paginated<Post>, RepoError> {
        if author_ids.is_empty() {
            return Ok(Paginated::empty(per_page));
        }
        Ok(pagination::paginate_vec(
            self.collect_where(|p| author_ids.contains(&p.author_id))
                .await,
            page,
            per_page,
        ))
    }

    async fn recent_with_images(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let mut posts = self.collect_where(|p| p.image.is_some()).await;
        posts.truncate(limit as usize);
        Ok(posts)
    }
}

pub struct InMemoryCommentRepository {
    store: MemoryStore,
}

#[async_trait]
impl BaseRepository<Comment, i64> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.comments.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        if tables.comments.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn create(&self, new_comment: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.store.tables.write().await;
        if !tables.posts.contains_key(&new_comment.post_id) {
            return Err(RepoError::Constraint("post does not exist".to_string()));
        }
        let comment = Comment {
            id: self.store.next_id(),
            post_id: new_comment.post_id,
            author_id: new_comment.author_id,
            text: new_comment.text,
            created: Utc::now(),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (b.created, b.id).cmp(&(a.created, a.id)));
        Ok(comments)
    }
}

pub struct InMemoryFollowRepository {
    store: MemoryStore,
}

#[async_trait]
impl FollowRepository for InMemoryFollowRepository {
    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn create(&self, user_id: i64, author_id: i64) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        if user_id == author_id {
            // Mirrors the CHECK constraint; callers never let this through.
            return Err(RepoError::Constraint("self-follow".to_string()));
        }
        if tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            // Unique violation is a no-op, matching the SQL repository.
            return Ok(());
        }
        let follow = Follow {
            id: self.store.next_id(),
            user_id,
            author_id,
        };
        tables.follows.push(follow);
        Ok(())
    }

    async fn delete(&self, user_id: i64, author_id: i64) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        tables
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(())
    }

    async fn following_ids(&self, user_id: i64) -> Result<Vec<i64>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.author_id)
            .collect())
    }

    async fn list_for(&self, user_id: i64) -> Result<Vec<Follow>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }
}
