//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};

use quill_core::domain::{Comment, Follow, Group, NewComment, NewPost, Post, PostChanges, User};
use quill_core::error::RepoError;
use quill_core::pagination::{self, Paginated};
use quill_core::ports::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL follow repository.
pub type PostgresFollowRepository = PostgresBaseRepository<FollowEntity>;

fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

fn is_unique_violation(e: &DbErr) -> bool {
    let msg = e.to_string();
    msg.contains("duplicate") || msg.contains("unique")
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::Username)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn with_posts(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .inner_join(PostEntity)
            .distinct()
            .order_by_asc(user::Column::Username)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, username: &str, full_name: &str) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            id: NotSet,
            username: Set(username.to_string()),
            full_name: Set(full_name.to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoError::Constraint(format!("username '{username}' already taken"))
            } else {
                query_err(e)
            }
        })?;

        Ok(model.into())
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Group>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = GroupEntity::find()
            .filter(group::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn with_posts(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .inner_join(PostEntity)
            .distinct()
            .order_by_asc(group::Column::Title)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(
        &self,
        title: &str,
        slug: &str,
        description: &str,
    ) -> Result<Group, RepoError> {
        let model = group::ActiveModel {
            id: NotSet,
            title: Set(title.to_string()),
            slug: Set(slug.to_string()),
            description: Set(description.to_string()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoError::Constraint(format!("slug '{slug}' already taken"))
            } else {
                query_err(e)
            }
        })?;

        Ok(model.into())
    }
}

impl PostgresPostRepository {
    /// The one ordering every listing uses: newest first, ties broken by
    /// id so pagination windows never shift between requests.
    fn ordered() -> Select<PostEntity> {
        PostEntity::find()
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
    }

    async fn fetch_page(
        &self,
        query: Select<PostEntity>,
        requested: u64,
        per_page: u64,
    ) -> Result<Paginated<Post>, RepoError> {
        let paginator = query.paginate(self.db.as_ref(), per_page);
        let counts = paginator.num_items_and_pages().await.map_err(query_err)?;

        let pages = counts.number_of_pages.max(1);
        let page = pagination::clamp_page(requested, pages);
        // SeaORM pages are 0-indexed.
        let models = paginator.fetch_page(page - 1).await.map_err(query_err)?;

        Ok(Paginated {
            items: models.into_iter().map(Into::into).collect(),
            page,
            pages,
            total: counts.number_of_items,
            per_page,
        })
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            id: NotSet,
            author_id: Set(new_post.author_id),
            group_id: Set(new_post.group_id),
            title: Set(new_post.title),
            text: Set(new_post.text),
            image: Set(new_post.image),
            pub_date: Set(Utc::now().into()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(query_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: i64, changes: PostChanges) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            id: Set(id),
            author_id: NotSet,
            group_id: Set(changes.group_id),
            title: Set(changes.title),
            text: Set(changes.text),
            image: match changes.image {
                Some(image) => Set(Some(image)),
                None => NotSet,
            },
            pub_date: NotSet,
        }
        .update(self.db.as_ref())
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated => RepoError::NotFound,
            other => query_err(other),
        })?;

        Ok(model.into())
    }

    async fn page_all(&self, page: u64, per_page: u64) -> Result<Paginated<Post>, RepoError> {
        self.fetch_page(Self::ordered(), page, per_page).await
    }

    async fn page_by_group(
        &self,
        group_id: i64,
        page: u64,
        per_page: u64,
    ) -> Result<Paginated<Post>, RepoError> {
        self.fetch_page(
            Self::ordered().filter(post::Column::GroupId.eq(group_id)),
            page,
            per_page,
        )
        .await
    }

    async fn page_by_author(
        &self,
        author_id: i64,
        page: u64,
        per_page: u64,
    ) -> Result<Paginated<Post>, RepoError> {
        self.fetch_page(
            Self::ordered().filter(post::Column::AuthorId.eq(author_id)),
            page,
            per_page,
        )
        .await
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
        self.fetch_page(
            Self::ordered().filter(post::Column::AuthorId.is_in(author_ids.to_vec())),
            page,
            per_page,
        )
        .await
    }

    async fn recent_with_images(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let result = Self::ordered()
            .filter(post::Column::Image.is_not_null())
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, new_comment: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel {
            id: NotSet,
            post_id: Set(new_comment.post_id),
            author_id: Set(new_comment.author_id),
            text: Set(new_comment.text),
            created: Set(Utc::now().into()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(query_err)?;

        Ok(model.into())
    }

    async fn for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::Created)
            .order_by_desc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        let count = FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(count > 0)
    }

    async fn create(&self, user_id: i64, author_id: i64) -> Result<(), RepoError> {
        let result = follow::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            author_id: Set(author_id),
        }
        .insert(self.db.as_ref())
        .await;

        match result {
            Ok(_) => Ok(()),
            // A concurrent duplicate is indistinguishable from the edge
            // already existing; either way the edge is there.
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(user_id, author_id, "Duplicate follow ignored");
                Ok(())
            }
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("check") {
                    Err(RepoError::Constraint("self-follow".to_string()))
                } else {
                    Err(query_err(e))
                }
            }
        }
    }

    async fn delete(&self, user_id: i64, author_id: i64) -> Result<(), RepoError> {
        FollowEntity::delete_many()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .exec(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(())
    }

    async fn following_ids(&self, user_id: i64) -> Result<Vec<i64>, RepoError> {
        let result = FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(|f| f.author_id).collect())
    }

    async fn list_for(&self, user_id: i64) -> Result<Vec<Follow>, RepoError> {
        let result = FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
