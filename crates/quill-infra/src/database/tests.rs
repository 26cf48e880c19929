#[cfg(test)]
mod tests {
    use crate::database::entity::{group, post};
    use crate::database::postgres_repo::{PostgresGroupRepository, PostgresPostRepository};
    use quill_core::domain::Post;
    use quill_core::ports::{BaseRepository, GroupRepository};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_post_by_id() {
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post::Model {
                id: 42,
                author_id: 7,
                group_id: None,
                title: "Test Post".to_owned(),
                text: "Content".to_owned(),
                image: None,
                pub_date: now.into(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(42).await.unwrap();

        let found = result.unwrap();
        assert_eq!(found.title, "Test Post");
        assert_eq!(found.author_id, 7);
        assert_eq!(found.id, 42);
    }

    #[tokio::test]
    async fn test_find_group_by_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![group::Model {
                id: 1,
                title: "Cats".to_owned(),
                slug: "cats".to_owned(),
                description: "Feline content".to_owned(),
            }]])
            .into_connection();

        let repo = PostgresGroupRepository::new(db);

        let group = repo.find_by_slug("cats").await.unwrap().unwrap();

        assert_eq!(group.title, "Cats");
        assert_eq!(group.slug, "cats");
    }

    #[tokio::test]
    async fn test_repositories_share_one_connection() {
        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![group::Model {
                    id: 1,
                    title: "Cats".to_owned(),
                    slug: "cats".to_owned(),
                    description: "Feline content".to_owned(),
                }]])
                .append_query_results(vec![Vec::<post::Model>::new()])
                .into_connection(),
        );

        let groups = PostgresGroupRepository::new(db.clone());
        let posts = PostgresPostRepository::new(db);

        assert!(groups.find_by_slug("cats").await.unwrap().is_some());
        let missing: Option<Post> = posts.find_by_id(7).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(999).await.unwrap();
        assert!(result.is_none());
    }
}
