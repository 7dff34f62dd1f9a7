use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::diary::sharing::author_label;
use crate::errors::AppError;
use crate::feed::ranking::rank_page;
use crate::models::post::{NewPost, PostCategory, PostQuery, PostRow};
use crate::pagination::{preview, Paginated};
use crate::state::AppState;
use crate::store::{PostStore, UserStore};

const PREVIEW_CHARS: usize = 150;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: String,
    pub category: PostCategory,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: Uuid,
    pub diary_id: Option<Uuid>,
    pub category: PostCategory,
    pub title: Option<String>,
    pub content_preview: String,
    pub is_anonymous: bool,
    pub author_nickname: String,
    pub comment_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<PostRow> for PostSummary {
    fn from(p: PostRow) -> Self {
        Self {
            id: p.id,
            diary_id: p.diary_id,
            category: p.category,
            title: p.title,
            content_preview: preview(&p.content, PREVIEW_CHARS),
            is_anonymous: p.is_anonymous,
            author_nickname: p.author_nickname,
            comment_count: p.comment_count,
            created_at: p.created_at,
        }
    }
}

pub struct PostService {
    users: Arc<dyn UserStore>,
    posts: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(users: Arc<dyn UserStore>, posts: Arc<dyn PostStore>) -> Self {
        Self { users, posts }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.users.clone(), state.posts.clone())
    }

    /// One page of the feed, sorted at the store and then biased toward the
    /// viewer's affinity. An unknown viewer gets the plain sort order.
    pub async fn list(
        &self,
        viewer: Uuid,
        query: PostQuery,
    ) -> Result<Paginated<PostSummary>, AppError> {
        let viewer_affinity = self.users.find_user(viewer).await?.map(|u| u.affinity);
        let (page, total) = self.posts.list_posts(query).await?;
        let ranked = rank_page(page, viewer_affinity, query.category);

        Ok(Paginated::new(
            ranked.into_iter().map(PostSummary::from).collect(),
            total,
            query.page,
            query.limit,
        ))
    }

    pub async fn create(&self, owner: Uuid, req: CreatePostRequest) -> Result<PostRow, AppError> {
        let user = self
            .users
            .find_user(owner)
            .await?
            .ok_or_else(AppError::user_not_found)?;

        let post = self
            .posts
            .insert_post(NewPost {
                user_id: owner,
                diary_id: None,
                title: req.title,
                content: req.content,
                category: req.category,
                is_anonymous: req.is_anonymous,
                author_nickname: author_label(req.is_anonymous, &user.nickname),
            })
            .await?;

        info!("Created post {} in {:?}", post.id, post.category);
        Ok(post)
    }

    pub async fn get(&self, id: Uuid) -> Result<PostRow, AppError> {
        self.posts
            .find_post(id)
            .await?
            .ok_or_else(AppError::post_not_found)
    }

    /// Only the author may delete a post.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        let post = self.get(id).await?;
        if post.user_id != owner {
            return Err(AppError::Forbidden(
                "Only the author can delete this post".to_string(),
            ));
        }
        self.posts.delete_post(id).await?;
        info!("Deleted post {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::diary::sharing::ANONYMOUS_AUTHOR;
    use crate::models::post::PostSort;
    use crate::models::user::Affinity;
    use crate::store::memory::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, PostService) {
        let store = Arc::new(MemoryStore::new());
        let service = PostService::new(store.clone(), store.clone());
        (store, service)
    }

    fn query(category: Option<PostCategory>, sort: PostSort) -> PostQuery {
        PostQuery {
            category,
            sort,
            page: 1,
            limit: 20,
        }
    }

    fn ids(page: &Paginated<PostSummary>) -> Vec<Uuid> {
        page.items.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn test_feed_biases_toward_viewer_affinity() {
        let (store, service) = setup();
        let viewer = store.add_user("viewer", Affinity::MoveOn);
        let author = store.add_user("author", Affinity::HoldOn);
        let now = Utc::now();
        let a = store.add_post_at(author, PostCategory::MoveOn, 0, now);
        let b = store.add_post_at(author, PostCategory::HoldOn, 0, now - Duration::hours(1));
        let c = store.add_post_at(author, PostCategory::MoveOn, 0, now - Duration::hours(2));

        let page = service
            .list(viewer, query(None, PostSort::Latest))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![a, c, b]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_most_commented_keeps_count_order_within_buckets() {
        let (store, service) = setup();
        let viewer = store.add_user("viewer", Affinity::HoldOn);
        let now = Utc::now();
        let busy_other = store.add_post_at(viewer, PostCategory::MoveOn, 9, now);
        let mid_mine = store.add_post_at(viewer, PostCategory::HoldOn, 5, now);
        let quiet_mine = store.add_post_at(viewer, PostCategory::HoldOn, 1, now);

        let page = service
            .list(viewer, query(None, PostSort::MostCommented))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![mid_mine, quiet_mine, busy_other]);
    }

    #[tokio::test]
    async fn test_category_filter_skips_bias_and_unknown_viewer_is_unbiased() {
        let (store, service) = setup();
        let viewer = store.add_user("viewer", Affinity::MoveOn);
        let now = Utc::now();
        let newer = store.add_post_at(viewer, PostCategory::Undecided, 0, now);
        let older = store.add_post_at(viewer, PostCategory::MoveOn, 0, now - Duration::hours(1));

        let filtered = service
            .list(viewer, query(Some(PostCategory::MoveOn), PostSort::Latest))
            .await
            .unwrap();
        assert_eq!(ids(&filtered), vec![older]);
        assert_eq!(filtered.total, 1);

        let anonymous = service
            .list(Uuid::new_v4(), query(None, PostSort::Latest))
            .await
            .unwrap();
        assert_eq!(ids(&anonymous), vec![newer, older]);
    }

    #[tokio::test]
    async fn test_create_post_uses_author_label() {
        let (store, service) = setup();
        let owner = store.add_user("river", Affinity::Undecided);

        let named = service
            .create(
                owner,
                CreatePostRequest {
                    title: Some("Day one".to_string()),
                    content: "hello".to_string(),
                    category: PostCategory::Undecided,
                    is_anonymous: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(named.author_nickname, "river");
        assert_eq!(named.comment_count, 0);
        assert_eq!(named.title.as_deref(), Some("Day one"));

        let hidden = service
            .create(
                owner,
                CreatePostRequest {
                    title: None,
                    content: "quiet".to_string(),
                    category: PostCategory::HoldOn,
                    is_anonymous: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(hidden.author_nickname, ANONYMOUS_AUTHOR);
    }

    #[tokio::test]
    async fn test_delete_requires_author() {
        let (store, service) = setup();
        let author = store.add_user("author", Affinity::MoveOn);
        let other = store.add_user("other", Affinity::MoveOn);
        let id = store.add_post_at(author, PostCategory::MoveOn, 0, Utc::now());

        assert!(matches!(
            service.delete(other, id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(store.post(id).is_some());

        service.delete(author, id).await.unwrap();
        assert!(matches!(service.get(id).await, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_summary_truncates_long_content() {
        let now = Utc::now();
        let summary = PostSummary::from(PostRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            diary_id: None,
            category: PostCategory::MoveOn,
            title: None,
            content: "x".repeat(200),
            is_anonymous: false,
            author_nickname: "n".to_string(),
            comment_count: 0,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(summary.content_preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(summary.content_preview.ends_with("..."));
    }
}
