use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::diary::sharing::author_label;
use crate::errors::AppError;
use crate::models::post::{CommentRow, NewComment};
use crate::state::AppState;
use crate::store::{CommentStore, PostStore, UserStore};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Comments keep the parent post's `comment_count` in step.
pub struct CommentService {
    users: Arc<dyn UserStore>,
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
}

impl CommentService {
    pub fn new(
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        comments: Arc<dyn CommentStore>,
    ) -> Self {
        Self {
            users,
            posts,
            comments,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.users.clone(),
            state.posts.clone(),
            state.comments.clone(),
        )
    }

    async fn ensure_post(&self, post_id: Uuid) -> Result<(), AppError> {
        self.posts
            .find_post(post_id)
            .await?
            .map(|_| ())
            .ok_or_else(AppError::post_not_found)
    }

    pub async fn create(
        &self,
        owner: Uuid,
        post_id: Uuid,
        req: CreateCommentRequest,
    ) -> Result<CommentRow, AppError> {
        self.ensure_post(post_id).await?;
        let user = self
            .users
            .find_user(owner)
            .await?
            .ok_or_else(AppError::user_not_found)?;

        let comment = self
            .comments
            .insert_comment(NewComment {
                post_id,
                user_id: owner,
                content: req.content,
                is_anonymous: req.is_anonymous,
                author_nickname: author_label(req.is_anonymous, &user.nickname),
            })
            .await?;
        self.posts.increment_comment_count(post_id).await?;

        info!("Added comment {} to post {post_id}", comment.id);
        Ok(comment)
    }

    pub async fn list(&self, post_id: Uuid) -> Result<Vec<CommentRow>, AppError> {
        self.ensure_post(post_id).await?;
        self.comments.list_comments(post_id).await
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        let comment = self
            .comments
            .find_comment(id)
            .await?
            .ok_or_else(AppError::comment_not_found)?;
        if comment.user_id != owner {
            return Err(AppError::Forbidden(
                "Only the author can delete this comment".to_string(),
            ));
        }

        self.comments.delete_comment(id).await?;
        self.posts.decrement_comment_count(comment.post_id).await?;
        info!("Deleted comment {id} from post {}", comment.post_id);
        Ok(())
    }
}
