use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{require_length, require_text, AppError};
use crate::feed::comments::{CommentService, CreateCommentRequest};
use crate::feed::posts::{CreatePostRequest, PostService, PostSummary};
use crate::models::post::{CommentRow, PostCategory, PostQuery, PostRow, PostSort};
use crate::pagination::{PageParams, Paginated};
use crate::routes::UserIdQuery;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_TITLE_CHARS: usize = 200;
const MAX_POST_CHARS: usize = 10_000;
const MAX_COMMENT_CHARS: usize = 1_000;

#[derive(Deserialize)]
pub struct FeedParams {
    pub category: Option<PostCategory>,
    #[serde(rename = "sortBy", default)]
    pub sort_by: PostSort,
}

/// GET /api/v1/posts
pub async fn handle_list_posts(
    State(state): State<AppState>,
    Query(user): Query<UserIdQuery>,
    Query(feed): Query<FeedParams>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<PostSummary>>, AppError> {
    let (page, limit) = params.resolve(DEFAULT_PAGE_SIZE);
    let query = PostQuery {
        category: feed.category,
        sort: feed.sort_by,
        page,
        limit,
    };
    let posts = PostService::from_state(&state)
        .list(user.user_id, query)
        .await?;
    Ok(Json(posts))
}

/// POST /api/v1/posts
pub async fn handle_create_post(
    State(state): State<AppState>,
    Query(user): Query<UserIdQuery>,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostRow>), AppError> {
    require_text("content", &req.content)?;
    require_length("content", &req.content, 1, MAX_POST_CHARS)?;
    if let Some(title) = &req.title {
        require_length("title", title, 0, MAX_TITLE_CHARS)?;
    }
    let post = PostService::from_state(&state)
        .create(user.user_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/v1/posts/:id
pub async fn handle_get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostRow>, AppError> {
    Ok(Json(PostService::from_state(&state).get(id).await?))
}

/// DELETE /api/v1/posts/:id
pub async fn handle_delete_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(user): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    PostService::from_state(&state)
        .delete(user.user_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/posts/:id/comments
pub async fn handle_list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Vec<CommentRow>>, AppError> {
    Ok(Json(CommentService::from_state(&state).list(post_id).await?))
}

/// POST /api/v1/posts/:id/comments
pub async fn handle_create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Query(user): Query<UserIdQuery>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentRow>), AppError> {
    require_text("content", &req.content)?;
    require_length("content", &req.content, 1, MAX_COMMENT_CHARS)?;
    let comment = CommentService::from_state(&state)
        .create(user.user_id, post_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/v1/comments/:id
pub async fn handle_delete_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(user): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    CommentService::from_state(&state)
        .delete(user.user_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
