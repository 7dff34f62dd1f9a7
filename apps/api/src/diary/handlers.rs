use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::diary::lifecycle::{DiaryService, DiarySummary, ShareRequest};
use crate::diary::template::DiaryTemplate;
use crate::errors::{require_length, require_text, AppError};
use crate::models::diary::DiaryRow;
use crate::pagination::{PageParams, Paginated};
use crate::routes::UserIdQuery;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_CONTENT_CHARS: usize = 10_000;

#[derive(Deserialize)]
pub struct CreateDiaryRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct UpdateDiaryRequest {
    pub content: Option<String>,
}

/// POST /api/v1/diaries
pub async fn handle_create_diary(
    State(state): State<AppState>,
    Query(user): Query<UserIdQuery>,
    Json(req): Json<CreateDiaryRequest>,
) -> Result<(StatusCode, Json<DiaryRow>), AppError> {
    require_text("content", &req.content)?;
    require_length("content", &req.content, 1, MAX_CONTENT_CHARS)?;
    let diary = DiaryService::from_state(&state)
        .create(user.user_id, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(diary)))
}

/// GET /api/v1/diaries
pub async fn handle_list_diaries(
    State(state): State<AppState>,
    Query(user): Query<UserIdQuery>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<DiarySummary>>, AppError> {
    let (page, limit) = params.resolve(DEFAULT_PAGE_SIZE);
    let diaries = DiaryService::from_state(&state)
        .list(user.user_id, page, limit)
        .await?;
    Ok(Json(diaries))
}

/// GET /api/v1/diaries/template
pub async fn handle_diary_template(
    State(state): State<AppState>,
    Query(user): Query<UserIdQuery>,
) -> Result<Json<DiaryTemplate>, AppError> {
    let template = DiaryService::from_state(&state).template(user.user_id).await?;
    Ok(Json(template))
}

/// GET /api/v1/diaries/:id
pub async fn handle_get_diary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(user): Query<UserIdQuery>,
) -> Result<Json<DiaryRow>, AppError> {
    let diary = DiaryService::from_state(&state).get(user.user_id, id).await?;
    Ok(Json(diary))
}

/// PUT /api/v1/diaries/:id
pub async fn handle_update_diary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(user): Query<UserIdQuery>,
    Json(req): Json<UpdateDiaryRequest>,
) -> Result<Json<DiaryRow>, AppError> {
    if let Some(content) = &req.content {
        require_length("content", content, 0, MAX_CONTENT_CHARS)?;
    }
    let diary = DiaryService::from_state(&state)
        .update(user.user_id, id, req.content.as_deref())
        .await?;
    Ok(Json(diary))
}

/// DELETE /api/v1/diaries/:id
pub async fn handle_delete_diary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(user): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    DiaryService::from_state(&state).delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/diaries/:id/share
pub async fn handle_share_diary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(user): Query<UserIdQuery>,
    Json(req): Json<ShareRequest>,
) -> Result<Json<DiaryRow>, AppError> {
    let diary = DiaryService::from_state(&state)
        .share(user.user_id, id, req)
        .await?;
    Ok(Json(diary))
}
