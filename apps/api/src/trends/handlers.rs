use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::errors::{require_length, require_text, AppError};
use crate::models::user::{ProfileUpdate, UserRow, UserStats};
use crate::routes::UserIdQuery;
use crate::state::AppState;
use crate::trends::aggregator::{EmotionGraph, Period};
use crate::trends::profile::ProfileService;

const NICKNAME_CHARS: (usize, usize) = (2, 20);

#[derive(Deserialize)]
pub struct GraphParams {
    #[serde(default)]
    pub period: Period,
}

/// GET /api/v1/users/me
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(user): Query<UserIdQuery>,
) -> Result<Json<UserRow>, AppError> {
    Ok(Json(
        ProfileService::from_state(&state).profile(user.user_id).await?,
    ))
}

/// PUT /api/v1/users/me
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Query(user): Query<UserIdQuery>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserRow>, AppError> {
    if let Some(nickname) = &update.nickname {
        require_text("nickname", nickname)?;
        require_length("nickname", nickname, NICKNAME_CHARS.0, NICKNAME_CHARS.1)?;
    }
    let profile = ProfileService::from_state(&state)
        .update_profile(user.user_id, &update)
        .await?;
    Ok(Json(profile))
}

/// GET /api/v1/users/me/stats
pub async fn handle_get_stats(
    State(state): State<AppState>,
    Query(user): Query<UserIdQuery>,
) -> Result<Json<UserStats>, AppError> {
    Ok(Json(
        ProfileService::from_state(&state).stats(user.user_id).await?,
    ))
}

/// GET /api/v1/users/me/emotion-graph
pub async fn handle_emotion_graph(
    State(state): State<AppState>,
    Query(user): Query<UserIdQuery>,
    Query(params): Query<GraphParams>,
) -> Result<Json<EmotionGraph>, AppError> {
    let graph = ProfileService::from_state(&state)
        .emotion_graph(user.user_id, params.period, Utc::now())
        .await?;
    Ok(Json(graph))
}
