pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::diary::handlers as diary;
use crate::feed::handlers as feed;
use crate::state::AppState;
use crate::trends::handlers as trends;

/// Caller identity, passed as `?user_id=`.
#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile and trends
        .route(
            "/api/v1/users/me",
            get(trends::handle_get_profile).put(trends::handle_update_profile),
        )
        .route("/api/v1/users/me/stats", get(trends::handle_get_stats))
        .route(
            "/api/v1/users/me/emotion-graph",
            get(trends::handle_emotion_graph),
        )
        // Diaries
        .route(
            "/api/v1/diaries",
            post(diary::handle_create_diary).get(diary::handle_list_diaries),
        )
        .route("/api/v1/diaries/template", get(diary::handle_diary_template))
        .route(
            "/api/v1/diaries/:id",
            get(diary::handle_get_diary)
                .put(diary::handle_update_diary)
                .delete(diary::handle_delete_diary),
        )
        .route("/api/v1/diaries/:id/share", post(diary::handle_share_diary))
        // Community feed
        .route(
            "/api/v1/posts",
            get(feed::handle_list_posts).post(feed::handle_create_post),
        )
        .route(
            "/api/v1/posts/:id",
            get(feed::handle_get_post).delete(feed::handle_delete_post),
        )
        .route(
            "/api/v1/posts/:id/comments",
            get(feed::handle_list_comments).post(feed::handle_create_comment),
        )
        .route("/api/v1/comments/:id", delete(feed::handle_delete_comment))
        .with_state(state)
}
