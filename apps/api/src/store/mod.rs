// Store ports: the persistence operations the services call.
//
// `PgStore` implements every port against PostgreSQL. `AppState` carries each
// port as an `Arc<dyn ...>` so services never see SQL; tests swap in
// `memory::MemoryStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::analysis::EmotionAnalysis;
use crate::errors::AppError;
use crate::models::diary::{DiaryRow, EmotionDataPoint, NewDiary};
use crate::models::post::{CommentRow, NewComment, NewPost, PostQuery, PostRow};
use crate::models::user::{ProfileUpdate, UserRow, UserStats};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

/// Result of [`DiaryStore::share_diary`].
#[derive(Debug)]
pub enum ShareOutcome {
    Shared { diary: DiaryRow, post: PostRow },
    AlreadyShared,
    /// The diary does not exist for this owner, or vanished mid-share.
    Missing,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRow>, AppError>;

    /// Applies the non-`None` fields. Returns `None` if the user does not exist.
    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<UserRow>, AppError>;

    async fn stats(&self, id: Uuid) -> Result<UserStats, AppError>;
}

/// Every diary lookup is scoped to its owner: a diary owned by someone else is
/// indistinguishable from a missing one.
#[async_trait]
pub trait DiaryStore: Send + Sync {
    async fn find_diary(&self, owner: Uuid, id: Uuid) -> Result<Option<DiaryRow>, AppError>;

    /// Newest first.
    async fn list_diaries(
        &self,
        owner: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<DiaryRow>, i64), AppError>;

    async fn insert_diary(&self, diary: NewDiary) -> Result<DiaryRow, AppError>;

    /// Overwrites content and all analysis fields together.
    async fn update_analysis(
        &self,
        owner: Uuid,
        id: Uuid,
        content: &str,
        analysis: &EmotionAnalysis,
    ) -> Result<Option<DiaryRow>, AppError>;

    /// Returns `false` if nothing was deleted.
    async fn delete_diary(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;

    /// Publishes the diary as one atomic step: flips `is_shared` only if it is
    /// still false, inserts `post` and links it. Nothing is written unless every
    /// step succeeds.
    async fn share_diary(
        &self,
        owner: Uuid,
        id: Uuid,
        post: NewPost,
    ) -> Result<ShareOutcome, AppError>;

    /// Mean score over all of the owner's diaries, 0 when there are none.
    async fn average_score(&self, owner: Uuid) -> Result<f64, AppError>;

    /// Points created on/after `since` (everything when `None`), oldest first.
    async fn emotion_points_since(
        &self,
        owner: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<EmotionDataPoint>, AppError>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn find_post(&self, id: Uuid) -> Result<Option<PostRow>, AppError>;

    /// Filters and sorts at the store, then returns one page plus the total match count.
    async fn list_posts(&self, query: PostQuery) -> Result<(Vec<PostRow>, i64), AppError>;

    async fn insert_post(&self, post: NewPost) -> Result<PostRow, AppError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), AppError>;

    async fn increment_comment_count(&self, id: Uuid) -> Result<(), AppError>;

    /// Never drops below zero.
    async fn decrement_comment_count(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn find_comment(&self, id: Uuid) -> Result<Option<CommentRow>, AppError>;

    /// Oldest first.
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentRow>, AppError>;

    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRow, AppError>;

    async fn delete_comment(&self, id: Uuid) -> Result<(), AppError>;
}
