//! Diary Lifecycle Manager.
//!
//! `Created → [Edited]* → Shared`, with deletion allowed from any state.
//! Every operation is scoped to the owner; someone else's diary is NotFound.
//!
//! Sharing is fail-closed: the already-shared check runs before any side effect,
//! and the store flips the flag, creates the post and links it as one atomic
//! step, so two concurrent shares can never both create a post and a failed
//! share never leaves a post behind.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::EmotionAnalyzer;
use crate::diary::sharing::{to_post_payload, ShareSource};
use crate::diary::template::{select_template, DiaryTemplate};
use crate::errors::AppError;
use crate::models::diary::{DiaryRow, NewDiary};
use crate::models::post::PostCategory;
use crate::models::user::UserRow;
use crate::pagination::{preview, Paginated};
use crate::state::AppState;
use crate::store::{DiaryStore, ShareOutcome, UserStore};

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    #[serde(default)]
    pub is_anonymous: bool,
    /// Defaults to the category matching the owner's affinity.
    pub category: Option<PostCategory>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiarySummary {
    pub id: Uuid,
    pub content_preview: String,
    pub emotion_score: i32,
    pub emotion_keywords: Vec<String>,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DiaryRow> for DiarySummary {
    fn from(d: DiaryRow) -> Self {
        Self {
            id: d.id,
            content_preview: preview(&d.content, PREVIEW_CHARS),
            emotion_score: d.emotion_score,
            emotion_keywords: d.emotion_keywords,
            is_shared: d.is_shared,
            created_at: d.created_at,
        }
    }
}

pub struct DiaryService {
    users: Arc<dyn UserStore>,
    diaries: Arc<dyn DiaryStore>,
    analyzer: Arc<dyn EmotionAnalyzer>,
}

impl DiaryService {
    pub fn new(
        users: Arc<dyn UserStore>,
        diaries: Arc<dyn DiaryStore>,
        analyzer: Arc<dyn EmotionAnalyzer>,
    ) -> Self {
        Self {
            users,
            diaries,
            analyzer,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.users.clone(),
            state.diaries.clone(),
            state.analyzer.clone(),
        )
    }

    async fn owner(&self, owner: Uuid) -> Result<UserRow, AppError> {
        self.users
            .find_user(owner)
            .await?
            .ok_or_else(AppError::user_not_found)
    }

    async fn owned_diary(&self, owner: Uuid, id: Uuid) -> Result<DiaryRow, AppError> {
        self.diaries
            .find_diary(owner, id)
            .await?
            .ok_or_else(AppError::diary_not_found)
    }

    pub async fn create(&self, owner: Uuid, content: &str) -> Result<DiaryRow, AppError> {
        let user = self.owner(owner).await?;
        let analysis = self.analyzer.analyze(content, user.affinity).await;

        let diary = self
            .diaries
            .insert_diary(NewDiary {
                user_id: owner,
                content: content.to_string(),
                emotion_score: analysis.emotion_score,
                emotion_keywords: analysis.emotion_keywords,
                comfort_message: analysis.comfort_message,
            })
            .await?;

        info!(
            "Created diary {} for user {} (score {}, backend {})",
            diary.id,
            owner,
            diary.emotion_score,
            self.analyzer.backend()
        );
        Ok(diary)
    }

    pub async fn list(
        &self,
        owner: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<DiarySummary>, AppError> {
        let (items, total) = self.diaries.list_diaries(owner, page, limit).await?;
        Ok(Paginated::new(
            items.into_iter().map(DiarySummary::from).collect(),
            total,
            page,
            limit,
        ))
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<DiaryRow, AppError> {
        self.owned_diary(owner, id).await
    }

    /// Re-analyses when new content is supplied; otherwise returns the diary untouched.
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        content: Option<&str>,
    ) -> Result<DiaryRow, AppError> {
        let diary = self.owned_diary(owner, id).await?;

        let content = match content {
            Some(c) if !c.is_empty() => c,
            _ => return Ok(diary),
        };

        let user = self.owner(owner).await?;
        let analysis = self.analyzer.analyze(content, user.affinity).await;

        self.diaries
            .update_analysis(owner, id, content, &analysis)
            .await?
            .ok_or_else(AppError::diary_not_found)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        self.owned_diary(owner, id).await?;
        if !self.diaries.delete_diary(owner, id).await? {
            return Err(AppError::diary_not_found());
        }
        info!("Deleted diary {id} for user {owner}");
        Ok(())
    }

    /// Publishes the diary to the community feed exactly once.
    pub async fn share(
        &self,
        owner: Uuid,
        id: Uuid,
        request: ShareRequest,
    ) -> Result<DiaryRow, AppError> {
        let diary = self.owned_diary(owner, id).await?;
        if diary.is_shared {
            return Err(already_shared());
        }
        let user = self.owner(owner).await?;

        let payload = to_post_payload(&ShareSource {
            owner_id: owner,
            diary_id: id,
            content: &diary.content,
            category: request
                .category
                .unwrap_or_else(|| PostCategory::from(user.affinity)),
            is_anonymous: request.is_anonymous,
            owner_nickname: &user.nickname,
        });

        match self.diaries.share_diary(owner, id, payload).await? {
            ShareOutcome::Shared { diary, post } => {
                info!(
                    "Shared diary {id} as post {} (category {:?})",
                    post.id, post.category
                );
                Ok(diary)
            }
            ShareOutcome::AlreadyShared => Err(already_shared()),
            ShareOutcome::Missing => Err(AppError::diary_not_found()),
        }
    }

    pub async fn template(&self, owner: Uuid) -> Result<DiaryTemplate, AppError> {
        let average = self.diaries.average_score(owner).await?;
        Ok(select_template(average))
    }
}

fn already_shared() -> AppError {
    AppError::Conflict("Diary has already been shared".to_string())
}
