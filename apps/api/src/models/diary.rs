use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DiaryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    /// Always within [-100, 100].
    pub emotion_score: i32,
    /// At most three, in discovery order.
    pub emotion_keywords: Vec<String>,
    pub comfort_message: String,
    pub is_shared: bool,
    pub post_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written when a diary is created.
#[derive(Debug, Clone)]
pub struct NewDiary {
    pub user_id: Uuid,
    pub content: String,
    pub emotion_score: i32,
    pub emotion_keywords: Vec<String>,
    pub comfort_message: String,
}

/// One point of a user's emotion history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct EmotionDataPoint {
    pub date: DateTime<Utc>,
    pub emotion_score: i32,
}
