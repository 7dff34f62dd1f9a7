use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's stance toward moving on from the relationship.
/// Drives comfort-message tone and the default feed bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "affinity", rename_all = "snake_case")]
pub enum Affinity {
    MoveOn,
    HoldOn,
    Undecided,
}

impl Affinity {
    /// Phrase used when describing the writer to the remote model.
    pub fn describe(self) -> &'static str {
        match self {
            Affinity::MoveOn => "wants to let go of the relationship and move on",
            Affinity::HoldOn => "still wants to hold on to the relationship",
            Affinity::Undecided => "has not yet decided whether to move on or hold on",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub nickname: String,
    pub affinity: Affinity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub affinity: Option<Affinity>,
}

/// Activity counters shown on the profile page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub diary_count: i64,
    pub post_count: i64,
    pub comment_count: i64,
}
