use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::user::Affinity;

/// Community board a post is filed under. Mirrors [`Affinity`] one to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "post_category", rename_all = "snake_case")]
pub enum PostCategory {
    MoveOn,
    HoldOn,
    Undecided,
}

impl From<Affinity> for PostCategory {
    fn from(affinity: Affinity) -> Self {
        match affinity {
            Affinity::MoveOn => PostCategory::MoveOn,
            Affinity::HoldOn => PostCategory::HoldOn,
            Affinity::Undecided => PostCategory::Undecided,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub diary_id: Option<Uuid>,
    pub category: PostCategory,
    pub title: Option<String>,
    pub content: String,
    pub is_anonymous: bool,
    pub author_nickname: String,
    pub comment_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for inserting a post. The store starts `comment_count` at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub user_id: Uuid,
    pub diary_id: Option<Uuid>,
    pub title: Option<String>,
    pub content: String,
    pub category: PostCategory,
    pub is_anonymous: bool,
    pub author_nickname: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum PostSort {
    #[default]
    #[serde(rename = "latest")]
    Latest,
    #[serde(rename = "comments")]
    MostCommented,
}

/// Store-level feed query: filter, sort and one page.
#[derive(Debug, Clone, Copy)]
pub struct PostQuery {
    pub category: Option<PostCategory>,
    pub sort: PostSort,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub is_anonymous: bool,
    pub author_nickname: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub is_anonymous: bool,
    pub author_nickname: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_maps_from_affinity() {
        assert_eq!(PostCategory::from(Affinity::MoveOn), PostCategory::MoveOn);
        assert_eq!(PostCategory::from(Affinity::HoldOn), PostCategory::HoldOn);
        assert_eq!(
            PostCategory::from(Affinity::Undecided),
            PostCategory::Undecided
        );
    }

    #[test]
    fn test_sort_query_values() {
        let latest: PostSort = serde_json::from_str("\"latest\"").unwrap();
        let comments: PostSort = serde_json::from_str("\"comments\"").unwrap();
        assert_eq!(latest, PostSort::Latest);
        assert_eq!(comments, PostSort::MostCommented);
        assert_eq!(PostSort::default(), PostSort::Latest);
    }
}
