//! Sharing transformer. Maps a diary snapshot to a post-creation payload.
//! Pure: no persistence, never touches an existing post.

use uuid::Uuid;

use crate::models::post::{NewPost, PostCategory};

/// Author label shown on anonymous posts and comments.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Everything the transformer needs, captured at share time.
#[derive(Debug, Clone)]
pub struct ShareSource<'a> {
    pub owner_id: Uuid,
    pub diary_id: Uuid,
    pub content: &'a str,
    pub category: PostCategory,
    pub is_anonymous: bool,
    pub owner_nickname: &'a str,
}

pub fn author_label(is_anonymous: bool, nickname: &str) -> String {
    if is_anonymous {
        ANONYMOUS_AUTHOR.to_string()
    } else {
        nickname.to_string()
    }
}

pub fn to_post_payload(source: &ShareSource<'_>) -> NewPost {
    NewPost {
        user_id: source.owner_id,
        diary_id: Some(source.diary_id),
        title: None,
        content: source.content.to_string(),
        category: source.category,
        is_anonymous: source.is_anonymous,
        author_nickname: author_label(source.is_anonymous, source.owner_nickname),
    }
}
