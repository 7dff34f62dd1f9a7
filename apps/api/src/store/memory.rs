//! In-memory store used by service tests. Mirrors the PostgreSQL semantics the
//! services rely on (owner scoping, conditional share claim, sort orders).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::analysis::EmotionAnalysis;
use crate::errors::AppError;
use crate::models::diary::{DiaryRow, EmotionDataPoint, NewDiary};
use crate::models::post::{
    CommentRow, NewComment, NewPost, PostCategory, PostQuery, PostRow, PostSort,
};
use crate::models::user::{Affinity, ProfileUpdate, UserRow, UserStats};
use crate::pagination::offset;
use crate::store::{CommentStore, DiaryStore, PostStore, ShareOutcome, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<UserRow>>,
    diaries: Mutex<Vec<DiaryRow>>,
    posts: Mutex<Vec<PostRow>>,
    comments: Mutex<Vec<CommentRow>>,
    post_inserts: AtomicUsize,
    fail_post_insert: AtomicBool,
    vanish_before_link: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, nickname: &str, affinity: Affinity) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.users.lock().unwrap().push(UserRow {
            id,
            email: format!("{nickname}@example.com"),
            nickname: nickname.to_string(),
            affinity,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn add_diary_at(&self, owner: Uuid, score: i32, created_at: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        self.diaries.lock().unwrap().push(DiaryRow {
            id,
            user_id: owner,
            content: format!("entry scored {score}"),
            emotion_score: score,
            emotion_keywords: vec!["seeded".to_string()],
            comfort_message: "seeded".to_string(),
            is_shared: false,
            post_id: None,
            created_at,
            updated_at: created_at,
        });
        id
    }

    pub fn add_post_at(
        &self,
        author: Uuid,
        category: PostCategory,
        comment_count: i32,
        created_at: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.posts.lock().unwrap().push(PostRow {
            id,
            user_id: author,
            diary_id: None,
            category,
            title: None,
            content: format!("post in {category:?}"),
            is_anonymous: false,
            author_nickname: "seed".to_string(),
            comment_count,
            created_at,
            updated_at: created_at,
        });
        id
    }

    fn insert_post_row(&self, post: NewPost) -> Result<PostRow, AppError> {
        self.post_inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_post_insert.load(Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("post store unavailable")));
        }
        let now = Utc::now();
        let row = PostRow {
            id: Uuid::new_v4(),
            user_id: post.user_id,
            diary_id: post.diary_id,
            category: post.category,
            title: post.title,
            content: post.content,
            is_anonymous: post.is_anonymous,
            author_nickname: post.author_nickname,
            comment_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(row.clone());
        Ok(row)
    }

    /// Simulates the diary being deleted after the post insert but before the
    /// link step of a share.
    pub fn vanish_before_link(&self, vanish: bool) {
        self.vanish_before_link.store(vanish, Ordering::SeqCst);
    }

    pub fn post_inserts(&self) -> usize {
        self.post_inserts.load(Ordering::SeqCst)
    }

    pub fn fail_post_inserts(&self, fail: bool) {
        self.fail_post_insert.store(fail, Ordering::SeqCst);
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn diary(&self, id: Uuid) -> Option<DiaryRow> {
        self.diaries
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub fn post(&self, id: Uuid) -> Option<PostRow> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRow>, AppError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<UserRow>, AppError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(nickname) = &update.nickname {
            user.nickname = nickname.clone();
        }
        if let Some(affinity) = update.affinity {
            user.affinity = affinity;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn stats(&self, id: Uuid) -> Result<UserStats, AppError> {
        Ok(UserStats {
            diary_count: self.diaries.lock().unwrap().iter().filter(|d| d.user_id == id).count()
                as i64,
            post_count: self.posts.lock().unwrap().iter().filter(|p| p.user_id == id).count()
                as i64,
            comment_count: self
                .comments
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.user_id == id)
                .count() as i64,
        })
    }
}

#[async_trait]
impl DiaryStore for MemoryStore {
    async fn find_diary(&self, owner: Uuid, id: Uuid) -> Result<Option<DiaryRow>, AppError> {
        Ok(self
            .diaries
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id && d.user_id == owner)
            .cloned())
    }

    async fn list_diaries(
        &self,
        owner: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<DiaryRow>, i64), AppError> {
        let mut mine: Vec<DiaryRow> = self
            .diaries
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.user_id == owner)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = mine.len() as i64;
        let items = mine
            .into_iter()
            .skip(offset(page, limit) as usize)
            .take(limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn insert_diary(&self, diary: NewDiary) -> Result<DiaryRow, AppError> {
        let now = Utc::now();
        let row = DiaryRow {
            id: Uuid::new_v4(),
            user_id: diary.user_id,
            content: diary.content,
            emotion_score: diary.emotion_score,
            emotion_keywords: diary.emotion_keywords,
            comfort_message: diary.comfort_message,
            is_shared: false,
            post_id: None,
            created_at: now,
            updated_at: now,
        };
        self.diaries.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update_analysis(
        &self,
        owner: Uuid,
        id: Uuid,
        content: &str,
        analysis: &EmotionAnalysis,
    ) -> Result<Option<DiaryRow>, AppError> {
        let mut diaries = self.diaries.lock().unwrap();
        let Some(d) = diaries.iter_mut().find(|d| d.id == id && d.user_id == owner) else {
            return Ok(None);
        };
        d.content = content.to_string();
        d.emotion_score = analysis.emotion_score;
        d.emotion_keywords = analysis.emotion_keywords.clone();
        d.comfort_message = analysis.comfort_message.clone();
        d.updated_at = Utc::now();
        Ok(Some(d.clone()))
    }

    async fn delete_diary(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut diaries = self.diaries.lock().unwrap();
        let before = diaries.len();
        diaries.retain(|d| !(d.id == id && d.user_id == owner));
        Ok(diaries.len() < before)
    }

    async fn share_diary(
        &self,
        owner: Uuid,
        id: Uuid,
        post: NewPost,
    ) -> Result<ShareOutcome, AppError> {
        let mut diaries = self.diaries.lock().unwrap();
        match diaries.iter().find(|d| d.id == id && d.user_id == owner) {
            None => return Ok(ShareOutcome::Missing),
            Some(d) if d.is_shared => return Ok(ShareOutcome::AlreadyShared),
            Some(_) => {}
        }

        let post = self.insert_post_row(post)?;
        if self.vanish_before_link.load(Ordering::SeqCst) {
            diaries.retain(|d| d.id != id);
        }

        let Some(diary) = diaries.iter_mut().find(|d| d.id == id && d.user_id == owner) else {
            // rollback
            self.posts.lock().unwrap().retain(|p| p.id != post.id);
            return Ok(ShareOutcome::Missing);
        };
        diary.is_shared = true;
        diary.post_id = Some(post.id);
        diary.updated_at = Utc::now();
        Ok(ShareOutcome::Shared {
            diary: diary.clone(),
            post,
        })
    }

    async fn average_score(&self, owner: Uuid) -> Result<f64, AppError> {
        let diaries = self.diaries.lock().unwrap();
        let scores: Vec<f64> = diaries
            .iter()
            .filter(|d| d.user_id == owner)
            .map(|d| f64::from(d.emotion_score))
            .collect();
        if scores.is_empty() {
            return Ok(0.0);
        }
        Ok(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    async fn emotion_points_since(
        &self,
        owner: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<EmotionDataPoint>, AppError> {
        let mut points: Vec<EmotionDataPoint> = self
            .diaries
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.user_id == owner && since.map_or(true, |s| d.created_at >= s))
            .map(|d| EmotionDataPoint {
                date: d.created_at,
                emotion_score: d.emotion_score,
            })
            .collect();
        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn find_post(&self, id: Uuid) -> Result<Option<PostRow>, AppError> {
        Ok(self.post(id))
    }

    async fn list_posts(&self, query: PostQuery) -> Result<(Vec<PostRow>, i64), AppError> {
        let mut matching: Vec<PostRow> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| query.category.map_or(true, |c| p.category == c))
            .cloned()
            .collect();
        match query.sort {
            PostSort::Latest => matching.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            PostSort::MostCommented => matching.sort_by(|a, b| {
                b.comment_count
                    .cmp(&a.comment_count)
                    .then(b.created_at.cmp(&a.created_at))
            }),
        }
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(offset(query.page, query.limit) as usize)
            .take(query.limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn insert_post(&self, post: NewPost) -> Result<PostRow, AppError> {
        self.insert_post_row(post)
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), AppError> {
        self.posts.lock().unwrap().retain(|p| p.id != id);
        self.comments.lock().unwrap().retain(|c| c.post_id != id);
        Ok(())
    }

    async fn increment_comment_count(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(p) = self.posts.lock().unwrap().iter_mut().find(|p| p.id == id) {
            p.comment_count += 1;
        }
        Ok(())
    }

    async fn decrement_comment_count(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(p) = self.posts.lock().unwrap().iter_mut().find(|p| p.id == id) {
            p.comment_count = (p.comment_count - 1).max(0);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn find_comment(&self, id: Uuid) -> Result<Option<CommentRow>, AppError> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentRow>, AppError> {
        let mut comments: Vec<CommentRow> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRow, AppError> {
        let now = Utc::now();
        let row = CommentRow {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            user_id: comment.user_id,
            content: comment.content,
            is_anonymous: comment.is_anonymous,
            author_nickname: comment.author_nickname,
            created_at: now,
            updated_at: now,
        };
        self.comments.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<(), AppError> {
        self.comments.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }
}
