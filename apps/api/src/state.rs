use std::sync::Arc;

use crate::analysis::EmotionAnalyzer;
use crate::config::Config;
use crate::store::{CommentStore, DiaryStore, PostStore, UserStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Chosen once at startup. Lexicon backend unless an API key is configured.
    pub analyzer: Arc<dyn EmotionAnalyzer>,
    pub users: Arc<dyn UserStore>,
    pub diaries: Arc<dyn DiaryStore>,
    pub posts: Arc<dyn PostStore>,
    pub comments: Arc<dyn CommentStore>,
}
