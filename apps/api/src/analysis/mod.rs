// Emotion Analysis Engine. Turns diary text into a bounded score, up to three
// emotion keywords and a comfort message.
//
// Two interchangeable backends sit behind `EmotionAnalyzer`:
// - `LexiconAnalyzer`: offline, deterministic marker-word scoring.
// - `LlmEmotionAnalyzer`: remote model with bounded retries and a safe fallback.
//
// `AppState` holds one `Arc<dyn EmotionAnalyzer>`, chosen once at startup by
// `build_analyzer`. Analysis never fails from the caller's point of view.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::EmotionConfig;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::user::Affinity;

pub mod bands;
pub mod lexicon;
pub mod prompts;
pub mod remote;

pub use bands::ScoreBand;
pub use lexicon::LexiconAnalyzer;
pub use remote::LlmEmotionAnalyzer;

pub const MIN_SCORE: i32 = -100;
pub const MAX_SCORE: i32 = 100;
pub const MAX_KEYWORDS: usize = 3;

/// Keyword emitted when no emotion could be identified.
pub const SORTING_OUT_KEYWORD: &str = "sorting out feelings";

/// Result of analysing one diary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionAnalysis {
    /// Always within [`MIN_SCORE`, `MAX_SCORE`].
    pub emotion_score: i32,
    /// 1 to [`MAX_KEYWORDS`] entries, no duplicates, discovery order.
    pub emotion_keywords: Vec<String>,
    pub comfort_message: String,
}

/// The analysis capability. Implementations must always return a well-formed
/// result; failures are absorbed internally.
#[async_trait]
pub trait EmotionAnalyzer: Send + Sync {
    async fn analyze(&self, content: &str, affinity: Affinity) -> EmotionAnalysis;

    /// "lexicon" or "llm", for logs.
    fn backend(&self) -> &'static str;
}

/// Chooses the analysis backend from configuration. Called once at startup.
pub fn build_analyzer(config: &EmotionConfig) -> Result<Arc<dyn EmotionAnalyzer>, LlmError> {
    match &config.api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.model.clone())?;
            info!(
                model = %config.model,
                max_retries = config.max_retries,
                timeout_ms = config.attempt_timeout.as_millis() as u64,
                "Emotion analysis: remote model backend"
            );
            Ok(Arc::new(LlmEmotionAnalyzer::new(llm, config)))
        }
        None => {
            info!("Emotion analysis: offline lexicon backend (no API key configured)");
            Ok(Arc::new(LexiconAnalyzer))
        }
    }
}

pub fn clamp_score(score: i64) -> i32 {
    score.clamp(i64::from(MIN_SCORE), i64::from(MAX_SCORE)) as i32
}
