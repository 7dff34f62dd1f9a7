//! Remote model backend.
//!
//! Invocation policy: up to `max_retries + 1` attempts, each raced against a hard
//! timeout. A timeout, transport error or structurally broken reply triggers a
//! retry after `backoff_base × attempt`. When every attempt fails the caller gets
//! [`fallback_analysis`] and the failure is logged; nothing is propagated.
//!
//! A reply that parses but is out of range (score, keyword list, message) is
//! corrected in place rather than retried.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use crate::analysis::prompts::{build_emotion_prompt, EMOTION_SYSTEM};
use crate::analysis::{
    clamp_score, EmotionAnalysis, EmotionAnalyzer, MAX_KEYWORDS, SORTING_OUT_KEYWORD,
};
use crate::config::EmotionConfig;
use crate::llm_client::{extract_json_object, CompletionBackend, LlmClient, LlmError};
use crate::models::user::Affinity;

pub const UNDER_ANALYSIS_KEYWORD: &str = "under analysis";

pub const GENERIC_COMFORT_MESSAGE: &str = "Thank you for writing today. Whatever you are \
    feeling right now is valid, and you don't have to carry it alone.";

#[derive(Debug, Error)]
enum AttemptError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("malformed response: {0}")]
    Malformed(String),
}

pub struct LlmEmotionAnalyzer<C = LlmClient> {
    backend: C,
    max_retries: u32,
    attempt_timeout: Duration,
    backoff_base: Duration,
}

impl<C: CompletionBackend> LlmEmotionAnalyzer<C> {
    pub fn new(backend: C, config: &EmotionConfig) -> Self {
        Self {
            backend,
            max_retries: config.max_retries,
            attempt_timeout: config.attempt_timeout,
            backoff_base: config.backoff_base,
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<EmotionAnalysis, AttemptError> {
        let text = tokio::time::timeout(
            self.attempt_timeout,
            self.backend.complete(prompt, EMOTION_SYSTEM),
        )
        .await
        .map_err(|_| AttemptError::Timeout(self.attempt_timeout))??;

        parse_analysis(&text)
    }
}

#[async_trait]
impl<C: CompletionBackend> EmotionAnalyzer for LlmEmotionAnalyzer<C> {
    async fn analyze(&self, content: &str, affinity: Affinity) -> EmotionAnalysis {
        let prompt = build_emotion_prompt(content, affinity);
        let attempts = total_attempts(self.max_retries);
        let mut last_error: Option<AttemptError> = None;

        for attempt in 1..=attempts {
            match self.attempt(&prompt).await {
                Ok(analysis) => return analysis,
                Err(e) => {
                    if attempt < attempts {
                        let delay = backoff_delay(self.backoff_base, attempt);
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "Emotion analysis attempt failed: {e}; retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        error!(
            attempts,
            "Emotion analysis exhausted all attempts, using fallback: {}",
            last_error.map(|e| e.to_string()).unwrap_or_default()
        );
        fallback_analysis()
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// First attempt plus retries. Saturates for absurd configured values.
fn total_attempts(max_retries: u32) -> u32 {
    max_retries.saturating_add(1)
}

/// Linear backoff before attempt `attempt + 1`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}

/// Safe result returned when the remote model cannot be reached.
pub fn fallback_analysis() -> EmotionAnalysis {
    EmotionAnalysis {
        emotion_score: 0,
        emotion_keywords: vec![UNDER_ANALYSIS_KEYWORD.to_string()],
        comfort_message: GENERIC_COMFORT_MESSAGE.to_string(),
    }
}

/// Extracts, validates and clamps the model reply.
///
/// Structural problems (no JSON object, unparsable JSON, missing or non-numeric
/// score) are errors; everything else is repaired.
fn parse_analysis(text: &str) -> Result<EmotionAnalysis, AttemptError> {
    let json = extract_json_object(text)
        .ok_or_else(|| AttemptError::Malformed("no JSON object in reply".to_string()))?;
    let value: Value = serde_json::from_str(json).map_err(LlmError::Parse)?;

    let raw_score = match value.get("emotionScore") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|s| s.is_finite())
    .ok_or_else(|| AttemptError::Malformed("emotionScore is missing or not numeric".to_string()))?;

    let mut emotion_keywords: Vec<String> = Vec::with_capacity(MAX_KEYWORDS);
    if let Some(items) = value.get("emotionKeywords").and_then(Value::as_array) {
        for keyword in items.iter().filter_map(Value::as_str).map(str::trim) {
            if emotion_keywords.len() == MAX_KEYWORDS {
                break;
            }
            if !keyword.is_empty() && !emotion_keywords.iter().any(|k| k == keyword) {
                emotion_keywords.push(keyword.to_string());
            }
        }
    }
    if emotion_keywords.is_empty() {
        emotion_keywords.push(SORTING_OUT_KEYWORD.to_string());
    }

    let comfort_message = value
        .get("comfortMessage")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(GENERIC_COMFORT_MESSAGE)
        .to_string();

    Ok(EmotionAnalysis {
        // `as` saturates, so absurd magnitudes still land on the clamp bounds.
        emotion_score: clamp_score(raw_score.round() as i64),
        emotion_keywords,
        comfort_message,
    })
}
