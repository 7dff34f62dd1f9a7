//! Offline lexicon backend. Fast, deterministic, no network.
//!
//! Algorithm:
//! 1. +15 for every positive marker present, -15 for every negative marker present
//!    (presence only, repeats do not stack), clamped to [-100, 100].
//! 2. Walk `KEYWORD_MARKERS` in declared order, recording each mapped emotion the
//!    first time it is seen, stopping at three.
//! 3. Comfort message from the shared affinity × band table.

use async_trait::async_trait;

use crate::analysis::bands::{comfort_message, ScoreBand};
use crate::analysis::{
    clamp_score, EmotionAnalysis, EmotionAnalyzer, MAX_KEYWORDS, SORTING_OUT_KEYWORD,
};
use crate::models::user::Affinity;

const MARKER_WEIGHT: i64 = 15;

const POSITIVE_MARKERS: &[&str] = &[
    "happy", "glad", "delighted", "laugh", "hope", "love", "grateful", "lucky",
];

const NEGATIVE_MARKERS: &[&str] = &[
    "sad", "struggl", "hurt", "tears", "miss", "cling", "regret", "lonely",
];

/// Marker substring → named emotion, scanned in this order.
const KEYWORD_MARKERS: &[(&str, &str)] = &[
    ("sad", "sadness"),
    ("tears", "sadness"),
    ("miss", "longing"),
    ("longing", "longing"),
    ("angry", "anger"),
    ("annoyed", "anger"),
    ("hope", "hope"),
    ("looking forward", "hope"),
    ("lonely", "loneliness"),
    ("alone", "loneliness"),
    ("happy", "happiness"),
    ("glad", "joy"),
];

pub struct LexiconAnalyzer;

impl LexiconAnalyzer {
    /// Pure analysis; the trait impl just delegates here.
    pub fn analyze_text(content: &str, affinity: Affinity) -> EmotionAnalysis {
        let text = content.to_lowercase();
        let emotion_score = score(&text);
        EmotionAnalysis {
            emotion_score,
            emotion_keywords: keywords(&text),
            comfort_message: comfort_message(affinity, ScoreBand::classify(emotion_score))
                .to_string(),
        }
    }
}

#[async_trait]
impl EmotionAnalyzer for LexiconAnalyzer {
    async fn analyze(&self, content: &str, affinity: Affinity) -> EmotionAnalysis {
        Self::analyze_text(content, affinity)
    }

    fn backend(&self) -> &'static str {
        "lexicon"
    }
}

fn score(text: &str) -> i32 {
    let hits = |markers: &[&str]| markers.iter().filter(|m| text.contains(*m)).count() as i64;
    clamp_score(MARKER_WEIGHT * (hits(POSITIVE_MARKERS) - hits(NEGATIVE_MARKERS)))
}

fn keywords(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::with_capacity(MAX_KEYWORDS);
    for (marker, emotion) in KEYWORD_MARKERS {
        if found.len() == MAX_KEYWORDS {
            break;
        }
        if text.contains(marker) && !found.iter().any(|k| k == emotion) {
            found.push((*emotion).to_string());
        }
    }
    if found.is_empty() {
        found.push(SORTING_OUT_KEYWORD.to_string());
    }
    found
}
