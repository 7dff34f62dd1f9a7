use crate::models::user::Affinity;

/// Keeps the reply machine-readable; prose around the object is still tolerated
/// by the parser.
pub const EMOTION_SYSTEM: &str = "You answer with a single JSON object and nothing else. \
    No markdown, no code fences, no commentary before or after the object.";

pub const EMOTION_PROMPT_TEMPLATE: &str = r#"You are a warm, careful counselor reading a private diary entry written after a breakup.

The writer {affinity}.

Read the diary entry below and return ONLY this JSON object:
{
  "emotionScore": integer from -100 (deeply distressed) to 100 (very positive),
  "emotionKeywords": array of 2 to 3 short emotion words found in the entry, most prominent first,
  "comfortMessage": "2-4 sentences of gentle, non-judgemental support that fits the writer's stance"
}

RULES:
1. emotionScore must be a plain integer, not a string.
2. Do not diagnose, do not give medical advice, do not tell the writer what to decide.
3. Respond in the same language the diary is written in.
4. Return ONLY the JSON object, nothing else, no code fences.

DIARY ENTRY:
"""
{content}
"""
"#;

/// Fills the emotion prompt. The affinity goes in first so diary text that
/// happens to contain `{affinity}` is left alone.
pub fn build_emotion_prompt(content: &str, affinity: Affinity) -> String {
    EMOTION_PROMPT_TEMPLATE
        .replace("{affinity}", affinity.describe())
        .replace("{content}", content)
}
