use serde::Serialize;

use crate::analysis::ScoreBand;

/// Writing prompt chosen from the owner's average emotion score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryTemplate {
    pub template_type: ScoreBand,
    pub placeholder: &'static str,
    pub encouragement: &'static str,
    pub average_emotion_score: f64,
}

pub fn select_template(average_emotion_score: f64) -> DiaryTemplate {
    let template_type = ScoreBand::classify(average_emotion_score);
    let (placeholder, encouragement) = match template_type {
        ScoreBand::Positive => (
            "What good things happened today?",
            "You're getting better, little by little.",
        ),
        ScoreBand::Neutral => (
            "How was your day today?",
            "You're moving forward at your own pace.",
        ),
        ScoreBand::Negative => (
            "Let out whatever is weighing on you. Write freely.",
            "It's okay. You're not alone in this.",
        ),
    };
    DiaryTemplate {
        template_type,
        placeholder,
        encouragement,
        average_emotion_score,
    }
}
