//! Score banding shared by comfort messages and diary templates.
//!
//! Both call sites go through [`ScoreBand::classify`] so the ±30 threshold lives
//! in exactly one place.

use serde::Serialize;

use crate::models::user::Affinity;

/// Scores at or beyond ±this value leave the neutral band.
pub const BAND_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreBand {
    Positive,
    Neutral,
    Negative,
}

impl ScoreBand {
    /// `>= 30` positive, `<= -30` negative, neutral otherwise.
    pub fn classify(score: impl Into<f64>) -> Self {
        let score = score.into();
        if score >= BAND_THRESHOLD {
            ScoreBand::Positive
        } else if score <= -BAND_THRESHOLD {
            ScoreBand::Negative
        } else {
            ScoreBand::Neutral
        }
    }
}

/// Fixed comfort message for every affinity × band cell.
pub fn comfort_message(affinity: Affinity, band: ScoreBand) -> &'static str {
    match (affinity, band) {
        (Affinity::MoveOn, ScoreBand::Positive) => {
            "You're doing so well! You're taking it one step at a time toward a new beginning. \
             Hold on to today's brighter feeling, and keep cheering on the version of you \
             that gets a little better every day."
        }
        (Affinity::MoveOn, ScoreBand::Neutral) => {
            "Some days are not easy. Writing your feelings down already takes courage. \
             Move forward slowly, at your own pace. You did well today."
        }
        (Affinity::MoveOn, ScoreBand::Negative) => {
            "It must be really hard right now, and that is completely understandable. \
             Healing from a breakup takes time. For now, just comfort yourself and be gentle. \
             It's okay, you're not alone."
        }
        (Affinity::HoldOn, ScoreBand::Positive) => {
            "Your heart seems a little lighter today. Whatever you decide, treasure what you \
             feel right now, and walk slowly toward where your heart is pointing."
        }
        (Affinity::HoldOn, ScoreBand::Neutral) => {
            "Your heart still feels complicated. Lingering feelings are natural, and there is \
             no need to rush a decision. Try to accept this moment's feelings as they are."
        }
        (Affinity::HoldOn, ScoreBand::Negative) => {
            "You miss them so much, and it hurts. You don't have to push that feeling down. \
             It's okay to be sad for as long as you need. Every feeling you have matters."
        }
        (Affinity::Undecided, ScoreBand::Positive) => {
            "Looks like today was a good day. Whichever path you choose, we're rooting for you. \
             Enjoy this moment."
        }
        (Affinity::Undecided, ScoreBand::Neutral) => {
            "Making up your mind is never easy. Take your time looking into your own feelings. \
             The answer is probably already inside you."
        }
        (Affinity::Undecided, ScoreBand::Negative) => {
            "So many things are tangled up right now, and that's exhausting. It's fine to take \
             time and sort them out slowly. You made it through today."
        }
    }
}
