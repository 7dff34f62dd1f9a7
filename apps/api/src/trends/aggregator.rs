//! Emotion Trend Aggregator: windowed statistics over a user's diary history.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::diary::EmotionDataPoint;

/// Trailing window the graph covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "all")]
    All,
}

impl Period {
    /// Window length in days; `None` means unbounded.
    pub fn days(self) -> Option<i64> {
        match self {
            Period::Week => Some(7),
            Period::Month => Some(30),
            Period::Quarter => Some(90),
            Period::All => None,
        }
    }

    /// Start of the current window ending at `now`.
    pub fn window_start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|d| now - Duration::days(d))
    }

    /// Start of the equally long window immediately before the current one.
    pub fn previous_start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|d| now - Duration::days(d * 2))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPoint {
    pub date: NaiveDate,
    pub emotion_score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionGraph {
    pub data_points: Vec<GraphPoint>,
    pub average_score: i64,
    pub max_score: i32,
    pub min_score: i32,
    pub best_day: Option<NaiveDate>,
    pub worst_day: Option<NaiveDate>,
    pub change_from_previous: i64,
}

impl EmotionGraph {
    fn empty() -> Self {
        Self {
            data_points: Vec::new(),
            average_score: 0,
            max_score: 0,
            min_score: 0,
            best_day: None,
            worst_day: None,
            change_from_previous: 0,
        }
    }
}

/// Rounds halves toward positive infinity (-2.5 → -2, 2.5 → 3).
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

fn mean(points: &[EmotionDataPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let sum: i64 = points.iter().map(|p| i64::from(p.emotion_score)).sum();
    sum as f64 / points.len() as f64
}

/// Summarises `points` (ascending by date) against the preceding window.
///
/// Ties for best/worst day go to the earliest point. An empty window yields
/// all-zero statistics rather than an error.
pub fn summarize(points: &[EmotionDataPoint], previous: &[EmotionDataPoint]) -> EmotionGraph {
    let Some(first) = points.first() else {
        return EmotionGraph::empty();
    };

    let mut best = first;
    let mut worst = first;
    for p in &points[1..] {
        if p.emotion_score > best.emotion_score {
            best = p;
        }
        if p.emotion_score < worst.emotion_score {
            worst = p;
        }
    }

    let average = mean(points);
    EmotionGraph {
        data_points: points
            .iter()
            .map(|p| GraphPoint {
                date: p.date.date_naive(),
                emotion_score: p.emotion_score,
            })
            .collect(),
        average_score: round_half_up(average),
        max_score: best.emotion_score,
        min_score: worst.emotion_score,
        best_day: Some(best.date.date_naive()),
        worst_day: Some(worst.date.date_naive()),
        change_from_previous: round_half_up(average - mean(previous)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(day: u32, score: i32) -> EmotionDataPoint {
        EmotionDataPoint {
            date: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
            emotion_score: score,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_empty_window_is_all_zero() {
        let graph = summarize(&[], &[point(1, 80)]);
        assert_eq!(graph, EmotionGraph::empty());
        assert!(graph.data_points.is_empty());
        assert!(graph.best_day.is_none());
        assert!(graph.worst_day.is_none());
    }

    #[test]
    fn test_first_occurrence_wins_ties() {
        let graph = summarize(&[point(1, 10), point(2, 50), point(3, 50)], &[]);
        assert_eq!(graph.max_score, 50);
        assert_eq!(graph.min_score, 10);
        assert_eq!(graph.best_day, Some(day(2)));
        assert_eq!(graph.worst_day, Some(day(1)));
        assert_eq!(graph.average_score, 37);
        assert_eq!(graph.data_points.len(), 3);
        assert_eq!(graph.data_points[0].date, day(1));
    }

    #[test]
    fn test_worst_day_tie() {
        let graph = summarize(&[point(4, -20), point(5, -60), point(6, -60)], &[]);
        assert_eq!(graph.worst_day, Some(day(5)));
        assert_eq!(graph.best_day, Some(day(4)));
    }

    #[test]
    fn test_change_from_previous_uses_unrounded_means() {
        // current mean 15.5, previous mean 10.0
        let graph = summarize(&[point(10, 10), point(11, 21)], &[point(1, 0), point(2, 20)]);
        assert_eq!(graph.average_score, 16);
        assert_eq!(graph.change_from_previous, 6);
    }

    #[test]
    fn test_no_previous_window_counts_as_zero() {
        let graph = summarize(&[point(1, -45)], &[]);
        assert_eq!(graph.change_from_previous, -45);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(0.49), 0);
    }

    #[test]
    fn test_period_windows() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap();
        assert_eq!(
            Period::Week.window_start(now),
            Some(Utc.with_ymd_and_hms(2025, 3, 24, 0, 0, 0).unwrap())
        );
        assert_eq!(
            Period::Week.previous_start(now),
            Some(Utc.with_ymd_and_hms(2025, 3, 17, 0, 0, 0).unwrap())
        );
        assert_eq!(Period::All.window_start(now), None);
        assert_eq!(Period::default(), Period::Month);
    }

    #[test]
    fn test_period_deserializes_from_query_values() {
        let p: Period = serde_json::from_str("\"90d\"").unwrap();
        assert_eq!(p, Period::Quarter);
        assert!(serde_json::from_str::<Period>("\"14d\"").is_err());
    }
}
