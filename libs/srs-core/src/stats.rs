//! Study statistics: retention, streaks, phase breakdowns, and the
//! adaptive level recommendation. Pure aggregations over progress and
//! activity lists; the caller supplies the data.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model;
use crate::types::{DailyActivity, ItemProgress, MemoryPhase};

/// Dashboard summary of one learner's memory traces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudySummary {
    pub total_studied: usize,
    pub due_today: usize,
    pub learning: usize,
    pub review: usize,
    pub mastered: usize,
    /// Lifetime percent of correct answers, 0-100.
    pub retention: u32,
}

impl StudySummary {
    pub fn from_progress(progress: &[ItemProgress], now: DateTime<Utc>) -> Self {
        let mut summary = Self {
            total_studied: progress.len(),
            retention: retention_rate(progress),
            ..Self::default()
        };

        for p in progress {
            if p.next_review.is_some() && model::is_due(p, now) {
                summary.due_today += 1;
            }
            match model::phase_of(Some(p)) {
                MemoryPhase::Learning => summary.learning += 1,
                MemoryPhase::Review => summary.review += 1,
                MemoryPhase::Mastered => summary.mastered += 1,
                MemoryPhase::New => {}
            }
        }

        summary
    }
}

/// Lifetime retention rate as a rounded percentage.
pub fn retention_rate(progress: &[ItemProgress]) -> u32 {
    let (seen, correct) = progress
        .iter()
        .filter(|p| p.times_seen > 0)
        .fold((0u64, 0u64), |(seen, correct), p| {
            (seen + u64::from(p.times_seen), correct + u64::from(p.times_correct))
        });

    if seen == 0 {
        0
    } else {
        ((correct as f64 / seen as f64) * 100.0).round() as u32
    }
}

/// Consecutive days with answered questions, ending today. A day with a
/// record but zero answers breaks the streak, as does a missing day.
pub fn study_streak(activity: &[DailyActivity], today: NaiveDate) -> u32 {
    let mut sorted: Vec<&DailyActivity> = activity.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut streak = 0;
    let mut expected = today;

    for entry in sorted {
        if entry.date > expected {
            continue;
        }
        if entry.date < expected {
            break;
        }
        if entry.answered == 0 {
            break;
        }
        streak += 1;
        expected = expected - Duration::days(1);
    }

    streak
}

/// Confidence of the level recommendation, from sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Recommended question level for upcoming new material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelRecommendation {
    /// 1 = easy, 2 = medium, 3 = hard.
    pub level: i32,
    pub accuracy: u32,
    pub lapse_rate: u32,
    pub mean_difficulty: f64,
    pub confidence: Confidence,
    #[serde(skip_deserializing)]
    pub reason: &'static str,
}

impl Default for LevelRecommendation {
    fn default() -> Self {
        Self {
            level: 2,
            accuracy: 0,
            lapse_rate: 0,
            mean_difficulty: 5.0,
            confidence: Confidence::Low,
            reason: "new_user",
        }
    }
}

/// Adaptive difficulty: pick a level for new questions from recent
/// performance. High accuracy on easy-rated material moves the learner
/// up; low accuracy or frequent lapses move them down. Legacy records
/// contribute through the ease conversion.
pub fn recommend_level(progress: &[ItemProgress]) -> LevelRecommendation {
    let answered: Vec<&ItemProgress> = progress.iter().filter(|p| p.times_seen > 0).collect();
    if answered.is_empty() {
        return LevelRecommendation::default();
    }

    let mean_difficulty = answered
        .iter()
        .map(|p| {
            p.difficulty
                .or_else(|| p.ease_factor.map(model::difficulty_from_ease))
                .unwrap_or(5.0)
        })
        .sum::<f64>()
        / answered.len() as f64;

    let total_seen: u64 = answered.iter().map(|p| u64::from(p.times_seen)).sum();
    let total_correct: u64 = answered.iter().map(|p| u64::from(p.times_correct)).sum();
    let total_lapses: u64 = answered.iter().map(|p| u64::from(p.lapses)).sum();

    let accuracy = ((total_correct as f64 / total_seen as f64) * 100.0).round() as u32;
    let lapse_rate = ((total_lapses as f64 / total_seen as f64) * 100.0).round() as u32;

    let (level, reason) = if accuracy >= 85 && mean_difficulty <= 3.0 {
        (3, "high_performance")
    } else if accuracy >= 70 && mean_difficulty <= 4.2 {
        (3, "good_performance")
    } else if accuracy < 50 || mean_difficulty >= 7.0 {
        (1, "struggling")
    } else if lapse_rate > 30 {
        (1, "high_lapse_rate")
    } else {
        (2, "balanced")
    };

    let confidence = match answered.len() {
        0..=9 => Confidence::Low,
        10..=19 => Confidence::Medium,
        _ => Confidence::High,
    };

    LevelRecommendation {
        level,
        accuracy,
        lapse_rate,
        mean_difficulty,
        confidence,
        reason,
    }
}
