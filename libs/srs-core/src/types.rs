//! Core types for the spaced-repetition scheduler.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Memory phase of an item for one learner.
///
/// Always derived from the counters and interval, never stored as ground
/// truth. See [`crate::model::phase_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryPhase {
    New,
    Learning,
    Review,
    Mastered,
}

impl Default for MemoryPhase {
    fn default() -> Self {
        Self::New
    }
}

/// Durable memory trace for one learner/question pair.
///
/// Created lazily on the first answer, updated on every answer, never
/// deleted. `stability`/`difficulty` are the native memory parameters;
/// `ease_factor` survives only on legacy records and is converted on the
/// fly when scheduling (see [`crate::model`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemProgress {
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub times_seen: u32,
    pub times_correct: u32,
    pub lapses: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ease_factor: Option<f64>,
    /// Days until the next scheduled review.
    pub interval: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl ItemProgress {
    /// Blank trace for a pair that has never been answered.
    pub fn new(user_id: Uuid, question_id: Uuid) -> Self {
        Self {
            user_id,
            question_id,
            times_seen: 0,
            times_correct: 0,
            lapses: 0,
            stability: None,
            difficulty: None,
            ease_factor: None,
            interval: 0,
            next_review: None,
            last_reviewed: None,
        }
    }
}

/// Question content as delivered by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub prompt: String,
    pub choices: Vec<String>,
    pub correct_choice: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Author-assigned level (1-5), used by adaptive selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
}

/// Read-only view of prior memory state, attached to review items for
/// display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub times_seen: u32,
    pub times_correct: u32,
    pub interval: i64,
}

impl From<&ItemProgress> for ProgressSnapshot {
    fn from(progress: &ItemProgress) -> Self {
        Self {
            times_seen: progress.times_seen,
            times_correct: progress.times_correct,
            interval: progress.interval,
        }
    }
}

/// One entry of a composed study session. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionItem {
    pub question: Question,
    pub is_review: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior: Option<ProgressSnapshot>,
}

/// A due review candidate: progress joined with its question content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueCandidate {
    pub question: Question,
    pub progress: ItemProgress,
}

/// Filter applied to candidate pool reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateFilter {
    pub topic: Option<String>,
    pub level: Option<i32>,
}

/// One day of recorded study activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub answered: u32,
    pub correct: u32,
}

/// Result of scheduling one answered item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub next_review: DateTime<Utc>,
    pub interval: i64,
    pub stability: f64,
    pub difficulty: f64,
    pub phase: MemoryPhase,
}

/// Scheduler tuning. Validated by [`crate::scheduler::ReviewScheduler::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerParams {
    /// Target recall probability at the moment of the next review.
    pub desired_retention: f64,
    /// Fixed intervals (days) walked through before graduation.
    pub learning_steps: [i64; 2],
    /// Interval assigned when an item graduates from the learning steps.
    pub graduation_interval: i64,
    pub min_interval: i64,
    pub max_interval: i64,
    pub initial_stability_good: f64,
    pub initial_stability_again: f64,
    pub initial_difficulty_good: f64,
    pub initial_difficulty_again: f64,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            desired_retention: 0.9,
            learning_steps: [1, 3],
            graduation_interval: 7,
            min_interval: 1,
            max_interval: 365,
            initial_stability_good: 2.4,
            initial_stability_again: 0.4,
            initial_difficulty_good: 5.0,
            initial_difficulty_again: 7.0,
        }
    }
}

/// Requested shape of one study session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPlan {
    pub total_questions: usize,
    /// Fraction of the session drawn from due reviews.
    pub review_ratio: f64,
    pub topic: Option<String>,
    pub level: Option<i32>,
}

impl SessionPlan {
    pub fn new(total_questions: usize) -> Self {
        Self {
            total_questions,
            review_ratio: 0.25,
            topic: None,
            level: None,
        }
    }

    pub fn filter(&self) -> CandidateFilter {
        CandidateFilter {
            topic: self.topic.clone(),
            level: self.level,
        }
    }
}

impl Default for SessionPlan {
    fn default() -> Self {
        Self::new(20)
    }
}
