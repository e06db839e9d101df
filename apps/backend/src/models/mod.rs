//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from srs-core
pub use srs_core::types::{
    DailyActivity, ItemProgress, MemoryPhase, Question, SessionItem, SessionPlan,
};
pub use srs_core::{LevelRecommendation, StudySummary};

// === Database Entity Types ===

/// Question stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbQuestion {
    pub id: Uuid,
    pub topic: Option<String>,
    pub prompt: String,
    pub choices: serde_json::Value,
    pub correct_choice: i32,
    pub explanation: Option<String>,
    pub level: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbQuestion {
    /// Convert to the core question type
    pub fn to_core(&self) -> Question {
        Question {
            id: self.id,
            topic: self.topic.clone(),
            prompt: self.prompt.clone(),
            choices: serde_json::from_value(self.choices.clone()).unwrap_or_default(),
            correct_choice: self.correct_choice.max(0) as usize,
            explanation: self.explanation.clone(),
            level: self.level,
        }
    }
}

/// Memory trace in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub times_seen: i32,
    pub times_correct: i32,
    pub lapses: i32,
    pub stability: Option<f64>,
    pub difficulty: Option<f64>,
    pub ease_factor: Option<f64>,
    pub interval_days: i32,
    pub next_review: Option<DateTime<Utc>>,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbProgress {
    /// Convert to the core trace type
    pub fn to_core(&self) -> ItemProgress {
        ItemProgress {
            user_id: self.user_id,
            question_id: self.question_id,
            times_seen: self.times_seen.max(0) as u32,
            times_correct: self.times_correct.max(0) as u32,
            lapses: self.lapses.max(0) as u32,
            stability: self.stability,
            difficulty: self.difficulty,
            ease_factor: self.ease_factor,
            interval: i64::from(self.interval_days.max(0)),
            next_review: self.next_review,
            last_reviewed: self.last_reviewed,
        }
    }
}

/// Joined row for due review candidates
#[derive(Debug, Clone, FromRow)]
pub struct DbDueRow {
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub times_seen: i32,
    pub times_correct: i32,
    pub lapses: i32,
    pub stability: Option<f64>,
    pub difficulty: Option<f64>,
    pub ease_factor: Option<f64>,
    pub interval_days: i32,
    pub next_review: Option<DateTime<Utc>>,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub topic: Option<String>,
    pub prompt: String,
    pub choices: serde_json::Value,
    pub correct_choice: i32,
    pub explanation: Option<String>,
    pub level: Option<i32>,
}

impl DbDueRow {
    /// Split into the core candidate pair
    pub fn to_core(&self) -> srs_core::DueCandidate {
        srs_core::DueCandidate {
            question: Question {
                id: self.question_id,
                topic: self.topic.clone(),
                prompt: self.prompt.clone(),
                choices: serde_json::from_value(self.choices.clone()).unwrap_or_default(),
                correct_choice: self.correct_choice.max(0) as usize,
                explanation: self.explanation.clone(),
                level: self.level,
            },
            progress: ItemProgress {
                user_id: self.user_id,
                question_id: self.question_id,
                times_seen: self.times_seen.max(0) as u32,
                times_correct: self.times_correct.max(0) as u32,
                lapses: self.lapses.max(0) as u32,
                stability: self.stability,
                difficulty: self.difficulty,
                ease_factor: self.ease_factor,
                interval: i64::from(self.interval_days.max(0)),
                next_review: self.next_review,
                last_reviewed: self.last_reviewed,
            },
        }
    }
}

/// One row of the daily activity aggregate
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDailyActivity {
    pub user_id: Uuid,
    pub activity_date: NaiveDate,
    pub answered: i32,
    pub correct: i32,
}

impl DbDailyActivity {
    pub fn to_core(&self) -> DailyActivity {
        DailyActivity {
            date: self.activity_date,
            answered: self.answered.max(0) as u32,
            correct: self.correct.max(0) as u32,
        }
    }
}

// === API Request/Response Types ===

// Session types
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionQuery {
    pub total: Option<usize>,
    pub review_ratio: Option<f64>,
    pub topic: Option<String>,
    pub level: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub items: Vec<SessionItem>,
    pub requested: usize,
    pub review_count: usize,
    pub new_count: usize,
}

// Answer types
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub question_id: Uuid,
    pub was_correct: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub progress: ItemProgress,
    pub phase: MemoryPhase,
    /// False when the write was lost; the computed state is still returned
    /// so the session can continue.
    pub saved: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteSessionRequest {
    pub answered: u32,
    pub correct: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteSessionResponse {
    pub recorded: bool,
}

// Stats types
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub summary: StudySummary,
    pub streak: u32,
    pub recommended_level: LevelRecommendation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub answered: u32,
    pub correct: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub days: Vec<DayActivity>,
}
